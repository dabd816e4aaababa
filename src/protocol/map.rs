//! Map fields.
//!
//! A `map<K, V>` has no wire primitive of its own. It is sent as one
//! length-delimited entry per key, all under the map's field number, where each
//! entry is a two-field message: field 1 holds the key and field 2 the value.
//! Decoding upserts every entry, so a key repeated in the stream keeps the
//! value that came last.

use std::collections::BTreeMap;

use super::wire::{self, Cursor, FieldValue, Tag, WireType};
use super::{varint, CodecResult, DecodeOptions};

/// Field number of the key inside a map entry.
pub const KEY_FIELD: u32 = 1;
/// Field number of the value inside a map entry.
pub const VALUE_FIELD: u32 = 2;

/// Length of one entry's content, not counting its own tag and length prefix.
pub fn entry_size<K: FieldValue, V: FieldValue>(key: &K, value: &V) -> usize {
    wire::field_size(KEY_FIELD, key) + wire::field_size(VALUE_FIELD, value)
}

/// Size of every entry of a map field, tags and length prefixes included.
pub fn map_field_size<K: FieldValue, V: FieldValue>(field: u32, map: &BTreeMap<K, V>) -> usize {
    let tag = Tag::new(field, WireType::LengthDelimited).size();

    map.iter()
        .map(|(k, v)| {
            let len = entry_size(k, v);
            tag + varint::size_of(len as u64) + len
        })
        .sum()
}

/// Write one entry per key. Keys and values are written even when they hold
/// their defaults.
pub fn write_map_field<K: FieldValue, V: FieldValue>(
    buf: &mut [u8],
    mut offset: usize,
    field: u32,
    map: &BTreeMap<K, V>,
) -> CodecResult<usize> {
    let tag = Tag::new(field, WireType::LengthDelimited);

    for (k, v) in map {
        offset = tag.encode(buf, offset);
        offset = varint::encode(buf, offset, entry_size(k, v) as u64);
        offset = wire::write_field(buf, offset, KEY_FIELD, k)?;
        offset = wire::write_field(buf, offset, VALUE_FIELD, v)?;
    }
    Ok(offset)
}

/// Decode one map entry and upsert it into `map`.
///
/// Key and value may come in either order. Fields other than the key and
/// value are skipped, and a missing key or value takes its default.
pub fn merge_map_entry<K: FieldValue + Ord, V: FieldValue>(
    cursor: &mut Cursor<'_>,
    tag: Tag,
    name: &'static str,
    map: &mut BTreeMap<K, V>,
    opts: &DecodeOptions,
) -> CodecResult<()> {
    tag.expect(WireType::LengthDelimited, name)?;
    let mut entry = Cursor::new(cursor.read_len_delimited()?);

    let mut key = K::absent();
    let mut value = V::absent();

    while !entry.is_empty() {
        let tag = entry.read_tag()?;
        match tag.field {
            KEY_FIELD => wire::merge_field(&mut entry, tag, "key", &mut key, opts)?,
            VALUE_FIELD => wire::merge_field(&mut entry, tag, "value", &mut value, opts)?,
            _ => wire::skip_unknown(&mut entry, tag, name, opts)?,
        }
    }
    map.insert(key, value);

    Ok(())
}
