//! Skipping of fields the decoder does not recognise.
//!
//! Unknown fields are consumed by wire type without being decoded, so newer
//! peers can add fields without breaking older ones. Legacy groups are skipped
//! recursively up to [`DecodeOptions::max_skip_depth`] levels.

use super::{CodecError, CodecResult, Cursor, DecodeOptions, WireType};

/// Step over one field value of the given wire type. The tag must already have
/// been read.
pub fn skip_field(
    cursor: &mut Cursor<'_>,
    wire_type: WireType,
    opts: &DecodeOptions,
) -> CodecResult<()> {
    skip_value(cursor, wire_type, 0, opts.max_skip_depth)
}

fn skip_value(
    cursor: &mut Cursor<'_>,
    wire_type: WireType,
    depth: usize,
    max_depth: usize,
) -> CodecResult<()> {
    match wire_type {
        WireType::Varint => cursor.read_varint().map(drop),
        WireType::Fixed64 => cursor.advance(8),
        WireType::LengthDelimited => cursor.read_len_delimited().map(drop),
        WireType::Fixed32 => cursor.advance(4),
        WireType::StartGroup => skip_group(cursor, depth + 1, max_depth),
        WireType::EndGroup => Err(CodecError::UnexpectedEndGroup),
    }
}

/// Consume tag/value pairs until the end-group tag closing this group.
fn skip_group(cursor: &mut Cursor<'_>, depth: usize, max_depth: usize) -> CodecResult<()> {
    if depth > max_depth {
        return Err(CodecError::DepthLimitExceeded(max_depth));
    }
    loop {
        if cursor.is_empty() {
            return Err(CodecError::UnexpectedEndGroup);
        }
        let tag = cursor.read_tag()?;
        if tag.wire_type == WireType::EndGroup {
            return Ok(());
        }
        skip_value(cursor, tag.wire_type, depth, max_depth)?;
    }
}
