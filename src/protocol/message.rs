//! Whole messages and embedded sub-messages.
//!
//! A message encodes in two passes: [`Message::size`] computes the exact
//! length, then [`Message::write_fields`] fills a buffer of that length. An
//! embedded message is written as a length-delimited field whose content is
//! the sub-message's own encoding.

use bytes::BytesMut;

use super::wire::{Cursor, FieldValue, Tag, WireType};
use super::{varint, CodecError, CodecResult, DecodeOptions};

/// A message with a fixed field layout.
pub trait Message: Default {
    /// Name used in log lines.
    const NAME: &'static str;

    /// Exact number of bytes the encoding takes.
    fn size(&self) -> usize;

    /// Write all present fields in ascending field-number order.
    ///
    /// `buf` must be at least [`Message::size`] bytes long.
    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize>;

    /// Decode the value of one field whose tag has already been read.
    /// Unknown field numbers are skipped.
    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()>;

    /// Decode `buf` into `self`. Scalars present in `buf` overwrite, map
    /// entries are upserted and sub-messages are merged.
    fn merge(&mut self, buf: &[u8], opts: &DecodeOptions) -> CodecResult<()> {
        let mut cursor = Cursor::new(buf);

        while !cursor.is_empty() {
            let tag = cursor.read_tag()?;
            if tag.wire_type == WireType::EndGroup {
                return Err(CodecError::UnexpectedEndGroup);
            }
            self.merge_field(&mut cursor, tag, opts)?;
        }
        Ok(())
    }

    /// Encode into the front of `buf`, returning the number of bytes written.
    fn marshal_to(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let size = self.size();
        if buf.len() < size {
            return Err(CodecError::BufferTooSmall {
                needed: size,
                available: buf.len(),
            });
        }
        self.write_fields(&mut buf[..size])
    }

    /// Encode into a freshly allocated vector.
    fn marshal(&self) -> CodecResult<Vec<u8>> {
        let mut buf = vec![0; self.size()];
        let n = self.write_fields(&mut buf)?;

        debug_assert_eq!(n, buf.len());
        buf.truncate(n);

        Ok(buf)
    }

    /// Append the encoding to `buf`. On error `buf` is left as it was.
    fn encode(&self, buf: &mut BytesMut) -> CodecResult<usize> {
        let start = buf.len();
        buf.resize(start + self.size(), 0);

        match self.write_fields(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                buf.truncate(start);
                Err(e)
            }
        }
    }

    fn unmarshal(buf: &[u8]) -> CodecResult<Self> {
        Self::unmarshal_with(buf, &DecodeOptions::default())
    }

    fn unmarshal_with(buf: &[u8], opts: &DecodeOptions) -> CodecResult<Self> {
        if buf.len() > opts.max_message_size {
            return Err(CodecError::MessageTooLarge(
                buf.len(),
                opts.max_message_size,
            ));
        }
        let mut msg = Self::default();
        msg.merge(buf, opts)?;

        Ok(msg)
    }
}

/// Size of an embedded message field, tag included.
pub fn message_field_size<M: Message>(field: u32, msg: &M) -> usize {
    let len = msg.size();
    Tag::new(field, WireType::LengthDelimited).size() + varint::size_of(len as u64) + len
}

/// Write an embedded message field. Embedded messages are always written, even
/// when every field inside is a default.
pub fn write_message_field<M: Message>(
    buf: &mut [u8],
    offset: usize,
    field: u32,
    msg: &M,
) -> CodecResult<usize> {
    let offset = Tag::new(field, WireType::LengthDelimited).encode(buf, offset);
    write_message(buf, offset, msg)
}

/// Length prefix followed by the message bytes.
fn write_message<M: Message>(buf: &mut [u8], offset: usize, msg: &M) -> CodecResult<usize> {
    let len = msg.size();
    let start = varint::encode(buf, offset, len as u64);
    let n = msg.write_fields(&mut buf[start..start + len])?;

    Ok(start + n)
}

/// Merge an embedded message field into `msg`, decoding exactly the bytes its
/// length prefix covers.
pub fn merge_message_field<M: Message>(
    cursor: &mut Cursor<'_>,
    tag: Tag,
    name: &'static str,
    msg: &mut M,
    opts: &DecodeOptions,
) -> CodecResult<()> {
    tag.expect(WireType::LengthDelimited, name)?;
    let bytes = cursor.read_len_delimited()?;

    msg.merge(bytes, opts)
}

/// An embedded message that may be absent: optional fields and message-typed
/// map values.
impl<M: Message> FieldValue for Option<M> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn is_default(&self) -> bool {
        self.is_none()
    }

    fn content_size(&self) -> usize {
        let len = self.as_ref().map_or(0, Message::size);
        varint::size_of(len as u64) + len
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        match self {
            Some(msg) => write_message(buf, offset, msg),
            None => Err(CodecError::NilMapElement),
        }
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, opts: &DecodeOptions) -> CodecResult<()> {
        let bytes = cursor.read_len_delimited()?;
        self.get_or_insert_with(M::default).merge(bytes, opts)
    }

    fn absent() -> Self {
        Some(M::default())
    }
}
