//! Field tags and scalar field encoding.
//!
//! Every field on the wire starts with a varint tag `(field << 3) | wire_type`.
//! Integer fields are plain varints holding the two's complement bit pattern of
//! the value (no zig-zag). Strings and bytes are a varint length followed by the
//! raw bytes.

use std::fmt;

use super::{skip, varint, CodecError, CodecResult, DecodeOptions};

/// How a field's content is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    /// Legacy group start. Only ever skipped.
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Fixed32),
            other => Err(CodecError::IllegalWireType(other)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "bytes",
            Self::StartGroup => "start-group",
            Self::EndGroup => "end-group",
            Self::Fixed32 => "fixed32",
        };
        write!(f, "{} ({})", *self as u8, name)
    }
}

/// Largest field number accepted on decode.
pub const MAX_FIELD_NUMBER: u64 = i32::MAX as u64;

/// A field tag: field number plus wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub field: u32,
    pub wire_type: WireType,
}

impl Tag {
    pub const fn new(field: u32, wire_type: WireType) -> Self {
        Self { field, wire_type }
    }

    /// The varint the tag is transmitted as.
    pub fn key(&self) -> u64 {
        (u64::from(self.field) << 3) | self.wire_type as u64
    }

    pub fn size(&self) -> usize {
        varint::size_of(self.key())
    }

    pub fn encode(&self, buf: &mut [u8], offset: usize) -> usize {
        varint::encode(buf, offset, self.key())
    }

    /// Fail with [`CodecError::WireTypeMismatch`] unless this tag carries `expected`.
    pub fn expect(&self, expected: WireType, field: &'static str) -> CodecResult<()> {
        if self.wire_type == expected {
            Ok(())
        } else {
            Err(CodecError::WireTypeMismatch {
                field,
                expected,
                actual: self.wire_type,
            })
        }
    }
}

/// Read position over one message's bytes.
///
/// A cursor never moves past the end of its buffer: any read that would
/// overrun fails with [`CodecError::UnexpectedEnd`] instead.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn read_varint(&mut self) -> CodecResult<u64> {
        let (value, next) = varint::decode(self.buf, self.pos)?;
        self.pos = next;
        Ok(value)
    }

    pub fn read_tag(&mut self) -> CodecResult<Tag> {
        let key = self.read_varint()?;
        let field = key >> 3;
        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(CodecError::IllegalTag(field));
        }
        let wire_type = WireType::try_from((key & 0x7) as u8)?;

        Ok(Tag::new(field as u32, wire_type))
    }

    /// Read a length prefix and check that that many bytes remain.
    pub fn read_length(&mut self) -> CodecResult<usize> {
        let raw = self.read_varint()?;
        if (raw as i64) < 0 {
            return Err(CodecError::NegativeLength);
        }
        let len = usize::try_from(raw).map_err(|_| CodecError::UnexpectedEnd)?;
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEnd);
        }
        Ok(len)
    }

    /// Read a length-delimited region and step over it.
    pub fn read_len_delimited(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.read_length()?;
        let start = self.pos;
        self.pos += len;

        Ok(&self.buf[start..self.pos])
    }

    pub fn advance(&mut self, n: usize) -> CodecResult<()> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEnd);
        }
        self.pos += n;
        Ok(())
    }
}

/// A value that can sit behind a field tag: a scalar, a string, bytes, or an
/// optional embedded message.
pub trait FieldValue: Default {
    const WIRE_TYPE: WireType;

    /// Whether the value is omitted under implicit presence.
    fn is_default(&self) -> bool;

    /// Encoded length of the value, not counting its tag.
    fn content_size(&self) -> usize;

    /// Write the value (without its tag) at `offset`, returning the new offset.
    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize>;

    /// Read the value (the tag has already been consumed) and merge it into `self`.
    fn merge_content(&mut self, cursor: &mut Cursor<'_>, opts: &DecodeOptions) -> CodecResult<()>;

    /// Value used when a map entry does not carry this field.
    fn absent() -> Self {
        Self::default()
    }
}

impl FieldValue for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn is_default(&self) -> bool {
        *self == 0
    }

    fn content_size(&self) -> usize {
        // Negative values are sign-extended to 64 bits.
        varint::size_of(i64::from(*self) as u64)
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        Ok(varint::encode(buf, offset, i64::from(*self) as u64))
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, _: &DecodeOptions) -> CodecResult<()> {
        *self = cursor.read_varint()? as i32;
        Ok(())
    }
}

impl FieldValue for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn is_default(&self) -> bool {
        *self == 0
    }

    fn content_size(&self) -> usize {
        varint::size_of(*self as u64)
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        Ok(varint::encode(buf, offset, *self as u64))
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, _: &DecodeOptions) -> CodecResult<()> {
        *self = cursor.read_varint()? as i64;
        Ok(())
    }
}

impl FieldValue for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn is_default(&self) -> bool {
        *self == 0
    }

    fn content_size(&self) -> usize {
        varint::size_of(u64::from(*self))
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        Ok(varint::encode(buf, offset, u64::from(*self)))
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, _: &DecodeOptions) -> CodecResult<()> {
        *self = cursor.read_varint()? as u32;
        Ok(())
    }
}

impl FieldValue for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn is_default(&self) -> bool {
        self.is_empty()
    }

    fn content_size(&self) -> usize {
        varint::size_of(self.len() as u64) + self.len()
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        Ok(write_bytes(buf, offset, self))
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, _: &DecodeOptions) -> CodecResult<()> {
        let bytes = cursor.read_len_delimited()?;
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl FieldValue for String {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn is_default(&self) -> bool {
        self.is_empty()
    }

    fn content_size(&self) -> usize {
        varint::size_of(self.len() as u64) + self.len()
    }

    fn write_content(&self, buf: &mut [u8], offset: usize) -> CodecResult<usize> {
        Ok(write_bytes(buf, offset, self.as_bytes()))
    }

    fn merge_content(&mut self, cursor: &mut Cursor<'_>, _: &DecodeOptions) -> CodecResult<()> {
        let bytes = cursor.read_len_delimited()?;
        let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        self.clear();
        self.push_str(s);
        Ok(())
    }
}

fn write_bytes(buf: &mut [u8], offset: usize, bytes: &[u8]) -> usize {
    let start = varint::encode(buf, offset, bytes.len() as u64);
    let end = start + bytes.len();
    buf[start..end].copy_from_slice(bytes);
    end
}

/// Size of a field that is always written.
pub fn field_size<T: FieldValue>(field: u32, value: &T) -> usize {
    Tag::new(field, T::WIRE_TYPE).size() + value.content_size()
}

/// Size of a field that is left out when it holds its default.
pub fn implicit_field_size<T: FieldValue>(field: u32, value: &T) -> usize {
    if value.is_default() {
        0
    } else {
        field_size(field, value)
    }
}

/// Write a tag and value unconditionally.
pub fn write_field<T: FieldValue>(
    buf: &mut [u8],
    offset: usize,
    field: u32,
    value: &T,
) -> CodecResult<usize> {
    let offset = Tag::new(field, T::WIRE_TYPE).encode(buf, offset);
    value.write_content(buf, offset)
}

/// Write a tag and value unless the value is its default.
pub fn write_implicit_field<T: FieldValue>(
    buf: &mut [u8],
    offset: usize,
    field: u32,
    value: &T,
) -> CodecResult<usize> {
    if value.is_default() {
        Ok(offset)
    } else {
        write_field(buf, offset, field, value)
    }
}

/// Check the tag's wire type and merge the field's content into `value`.
pub fn merge_field<T: FieldValue>(
    cursor: &mut Cursor<'_>,
    tag: Tag,
    name: &'static str,
    value: &mut T,
    opts: &DecodeOptions,
) -> CodecResult<()> {
    tag.expect(T::WIRE_TYPE, name)?;
    value.merge_content(cursor, opts)
}

/// Consume a field whose number the message does not know.
pub fn skip_unknown(
    cursor: &mut Cursor<'_>,
    tag: Tag,
    message: &'static str,
    opts: &DecodeOptions,
) -> CodecResult<()> {
    tracing::trace!(
        "{}: skipping unknown field {} (wire type {})",
        message,
        tag.field,
        tag.wire_type
    );
    skip::skip_field(cursor, tag.wire_type, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_field<T: FieldValue>(field: u32, value: &T) -> Vec<u8> {
        let mut buf = vec![0; field_size(field, value)];
        let n = write_field(&mut buf, 0, field, value).unwrap();
        assert_eq!(n, buf.len());
        buf
    }

    fn decode_field<T: FieldValue>(bytes: &[u8]) -> CodecResult<(Tag, T)> {
        let mut cursor = Cursor::new(bytes);
        let tag = cursor.read_tag()?;
        let mut value = T::default();
        merge_field(&mut cursor, tag, "test", &mut value, &DecodeOptions::default())?;
        assert!(cursor.is_empty());
        Ok((tag, value))
    }

    #[test]
    fn test_tag_key() {
        assert_eq!(Tag::new(1, WireType::LengthDelimited).key(), 0x0a);
        assert_eq!(Tag::new(2, WireType::Varint).key(), 0x10);
        assert_eq!(Tag::new(6, WireType::Varint).key(), 0x30);
        assert_eq!(Tag::new(16, WireType::Varint).size(), 2);
    }

    #[test]
    fn test_read_tag() {
        let mut cursor = Cursor::new(&[0x2a, 0xf8, 0x06]);
        assert_eq!(
            cursor.read_tag().unwrap(),
            Tag::new(5, WireType::LengthDelimited)
        );
        assert_eq!(cursor.read_tag().unwrap(), Tag::new(111, WireType::Varint));
    }

    #[test]
    fn test_illegal_tags() {
        assert_eq!(
            Cursor::new(&[0x02]).read_tag(),
            Err(CodecError::IllegalTag(0))
        );
        assert_eq!(
            Cursor::new(&[0x0e]).read_tag(),
            Err(CodecError::IllegalWireType(6))
        );
    }

    #[test]
    fn test_signed_scalars() {
        assert_eq!(encode_field(1, &5i32), vec![0x08, 0x05]);

        let negative = encode_field(1, &-1i32);
        assert_eq!(negative.len(), 11);
        assert_eq!(decode_field::<i32>(&negative).unwrap().1, -1);

        let stamp = encode_field(2, &i64::MIN);
        assert_eq!(decode_field::<i64>(&stamp).unwrap().1, i64::MIN);
    }

    #[test]
    fn test_string_field() {
        let bytes = encode_field(2, &String::from("tcp"));
        assert_eq!(bytes, vec![0x12, 0x03, b't', b'c', b'p']);
        assert_eq!(decode_field::<String>(&bytes).unwrap().1, "tcp");
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(
            decode_field::<String>(&[0x0a, 0x02, 0xc3, 0x28]).unwrap_err(),
            CodecError::InvalidUtf8
        );
    }

    #[test]
    fn test_wire_type_mismatch() {
        let err = decode_field::<u32>(&[0x0a, 0x01, 0x00]).unwrap_err();
        assert_eq!(
            err,
            CodecError::WireTypeMismatch {
                field: "test",
                expected: WireType::Varint,
                actual: WireType::LengthDelimited,
            }
        );
    }

    #[test]
    fn test_length_checks() {
        let mut cursor = Cursor::new(&[0x05, 0x01, 0x02]);
        assert_eq!(cursor.read_len_delimited(), Err(CodecError::UnexpectedEnd));

        let mut negative = vec![0xff; 9];
        negative.push(0x01);
        let mut cursor = Cursor::new(&negative);
        assert_eq!(cursor.read_length(), Err(CodecError::NegativeLength));
    }

    #[test]
    fn test_implicit_presence() {
        assert_eq!(implicit_field_size(4, &0u32), 0);
        let mut buf = [0u8; 4];
        assert_eq!(write_implicit_field(&mut buf, 0, 4, &0u32).unwrap(), 0);
        assert_eq!(write_implicit_field(&mut buf, 0, 4, &1u32).unwrap(), 2);
        assert_eq!(&buf[..2], &[0x20, 0x01]);
    }
}
