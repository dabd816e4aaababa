//! Schema-less walk over a message's top-level fields.

use std::fmt;

use super::{skip, CodecError, CodecResult, Cursor, DecodeOptions, Tag, WireType};

/// Content of one field, as far as it can be read without the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    Bytes(&'a [u8]),
    /// A legacy group and everything inside it.
    Group(&'a [u8]),
}

/// One top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField<'a> {
    /// Offset of the field's tag.
    pub offset: usize,
    pub tag: Tag,
    pub value: RawValue<'a>,
}

impl fmt::Display for RawField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{:<5} field {:<3} {:<20} ",
            self.offset,
            self.tag.field,
            self.tag.wire_type.to_string()
        )?;
        match &self.value {
            RawValue::Varint(v) => write!(f, "{} (signed {})", v, *v as i64),
            RawValue::Fixed64(v) => write!(f, "{:#018x}", v),
            RawValue::Fixed32(v) => write!(f, "{:#010x}", v),
            RawValue::Bytes(b) | RawValue::Group(b) => {
                write!(f, "{} bytes", b.len())?;
                if !b.is_empty() {
                    f.write_str(" ")?;
                    for byte in b.iter().take(32) {
                        write!(f, "{:02x}", byte)?;
                    }
                    if b.len() > 32 {
                        f.write_str("..")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Iterator over the top-level fields of `buf`. Stops after the first error.
pub struct RawFields<'a> {
    buf: &'a [u8],
    cursor: Cursor<'a>,
    opts: DecodeOptions,
    failed: bool,
}

pub fn raw_fields(buf: &[u8], opts: DecodeOptions) -> RawFields<'_> {
    RawFields {
        buf,
        cursor: Cursor::new(buf),
        opts,
        failed: false,
    }
}

impl<'a> RawFields<'a> {
    fn read_field(&mut self) -> CodecResult<RawField<'a>> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_tag()?;
        let start = self.cursor.position();

        let value = match tag.wire_type {
            WireType::Varint => RawValue::Varint(self.cursor.read_varint()?),
            WireType::LengthDelimited => RawValue::Bytes(self.cursor.read_len_delimited()?),
            WireType::Fixed64 => {
                self.cursor.advance(8)?;
                let mut le = [0u8; 8];
                le.copy_from_slice(&self.buf[start..start + 8]);
                RawValue::Fixed64(u64::from_le_bytes(le))
            }
            WireType::Fixed32 => {
                self.cursor.advance(4)?;
                let mut le = [0u8; 4];
                le.copy_from_slice(&self.buf[start..start + 4]);
                RawValue::Fixed32(u32::from_le_bytes(le))
            }
            WireType::StartGroup => {
                skip::skip_field(&mut self.cursor, tag.wire_type, &self.opts)?;
                RawValue::Group(&self.buf[start..self.cursor.position()])
            }
            WireType::EndGroup => return Err(CodecError::UnexpectedEndGroup),
        };
        Ok(RawField { offset, tag, value })
    }
}

impl<'a> Iterator for RawFields<'a> {
    type Item = CodecResult<RawField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        let field = self.read_field();
        self.failed = field.is_err();

        Some(field)
    }
}
