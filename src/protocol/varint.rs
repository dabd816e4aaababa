//! Base-128 variable-length integers.
//!
//! Each byte carries seven data bits, least significant group first. The high
//! bit is set on every byte except the last. A 64-bit value needs at most ten
//! bytes.

use super::{CodecError, CodecResult};

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Write `value` at `offset` and return the offset just past it.
///
/// The caller sizes the buffer with [`size_of`] beforehand; writing past the end
/// of `buf` panics.
pub fn encode(buf: &mut [u8], mut offset: usize, mut value: u64) -> usize {
    while value >= 0x80 {
        buf[offset] = (value as u8 & 0x7f) | 0x80;
        value >>= 7;
        offset += 1;
    }
    buf[offset] = value as u8;
    offset + 1
}

/// Number of bytes [`encode`] writes for `value`.
pub fn size_of(mut value: u64) -> usize {
    let mut n = 1;
    while value >= 0x80 {
        value >>= 7;
        n += 1;
    }
    n
}

/// Read a varint starting at `offset`, returning the value and the offset just
/// past it.
pub fn decode(buf: &[u8], mut offset: usize) -> CodecResult<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;

    loop {
        if shift >= 64 {
            return Err(CodecError::IntegerOverflow);
        }
        let b = *buf.get(offset).ok_or(CodecError::UnexpectedEnd)?;
        offset += 1;
        value |= u64::from(b & 0x7f) << shift;
        if b < 0x80 {
            return Ok((value, offset));
        }
        shift += 7;
    }
}

/// Skip over one varint without decoding it.
pub fn skip(buf: &[u8], offset: usize) -> CodecResult<usize> {
    decode(buf, offset).map(|(_, next)| next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcheck_macros::quickcheck;

    fn encoded(value: u64) -> Vec<u8> {
        let mut buf = vec![0; size_of(value)];
        let n = encode(&mut buf, 0, value);
        assert_eq!(n, buf.len());
        buf
    }

    #[quickcheck]
    fn prop_encode_decode(value: u64) {
        let buf = encoded(value);
        assert_eq!(decode(&buf, 0).unwrap(), (value, buf.len()));
    }

    #[test]
    fn test_encoding() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7f]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
        assert_eq!(encoded(300), vec![0xac, 0x02]);
        assert_eq!(encoded(1000), vec![0xe8, 0x07]);
        assert_eq!(
            encoded(u64::MAX),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_size_of() {
        assert_eq!(size_of(0), 1);
        assert_eq!(size_of(0x7f), 1);
        assert_eq!(size_of(0x80), 2);
        assert_eq!(size_of(0x3fff), 2);
        assert_eq!(size_of(0x4000), 3);
        assert_eq!(size_of(-1i64 as u64), MAX_VARINT_LEN);
    }

    #[test]
    fn test_decode_at_offset() {
        let buf = [0xff, 0xac, 0x02, 0x05];
        assert_eq!(decode(&buf, 1).unwrap(), (300, 3));
        assert_eq!(decode(&buf, 3).unwrap(), (5, 4));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode(&[], 0), Err(CodecError::UnexpectedEnd));
        assert_eq!(decode(&[0x80, 0x80], 0), Err(CodecError::UnexpectedEnd));
    }

    #[test]
    fn test_decode_overflow() {
        let buf = [0xff; 11];
        assert_eq!(decode(&buf, 0), Err(CodecError::IntegerOverflow));

        // Ten groups with the last one terminating is still fine.
        let mut buf = [0xff; 10];
        buf[9] = 0x01;
        assert_eq!(decode(&buf, 0).unwrap(), (u64::MAX, 10));
    }
}
