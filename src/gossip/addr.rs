//! Unresolved network address record.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::TextFields;
use crate::protocol::{self, CodecResult, Cursor, DecodeOptions, Message, Tag};

/// A network endpoint as advertised by a node, not yet resolved.
///
/// Field 1 is the network (`"tcp"`), field 2 the `host:port` address. Both are
/// always written, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedAddr {
    pub network_field: String,
    pub address_field: String,
}

impl UnresolvedAddr {
    pub fn new(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network_field: network.into(),
            address_field: address.into(),
        }
    }

    pub fn tcp(address: impl Into<String>) -> Self {
        Self::new("tcp", address)
    }

    pub fn is_empty(&self) -> bool {
        self.network_field.is_empty() && self.address_field.is_empty()
    }
}

impl fmt::Display for UnresolvedAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write!(f, "{}://{}", self.network_field, self.address_field);
        }
        let mut text = TextFields::new(f);
        text.string("network_field", &self.network_field)?;
        text.string("address_field", &self.address_field)
    }
}

impl Message for UnresolvedAddr {
    const NAME: &'static str = "UnresolvedAddr";

    fn size(&self) -> usize {
        protocol::field_size(1, &self.network_field) + protocol::field_size(2, &self.address_field)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let i = protocol::write_field(buf, 0, 1, &self.network_field)?;
        protocol::write_field(buf, i, 2, &self.address_field)
    }

    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()> {
        match tag.field {
            1 => protocol::merge_field(cursor, tag, "network_field", &mut self.network_field, opts),
            2 => protocol::merge_field(cursor, tag, "address_field", &mut self.address_field, opts),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CodecError;

    #[test]
    fn test_layout() {
        let addr = UnresolvedAddr::tcp("h:1");
        assert_eq!(
            addr.marshal().unwrap(),
            vec![0x0a, 0x03, b't', b'c', b'p', 0x12, 0x03, b'h', b':', b'1']
        );
    }

    #[test]
    fn test_empty_addr_writes_both_fields() {
        let addr = UnresolvedAddr::default();
        assert_eq!(addr.marshal().unwrap(), vec![0x0a, 0x00, 0x12, 0x00]);
        assert_eq!(UnresolvedAddr::unmarshal(&[]).unwrap(), addr);
    }

    #[test]
    fn test_roundtrip() {
        let addr = UnresolvedAddr::tcp("10.0.0.1:26257");
        let bytes = addr.marshal().unwrap();
        assert_eq!(bytes.len(), addr.size());
        assert_eq!(UnresolvedAddr::unmarshal(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_wrong_wire_type() {
        let err = UnresolvedAddr::unmarshal(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::WireTypeMismatch {
                field: "network_field",
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        let addr = UnresolvedAddr::tcp("h:1");
        assert_eq!(
            addr.to_string(),
            r#"network_field:"tcp" address_field:"h:1""#
        );
        assert_eq!(format!("{:#}", addr), "tcp://h:1");
    }
}
