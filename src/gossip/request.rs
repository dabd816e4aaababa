//! Request - what a node sends when it opens a gossip exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::TextFields;
use super::{Delta, HighWaterStamps, Info, NodeId, UnresolvedAddr};
use crate::protocol::{self, CodecResult, Cursor, DecodeOptions, Message, Tag};

/// Gossip request.
///
/// ```text
/// 1 node_id            varint                   omitted when 0
/// 2 addr               message                  always written
/// 3 l_addr             message                  always written
/// 4 high_water_stamps  map<int32, int64>
/// 5 delta              map<string, Info>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Requesting node.
    pub node_id: NodeId,
    /// Address of the requesting client.
    pub addr: UnresolvedAddr,
    /// Local address of the client connection on the requesting node, used
    /// to notice when that connection is dropped.
    pub l_addr: UnresolvedAddr,
    /// Newest origination stamp the requester has seen, per node.
    pub high_water_stamps: HighWaterStamps,
    /// Infos the requester is pushing.
    pub delta: Delta,
}

impl Request {
    pub fn new(node_id: NodeId, addr: UnresolvedAddr, l_addr: UnresolvedAddr) -> Self {
        Self {
            node_id,
            addr,
            l_addr,
            ..Self::default()
        }
    }

    /// Add an info to the delta, replacing any info under the same key.
    pub fn push(&mut self, key: impl Into<String>, info: Info) {
        self.delta.insert(key.into(), Some(info));
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = TextFields::new(f);
        if self.node_id != 0 {
            text.scalar("node_id", self.node_id)?;
        }
        text.message("addr", &self.addr)?;
        text.message("l_addr", &self.l_addr)?;
        for (node, stamp) in &self.high_water_stamps {
            text.entry("high_water_stamps", node, stamp)?;
        }
        for (key, info) in &self.delta {
            text.entry("delta", format!("{:?}", key), super::DeltaValue(info))?;
        }
        Ok(())
    }
}

impl Message for Request {
    const NAME: &'static str = "Request";

    fn size(&self) -> usize {
        protocol::implicit_field_size(1, &self.node_id)
            + protocol::message_field_size(2, &self.addr)
            + protocol::message_field_size(3, &self.l_addr)
            + protocol::map_field_size(4, &self.high_water_stamps)
            + protocol::map_field_size(5, &self.delta)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let mut i = protocol::write_implicit_field(buf, 0, 1, &self.node_id)?;
        i = protocol::write_message_field(buf, i, 2, &self.addr)?;
        i = protocol::write_message_field(buf, i, 3, &self.l_addr)?;
        i = protocol::write_map_field(buf, i, 4, &self.high_water_stamps)?;
        protocol::write_map_field(buf, i, 5, &self.delta)
    }

    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()> {
        match tag.field {
            1 => protocol::merge_field(cursor, tag, "node_id", &mut self.node_id, opts),
            2 => protocol::merge_message_field(cursor, tag, "addr", &mut self.addr, opts),
            3 => protocol::merge_message_field(cursor, tag, "l_addr", &mut self.l_addr, opts),
            4 => protocol::merge_map_entry(
                cursor,
                tag,
                "high_water_stamps",
                &mut self.high_water_stamps,
                opts,
            ),
            5 => protocol::merge_map_entry(cursor, tag, "delta", &mut self.delta, opts),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gossip::info::tests::sample as sample_info;
    use crate::protocol::CodecError;
    use pretty_assertions::assert_eq;
    use qcheck::Arbitrary;
    use qcheck_macros::quickcheck;

    impl Arbitrary for UnresolvedAddr {
        fn arbitrary(g: &mut qcheck::Gen) -> Self {
            Self::new(String::arbitrary(g), String::arbitrary(g))
        }
    }

    impl Arbitrary for Request {
        fn arbitrary(g: &mut qcheck::Gen) -> Self {
            let infos = Vec::<(String, Info)>::arbitrary(g);
            Self {
                node_id: NodeId::arbitrary(g),
                addr: UnresolvedAddr::arbitrary(g),
                l_addr: UnresolvedAddr::arbitrary(g),
                high_water_stamps: HighWaterStamps::arbitrary(g),
                delta: infos.into_iter().map(|(k, v)| (k, Some(v))).collect(),
            }
        }
    }

    fn sample() -> Request {
        let mut req = Request::new(
            3,
            UnresolvedAddr::tcp("a:1"),
            UnresolvedAddr::tcp("l:2"),
        );
        req.high_water_stamps.insert(5, 1000);
        req.high_water_stamps.insert(7, 0);
        req.push("node:5", sample_info());
        req
    }

    #[quickcheck]
    fn prop_roundtrip(req: Request) {
        let bytes = req.marshal().unwrap();
        assert_eq!(bytes.len(), req.size());
        assert_eq!(Request::unmarshal(&bytes).unwrap(), req);
    }

    #[test]
    fn test_roundtrip() {
        let req = sample();
        let bytes = req.marshal().unwrap();

        assert_eq!(bytes.len(), req.size());
        assert_eq!(Request::unmarshal(&bytes).unwrap(), req);
    }

    #[test]
    fn test_layout() {
        let mut req = Request::new(1, UnresolvedAddr::tcp("a"), UnresolvedAddr::default());
        req.high_water_stamps.insert(2, 3);

        assert_eq!(
            req.marshal().unwrap(),
            vec![
                0x08, 0x01, // node_id
                0x12, 0x08, 0x0a, 0x03, b't', b'c', b'p', 0x12, 0x01, b'a', // addr
                0x1a, 0x04, 0x0a, 0x00, 0x12, 0x00, // l_addr
                0x22, 0x04, 0x08, 0x02, 0x10, 0x03, // high_water_stamps
            ]
        );
    }

    #[test]
    fn test_addresses_always_written() {
        let bytes = Request::default().marshal().unwrap();
        assert_eq!(
            bytes,
            vec![0x12, 0x04, 0x0a, 0x00, 0x12, 0x00, 0x1a, 0x04, 0x0a, 0x00, 0x12, 0x00]
        );
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let bytes = sample().marshal().unwrap();
        let mut extended = bytes.clone();
        // field 99, varint 42
        extended.extend_from_slice(&[0x98, 0x06, 0x2a]);

        assert_eq!(
            Request::unmarshal(&extended).unwrap(),
            Request::unmarshal(&bytes).unwrap()
        );
    }

    #[test]
    fn test_delta_last_entry_wins() {
        let first = Info {
            hops: 1,
            ..Info::default()
        };
        let second = Info {
            hops: 2,
            ..Info::default()
        };

        let mut bytes = Vec::new();
        for info in [&first, &second] {
            let mut one = Request::default();
            one.push("k", info.clone());
            bytes.extend(one.marshal().unwrap());
        }
        let req = Request::unmarshal(&bytes).unwrap();

        assert_eq!(req.delta.len(), 1);
        assert_eq!(req.delta["k"], Some(second));
    }

    #[test]
    fn test_delta_entry_without_value() {
        // delta entry holding only the key "k"
        let bytes = [0x2a, 0x03, 0x0a, 0x01, b'k'];
        let req = Request::unmarshal(&bytes).unwrap();

        assert_eq!(req.delta["k"], Some(Info::default()));
    }

    #[test]
    fn test_nil_delta_value() {
        let mut req = sample();
        req.delta.insert("missing".to_owned(), None);

        assert_eq!(req.marshal(), Err(CodecError::NilMapElement));
    }

    #[test]
    fn test_truncated_request() {
        let bytes = sample().marshal().unwrap();
        assert_eq!(
            Request::unmarshal(&bytes[..bytes.len() - 1]),
            Err(CodecError::UnexpectedEnd)
        );
    }

    #[test]
    fn test_display() {
        let mut req = Request::new(1, UnresolvedAddr::tcp("a"), UnresolvedAddr::default());
        req.high_water_stamps.insert(2, 3);
        req.delta.insert("k".to_owned(), None);

        assert_eq!(
            req.to_string(),
            concat!(
                r#"node_id:1 addr:<network_field:"tcp" address_field:"a"> "#,
                r#"l_addr:<network_field:"" address_field:""> "#,
                r#"high_water_stamps:<key:2 value:3> delta:<key:"k" value:<nil>>"#
            )
        );
    }
}
