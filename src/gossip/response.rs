//! Response - the answer to a gossip request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::TextFields;
use super::{Delta, HighWaterStamps, NodeId, UnresolvedAddr};
use crate::protocol::{self, CodecResult, Cursor, DecodeOptions, Message, Tag};

/// Gossip response.
///
/// ```text
/// 1 node_id            varint                   omitted when 0
/// 2 addr               message                  always written
/// 3 alternate          message                  only when set
/// 4 delta              map<string, Info>
/// 5 high_water_stamps  map<int32, int64>
/// ```
///
/// A responder that declines the exchange sets `alternate` to redirect the
/// caller and sends no delta. Encoding does not enforce this, and decoding
/// accepts both being present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    /// Responding node.
    pub node_id: NodeId,
    /// Address of the responding node.
    pub addr: UnresolvedAddr,
    /// When set, the caller should retry against this address instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<UnresolvedAddr>,
    /// Infos originating at nodes newer than the requester's high-water stamps.
    pub delta: Delta,
    /// Newest origination stamp the responder has seen, per node.
    pub high_water_stamps: HighWaterStamps,
}

impl Response {
    pub fn new(node_id: NodeId, addr: UnresolvedAddr) -> Self {
        Self {
            node_id,
            addr,
            ..Self::default()
        }
    }

    /// A response that turns the caller away to `alternate`.
    pub fn redirect(
        node_id: NodeId,
        addr: UnresolvedAddr,
        alternate: UnresolvedAddr,
        high_water_stamps: HighWaterStamps,
    ) -> Self {
        Self {
            node_id,
            addr,
            alternate: Some(alternate),
            delta: Delta::new(),
            high_water_stamps,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.alternate.is_some()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = TextFields::new(f);
        if self.node_id != 0 {
            text.scalar("node_id", self.node_id)?;
        }
        text.message("addr", &self.addr)?;
        if let Some(alternate) = &self.alternate {
            text.message("alternate", alternate)?;
        }
        for (key, info) in &self.delta {
            text.entry("delta", format!("{:?}", key), super::DeltaValue(info))?;
        }
        for (node, stamp) in &self.high_water_stamps {
            text.entry("high_water_stamps", node, stamp)?;
        }
        Ok(())
    }
}

impl Message for Response {
    const NAME: &'static str = "Response";

    fn size(&self) -> usize {
        protocol::implicit_field_size(1, &self.node_id)
            + protocol::message_field_size(2, &self.addr)
            + protocol::implicit_field_size(3, &self.alternate)
            + protocol::map_field_size(4, &self.delta)
            + protocol::map_field_size(5, &self.high_water_stamps)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        if self.alternate.is_some() && !self.delta.is_empty() {
            tracing::warn!(
                "Response from node {} carries both an alternate address and {} delta infos",
                self.node_id,
                self.delta.len()
            );
        }
        let mut i = protocol::write_implicit_field(buf, 0, 1, &self.node_id)?;
        i = protocol::write_message_field(buf, i, 2, &self.addr)?;
        i = protocol::write_implicit_field(buf, i, 3, &self.alternate)?;
        i = protocol::write_map_field(buf, i, 4, &self.delta)?;
        protocol::write_map_field(buf, i, 5, &self.high_water_stamps)
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
            3 => protocol::merge_field(cursor, tag, "alternate", &mut self.alternate, opts),
            4 => protocol::merge_map_entry(cursor, tag, "delta", &mut self.delta, opts),
            5 => protocol::merge_map_entry(
                cursor,
                tag,
                "high_water_stamps",
                &mut self.high_water_stamps,
                opts,
            ),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}
