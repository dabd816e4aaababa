//! Info - the basic unit of gossiped data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::TextFields;
use super::{NodeId, Value};
use crate::protocol::{self, CodecResult, Cursor, DecodeOptions, Message, Tag};

/// A value together with where it came from and how long it lives.
///
/// ```text
/// 1 value       message  always written
/// 2 orig_stamp  varint   int64, omitted when 0
/// 3 ttl_stamp   varint   int64, omitted when 0
/// 4 hops        varint   uint32, omitted when 0
/// 5 node_id     varint   int32, omitted when 0
/// 6 peer_id     varint   int32, omitted when 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub value: Value,
    /// Wall time at the originating node when the info was created (Unix nanos).
    pub orig_stamp: i64,
    /// Wall time after which the info is discarded (Unix nanos).
    pub ttl_stamp: i64,
    /// Number of relays since origination.
    pub hops: u32,
    /// Originating node.
    pub node_id: NodeId,
    /// Node that passed this info on, which need not be the originator.
    pub peer_id: NodeId,
}

impl Info {
    pub fn new(value: Value, node_id: NodeId, orig_stamp: i64, ttl_stamp: i64) -> Self {
        Self {
            value,
            orig_stamp,
            ttl_stamp,
            hops: 0,
            node_id,
            peer_id: node_id,
        }
    }

    /// Whether `now` is past the info's time to live.
    pub fn expired(&self, now: i64) -> bool {
        now > self.ttl_stamp
    }

    /// Whether the info originated after `high_water_stamp`, i.e. a peer that has
    /// seen everything up to that stamp does not have it yet.
    pub fn is_fresh(&self, high_water_stamp: i64) -> bool {
        self.orig_stamp > high_water_stamp
    }

    /// Copy of the info as relayed by `peer_id`: one more hop.
    pub fn relayed(&self, peer_id: NodeId) -> Self {
        Self {
            hops: self.hops.saturating_add(1),
            peer_id,
            ..self.clone()
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = TextFields::new(f);
        text.message("value", &self.value)?;
        if self.orig_stamp != 0 {
            text.scalar("orig_stamp", self.orig_stamp)?;
        }
        if self.ttl_stamp != 0 {
            text.scalar("ttl_stamp", self.ttl_stamp)?;
        }
        if self.hops != 0 {
            text.scalar("hops", self.hops)?;
        }
        if self.node_id != 0 {
            text.scalar("node_id", self.node_id)?;
        }
        if self.peer_id != 0 {
            text.scalar("peer_id", self.peer_id)?;
        }
        Ok(())
    }
}

impl Message for Info {
    const NAME: &'static str = "Info";

    fn size(&self) -> usize {
        protocol::message_field_size(1, &self.value)
            + protocol::implicit_field_size(2, &self.orig_stamp)
            + protocol::implicit_field_size(3, &self.ttl_stamp)
            + protocol::implicit_field_size(4, &self.hops)
            + protocol::implicit_field_size(5, &self.node_id)
            + protocol::implicit_field_size(6, &self.peer_id)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let mut i = protocol::write_message_field(buf, 0, 1, &self.value)?;
        i = protocol::write_implicit_field(buf, i, 2, &self.orig_stamp)?;
        i = protocol::write_implicit_field(buf, i, 3, &self.ttl_stamp)?;
        i = protocol::write_implicit_field(buf, i, 4, &self.hops)?;
        i = protocol::write_implicit_field(buf, i, 5, &self.node_id)?;
        protocol::write_implicit_field(buf, i, 6, &self.peer_id)
    }

    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()> {
        match tag.field {
            1 => protocol::merge_message_field(cursor, tag, "value", &mut self.value, opts),
            2 => protocol::merge_field(cursor, tag, "orig_stamp", &mut self.orig_stamp, opts),
            3 => protocol::merge_field(cursor, tag, "ttl_stamp", &mut self.ttl_stamp, opts),
            4 => protocol::merge_field(cursor, tag, "hops", &mut self.hops, opts),
            5 => protocol::merge_field(cursor, tag, "node_id", &mut self.node_id, opts),
            6 => protocol::merge_field(cursor, tag, "peer_id", &mut self.peer_id, opts),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}
