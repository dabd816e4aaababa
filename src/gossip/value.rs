//! Versioned value payload carried by an info.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::TextFields;
use crate::protocol::{self, CodecResult, Cursor, DecodeOptions, Message, Tag};

/// Hybrid logical clock reading: wall time in nanoseconds plus a logical
/// counter to order events within the same wall time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub wall_time: i64,
    pub logical: i32,
}

impl Timestamp {
    pub fn new(wall_time: i64, logical: i32) -> Self {
        Self { wall_time, logical }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = TextFields::new(f);
        if self.wall_time != 0 {
            text.scalar("wall_time", self.wall_time)?;
        }
        if self.logical != 0 {
            text.scalar("logical", self.logical)?;
        }
        Ok(())
    }
}

impl Message for Timestamp {
    const NAME: &'static str = "Timestamp";

    fn size(&self) -> usize {
        protocol::implicit_field_size(1, &self.wall_time)
            + protocol::implicit_field_size(2, &self.logical)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let i = protocol::write_implicit_field(buf, 0, 1, &self.wall_time)?;
        protocol::write_implicit_field(buf, i, 2, &self.logical)
    }

    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()> {
        match tag.field {
            1 => protocol::merge_field(cursor, tag, "wall_time", &mut self.wall_time, opts),
            2 => protocol::merge_field(cursor, tag, "logical", &mut self.logical, opts),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}

/// Opaque bytes plus the timestamp of the write that produced them.
///
/// `raw_bytes` is left off the wire when empty; `timestamp` is always written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub raw_bytes: Vec<u8>,
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl Value {
    pub fn new(raw_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            raw_bytes: raw_bytes.into(),
            timestamp: Timestamp::default(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = TextFields::new(f);
        if !self.raw_bytes.is_empty() {
            text.bytes("raw_bytes", &self.raw_bytes)?;
        }
        text.message("timestamp", &self.timestamp)
    }
}

impl Message for Value {
    const NAME: &'static str = "Value";

    fn size(&self) -> usize {
        protocol::implicit_field_size(1, &self.raw_bytes)
            + protocol::message_field_size(2, &self.timestamp)
    }

    fn write_fields(&self, buf: &mut [u8]) -> CodecResult<usize> {
        let i = protocol::write_implicit_field(buf, 0, 1, &self.raw_bytes)?;
        protocol::write_message_field(buf, i, 2, &self.timestamp)
    }

    fn merge_field(
        &mut self,
        cursor: &mut Cursor<'_>,
        tag: Tag,
        opts: &DecodeOptions,
    ) -> CodecResult<()> {
        match tag.field {
            1 => protocol::merge_field(cursor, tag, "raw_bytes", &mut self.raw_bytes, opts),
            2 => protocol::merge_message_field(cursor, tag, "timestamp", &mut self.timestamp, opts),
            _ => protocol::skip_unknown(cursor, tag, Self::NAME, opts),
        }
    }
}
