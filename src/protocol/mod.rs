//! Protocol module - Tag-prefixed binary wire format
//!
//! The format is the usual protobuf-style encoding:
//! - every field starts with a varint tag `(field_number << 3) | wire_type`
//! - integers are unsigned varints (no zig-zag)
//! - strings, bytes, embedded messages and map entries are length-delimited
//!
//! Fields are identified by number only, so a decoder accepts them in any
//! order and skips numbers it does not know.

mod error;
mod map;
mod message;
mod raw;
mod skip;
pub mod varint;
mod wire;

pub use error::*;
pub use map::*;
pub use message::*;
pub use raw::*;
pub use skip::*;
pub use wire::*;

/// Default cap on nested group skipping.
pub const DEFAULT_MAX_SKIP_DEPTH: usize = 64;

/// Default cap on a single encoded message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// How many legacy groups may nest inside each other while skipping.
    pub max_skip_depth: usize,
    /// Longest input accepted by [`Message::unmarshal_with`].
    pub max_message_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_skip_depth: DEFAULT_MAX_SKIP_DEPTH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
