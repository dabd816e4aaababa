//! Gossipwire - Wire codec for gossip exchanges
//!
//! Encodes and decodes the three messages peers trade while gossiping
//! ([`gossip::Request`], [`gossip::Response`], [`gossip::Info`]) in a
//! tag-prefixed, protobuf-compatible binary format.

pub mod config;
pub mod gossip;
pub mod protocol;

pub use gossip::{Delta, HighWaterStamps, Info, Kind, NodeId, Request, Response};
pub use protocol::{CodecError, DecodeOptions, Message};
