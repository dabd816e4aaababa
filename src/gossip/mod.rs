//! Gossip module - The messages exchanged between gossiping peers
//!
//! A node opens an exchange with a [`Request`] carrying its high-water stamps
//! and any infos it wants to push, and gets back a [`Response`] carrying the
//! infos the requester has not seen yet (or an alternate address to retry
//! against). [`Info`] is the unit of gossiped data in both directions.
//!
//! Map fields (`high_water_stamps`, `delta`) travel as one length-delimited
//! entry per key; see [`crate::protocol::merge_map_entry`].

mod addr;
pub(crate) mod info;
mod request;
mod response;
mod text;
mod value;

pub use addr::*;
pub use info::Info;
pub use request::*;
pub use response::*;
pub use value::*;

use std::collections::BTreeMap;
use std::fmt;

/// Node identifier.
pub type NodeId = i32;

/// Newest origination stamp (Unix nanos) seen per node.
pub type HighWaterStamps = BTreeMap<NodeId, i64>;

/// Infos by key. A `None` value cannot be encoded and fails with
/// [`crate::protocol::CodecError::NilMapElement`].
pub type Delta = BTreeMap<String, Option<Info>>;

/// Renders a delta value as `<info>`, or `<nil>` when absent.
struct DeltaValue<'a>(&'a Option<Info>);

impl fmt::Display for DeltaValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(info) => write!(f, "<{}>", info),
            None => f.write_str("<nil>"),
        }
    }
}

/// The message kinds this crate can encode and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    Request,
    Response,
    Info,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Info => "info",
        })
    }
}
