//! Alert food group bodies (Section 4.5: "Alert").
//!
//! The server never interprets Alert subgroups; it accepts and
//! acknowledges them, logging the opaque payload. Subgroup-specific
//! structure lives in real AIM clients' mail/news notification UI, which
//! is out of scope here.

use crate::codec::{Reader, Writer};
use crate::Result;

pub const NOTIFY_CAPABILITIES: u16 = 0x0002;
pub const NOTIFY_TOPICS: u16 = 0x0003;

/// Any Alert subgroup's body, carried through unparsed.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OpaquePayload {
    pub raw: Vec<u8>,
}

impl OpaquePayload {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self { raw: r.rest() })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.fixed(&self.raw);
    }
}
