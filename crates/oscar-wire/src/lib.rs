//! # oscar-wire
//!
//! Binary codec for the FLAP/SNAC wire protocol (Section 4.1).
//!
//! This crate provides the complete framing layer for the OSCAR protocol:
//!
//! - **FLAP frames** via [`flap`] — the outer `0x2A`-marked envelope with a
//!   per-connection sequence number.
//! - **SNAC headers and TLV blocks** via [`snac`] and [`tlv`].
//! - **Primitive read/write helpers** via [`codec`] — big-endian integers,
//!   length-prefixed bytes/strings/lists.
//! - **Typed SNAC bodies** for every food group used by the server, via
//!   [`bodies`].
//!
//! ## Architecture
//!
//! ```text
//! Application (oscar-server handlers)
//!     |
//!     v
//! bodies::*           -- typed request/reply structs, one per SubGroup
//!     |
//!     v
//! snac::SnacHeader     -- (FoodGroup, SubGroup, Flags, RequestId)
//!     |
//!     v
//! flap::FlapFrame      -- 0x2A marker, frame type, sequence, payload
//!     |
//!     v
//! TCP socket
//! ```

pub mod bodies;
pub mod codec;
pub mod flap;
pub mod snac;
pub mod tlv;

/// Error types for wire codec operations.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The connection's read half returned fewer bytes than a length prefix
    /// promised, or hit EOF mid-frame.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    /// A length prefix or tag value was structurally invalid (e.g. a FLAP
    /// frame missing its `0x2A` start marker).
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// A length-prefixed string field was not valid UTF-8.
    #[error("invalid utf-8 in string field: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The `(FoodGroup, SubGroup)` pair has no known body shape.
    #[error("no known body for food group {food_group:#06x} subgroup {sub_group:#06x}")]
    UnknownBody { food_group: u16, sub_group: u16 },

    /// Underlying socket I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for wire codec operations.
pub type Result<T> = std::result::Result<T, WireError>;
