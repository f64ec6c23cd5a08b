//! Application-level error type (Section 4.12).

use oscar_wire::WireError;
use thiserror::Error;

/// Errors surfaced by the core to the dispatcher or a router.
///
/// Each variant maps to a user-visible behavior per the Section 7 table:
/// some become a SNAC error reply and the connection continues, others
/// close the connection.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("session is closed")]
    SessClosed,

    #[error("session notification queue is full")]
    SessQueueFull,

    #[error("unsupported subgroup {food_group:#06x}/{sub_group:#06x}")]
    UnsupportedSubGroup { food_group: u16, sub_group: u16 },

    #[error("target is not logged on")]
    NotLoggedOn,

    #[error("sender has blocked the target (masked as not-logged-on)")]
    InLocalPermitDeny,

    #[error("authentication failed")]
    AuthFailed,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

impl ServerError {
    /// Whether this error should close the connection rather than produce
    /// a SNAC error reply and continue (Section 7).
    #[must_use]
    pub fn closes_connection(&self) -> bool {
        matches!(self, Self::AuthFailed | Self::Wire(_))
    }
}
