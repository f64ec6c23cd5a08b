//! Food-group handlers (Section 4.5): pure request-to-response (or
//! request-to-fan-out) logic, one module per food group. Handlers never
//! touch the wire directly — routers decode the typed body and re-encode
//! whatever a handler returns.

pub mod alert;
pub mod bucp;
pub mod buddy;
pub mod chat;
pub mod chat_nav;
pub mod feedbag;
pub mod icbm;
pub mod locate;
pub mod oservice;

use oscar_wire::bodies::user_info::UserInfo;

use crate::session::Session;

/// Builds the TLV user info the protocol attaches to arrivals, replies
/// and sender-info fields (Section 4.5, Section 4.2).
pub async fn user_info_of(session: &Session) -> UserInfo {
    let fields = session.fields().await;
    UserInfo {
        screen_name: session.screen_name().display().to_string(),
        warning_level: session.warning_level(),
        capabilities: fields.capabilities,
        signon_time: session.signon_time(),
        idle_minutes: fields
            .idle_since
            .map(|since| ((now_unix().saturating_sub(since)) / 60) as u16)
            .unwrap_or(0),
        invisible: fields.invisible,
    }
}

fn now_unix() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32
}
