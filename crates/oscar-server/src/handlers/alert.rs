//! Alert handlers (Section 4.5: "Alert") — every known subgroup is
//! accepted and acknowledged; bodies are logged but otherwise ignored.

use oscar_wire::bodies::alert::OpaquePayload;

use crate::session::Session;

pub fn accept(session: &Session, sub_group: u16, body: &OpaquePayload) {
    tracing::debug!(
        screen_name = session.screen_name().canonical(),
        sub_group,
        bytes = body.raw.len(),
        "accepted Alert notification"
    );
}
