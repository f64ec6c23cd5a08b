//! Locate handlers (Section 4.5: "Locate"): profile and "set info".

use oscar_wire::bodies::locate::{self, OpaquePayload, SetInfo, UserInfoQuery, UserInfoReply, REQUEST_AWAY_MESSAGE, REQUEST_PROFILE};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacErrorCode, SnacHeader};

use crate::error::ServerError;
use crate::session::Session;
use crate::state::AppState;

use super::{buddy, user_info_of};

/// `SetInfo`: applies profile/away/capability updates; a transition into
/// or out of "away" re-announces arrival so buddies see the change.
pub async fn set_info(state: &AppState, session: &Session, body: SetInfo) {
    let mut away_transitioned = false;

    if let Some(profile) = body.profile {
        session.set_profile(Some(profile.clone())).await;
        state.persistence.upsert_profile(session.screen_name().canonical(), profile).await;
    }
    if let Some(away) = body.away_message {
        let was_away = session.fields().await.away_message.is_some();
        let now_away = if away.is_empty() { None } else { Some(away) };
        away_transitioned = was_away != now_away.is_some();
        session.set_away_message(now_away).await;
    }
    if let Some(capabilities) = body.capabilities {
        session.set_capabilities(capabilities).await;
    }

    if away_transitioned {
        buddy::broadcast_arrived(state, session).await;
    }
}

/// `UserInfoQuery`: looks up `target`; returns `NotLoggedOn` if offline.
pub async fn user_info_query(
    state: &AppState,
    header: &SnacHeader,
    body: UserInfoQuery,
) -> Result<RawSnac, ServerError> {
    let canonical = oscar_types::ScreenName::new(&body.target).canonical().to_string();
    let Some(target) = state.sessions.lookup_by_name(&canonical).await else {
        return Err(ServerError::NotLoggedOn);
    };

    let fields = target.fields().await;
    let profile = (body.request_type & REQUEST_PROFILE != 0).then(|| fields.profile.clone()).flatten();
    let away_message = (body.request_type & REQUEST_AWAY_MESSAGE != 0)
        .then(|| fields.away_message.clone())
        .flatten();

    let reply = UserInfoReply {
        info: user_info_of(&target).await,
        profile,
        away_message,
    };
    let mut w = Writer::new();
    reply.encode(&mut w);
    Ok(RawSnac {
        header: header.reply_to(locate::USER_INFO_REPLY),
        body: w.into_bytes(),
    })
}

/// Builds the `NotLoggedOn` error reply a router sends when a handler
/// returns [`ServerError::NotLoggedOn`].
#[must_use]
pub fn not_logged_on_error(header: &SnacHeader) -> RawSnac {
    RawSnac {
        header: header.error_reply(),
        body: {
            let mut w = Writer::new();
            w.u16(SnacErrorCode::NotLoggedOn.as_u16());
            w.into_bytes()
        },
    }
}

/// `SetDirInfo` / `SetKeywordInfo`: accepted and logged, never interpreted
/// (Section 4.5: "payload forwarded to the persistence collaborator").
pub fn opaque_payload(session: &Session, body: &OpaquePayload) {
    tracing::debug!(
        screen_name = session.screen_name().canonical(),
        bytes = body.raw.len(),
        "accepted opaque Locate payload"
    );
}
