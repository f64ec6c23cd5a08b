//! ICBM handlers (Section 4.5: "ICBM (Instant messages)").

use oscar_types::FoodGroup;
use oscar_wire::bodies::icbm::{self, ChannelMsgToClient, ChannelMsgToHost, ClientEvent, EvilReply, EvilRequest, HostAck, ParameterReply};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacErrorCode, SnacHeader};

use crate::collab::BlockState;
use crate::error::ServerError;
use crate::session::Session;
use crate::state::AppState;

use super::{buddy, user_info_of};

const MAX_MSG_SIZE: u16 = 8000;
const MAX_SENDER_WARNING: u16 = 999;
const MAX_RECV_WARNING: u16 = 999;

const NAMED_WARNING: u16 = 100;
const ANON_WARNING: u16 = 30;

pub fn parameter_query(header: &SnacHeader) -> RawSnac {
    let reply = ParameterReply {
        max_msg_size: MAX_MSG_SIZE,
        max_sender_warning: MAX_SENDER_WARNING,
        max_recv_warning: MAX_RECV_WARNING,
    };
    let mut w = Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(icbm::PARAMETER_REPLY),
        body: w.into_bytes(),
    }
}

fn canonical(name: &str) -> String {
    oscar_types::ScreenName::new(name).canonical().to_string()
}

fn error_reply(header: &SnacHeader, code: SnacErrorCode) -> RawSnac {
    let mut w = Writer::new();
    w.u16(code.as_u16());
    RawSnac {
        header: header.error_reply(),
        body: w.into_bytes(),
    }
}

/// `ChannelMsgToHost`: relays an instant message, masking blocks as
/// not-logged-on (Section 4.5).
pub async fn channel_msg_to_host(
    state: &AppState,
    session: &Session,
    header: &SnacHeader,
    body: ChannelMsgToHost,
) -> Result<Option<RawSnac>, ServerError> {
    let sender_name = session.screen_name().canonical();
    let target_name = canonical(&body.target);

    match state.persistence.blocked(sender_name, &target_name).await {
        BlockState::ABlocksB => return Ok(Some(error_reply(header, SnacErrorCode::InLocalPermitDeny))),
        BlockState::BBlocksA => return Ok(Some(error_reply(header, SnacErrorCode::NotLoggedOn))),
        BlockState::None => {}
    }

    let Some(target) = state.sessions.lookup_by_name(&target_name).await else {
        return Ok(Some(error_reply(header, SnacErrorCode::NotLoggedOn)));
    };

    let client_msg = ChannelMsgToClient {
        cookie: body.cookie,
        channel: body.channel,
        sender: user_info_of(session).await,
        tlvs: body.tlvs.clone(),
    };
    let mut w = Writer::new();
    client_msg.encode(&mut w);
    let relayed = RawSnac {
        header: SnacHeader::new(FoodGroup::Icbm.as_u16(), icbm::CHANNEL_MSG_TO_CLIENT, 0),
        body: w.into_bytes(),
    };
    let _ = target.relay(relayed);

    if body.tlvs.has(icbm::TAG_REQUEST_HOST_ACK) {
        let ack = HostAck {
            cookie: body.cookie,
            channel: body.channel,
            target: body.target.clone(),
        };
        let mut w = Writer::new();
        ack.encode(&mut w);
        return Ok(Some(RawSnac {
            header: header.reply_to(icbm::HOST_ACK),
            body: w.into_bytes(),
        }));
    }
    Ok(None)
}

/// `EvilRequest`: applies a warning, re-announces the target's arrival so
/// buddies see the updated level, and replies with the new totals.
pub async fn evil_request(
    state: &AppState,
    session: &Session,
    header: &SnacHeader,
    body: EvilRequest,
) -> Result<Option<RawSnac>, ServerError> {
    let sender_name = session.screen_name().canonical();
    let target_name = canonical(&body.target);

    if target_name == sender_name {
        return Ok(Some(error_reply(header, SnacErrorCode::NotSupportedByHost)));
    }

    match state.persistence.blocked(sender_name, &target_name).await {
        BlockState::ABlocksB => return Ok(Some(error_reply(header, SnacErrorCode::InLocalPermitDeny))),
        BlockState::BBlocksA => return Ok(Some(error_reply(header, SnacErrorCode::NotLoggedOn))),
        BlockState::None => {}
    }

    let Some(target) = state.sessions.lookup_by_name(&target_name).await else {
        return Ok(None);
    };

    let applied = if body.send_as_anon { ANON_WARNING } else { NAMED_WARNING };
    let updated = target.add_warning(applied);

    let notice_header = if body.send_as_anon {
        SnacHeader::new(FoodGroup::OService.as_u16(), oscar_wire::bodies::oservice::EVIL_NOTIFICATION_ANON, 0)
    } else {
        SnacHeader::new(FoodGroup::OService.as_u16(), oscar_wire::bodies::oservice::EVIL_NOTIFICATION, 0)
    };
    let mut w = Writer::new();
    if body.send_as_anon {
        oscar_wire::bodies::oservice::EvilNotificationAnon { new_evil: updated }.encode(&mut w);
    } else {
        oscar_wire::bodies::oservice::EvilNotification {
            new_evil: updated,
            snitcher: user_info_of(session).await,
        }
        .encode(&mut w);
    }
    let _ = target.relay(RawSnac {
        header: notice_header,
        body: w.into_bytes(),
    });

    buddy::broadcast_arrived(state, &target).await;

    let reply = EvilReply { applied, updated };
    let mut w = Writer::new();
    reply.encode(&mut w);
    Ok(Some(RawSnac {
        header: header.reply_to(icbm::EVIL_REPLY),
        body: w.into_bytes(),
    }))
}

/// `ClientEvent`: forwards a typing indicator verbatim unless blocked.
pub async fn client_event(state: &AppState, session: &Session, body: ClientEvent) {
    let sender_name = session.screen_name().canonical();
    let target_name = canonical(&body.target);
    if state.persistence.blocked(sender_name, &target_name).await != BlockState::None {
        return;
    }
    let Some(target) = state.sessions.lookup_by_name(&target_name).await else {
        return;
    };
    let mut w = Writer::new();
    body.encode(&mut w);
    let _ = target.relay(RawSnac {
        header: SnacHeader::new(FoodGroup::Icbm.as_u16(), icbm::CLIENT_EVENT, 0),
        body: w.into_bytes(),
    });
}
