//! OService handlers (Section 4.5: "OService"): session-level
//! administration shared by every connection kind.

use oscar_types::FoodGroup;
use oscar_wire::bodies::oservice::{
    self, ClientOnline, ClientVersions, IdleNotification, RateClass, RateParamsReply, ServiceRequest,
    ServiceResponse, SetUserInfoFields, UserInfoUpdate,
};
use oscar_wire::bodies::user_info;
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::session::Session;
use crate::state::AppState;

use super::{buddy, user_info_of};

/// `(FoodGroup, SubGroup)` pairs this server recognises, all governed by
/// the single advertised rate class (Section 4.5: "RateParamsReply").
fn recognised_subgroups() -> Vec<(u16, u16)> {
    use oscar_wire::bodies::{alert, bucp, chat, chat_nav, feedbag, icbm, locate};

    let oservice = FoodGroup::OService.as_u16();
    let locate_fg = FoodGroup::Locate.as_u16();
    let buddy_fg = FoodGroup::Buddy.as_u16();
    let icbm_fg = FoodGroup::Icbm.as_u16();
    let chat_nav_fg = FoodGroup::ChatNav.as_u16();
    let chat_fg = FoodGroup::Chat.as_u16();
    let feedbag_fg = FoodGroup::Feedbag.as_u16();
    let bucp_fg = FoodGroup::Bucp.as_u16();
    let alert_fg = FoodGroup::Alert.as_u16();

    vec![
        (oservice, oservice::CLIENT_VERSIONS),
        (oservice, oservice::RATE_PARAMS_QUERY),
        (oservice, oservice::USER_INFO_QUERY),
        (oservice, oservice::IDLE_NOTIFICATION),
        (oservice, oservice::SET_USER_INFO_FIELDS),
        (oservice, oservice::CLIENT_ONLINE),
        (oservice, oservice::SERVICE_REQUEST),
        (locate_fg, locate::SET_INFO),
        (locate_fg, locate::USER_INFO_QUERY),
        (buddy_fg, oscar_wire::bodies::buddy::RIGHTS_QUERY),
        (buddy_fg, oscar_wire::bodies::buddy::ADD_BUDDIES),
        (buddy_fg, oscar_wire::bodies::buddy::DEL_BUDDIES),
        (icbm_fg, icbm::PARAMETER_QUERY),
        (icbm_fg, icbm::CHANNEL_MSG_TO_HOST),
        (icbm_fg, icbm::EVIL_REQUEST),
        (icbm_fg, icbm::CLIENT_EVENT),
        (chat_nav_fg, chat_nav::REQUEST_CHAT_RIGHTS),
        (chat_nav_fg, chat_nav::REQUEST_ROOM_INFO),
        (chat_nav_fg, chat_nav::CREATE_ROOM),
        (chat_fg, chat::CHANNEL_MSG_TO_HOST),
        (feedbag_fg, feedbag::RIGHTS_QUERY),
        (feedbag_fg, feedbag::QUERY),
        (feedbag_fg, feedbag::QUERY_IF_MODIFIED),
        (feedbag_fg, feedbag::INSERT_ITEM),
        (feedbag_fg, feedbag::UPDATE_ITEM),
        (feedbag_fg, feedbag::DELETE_ITEM),
        (bucp_fg, bucp::CHALLENGE_REQUEST),
        (bucp_fg, bucp::LOGIN_REQUEST),
        (alert_fg, alert::NOTIFY_CAPABILITIES),
        (alert_fg, alert::NOTIFY_TOPICS),
    ]
}

pub fn client_versions(header: &SnacHeader, body: ClientVersions) -> RawSnac {
    let mut w = Writer::new();
    body.encode(&mut w);
    RawSnac {
        header: header.reply_to(oservice::HOST_VERSIONS),
        body: w.into_bytes(),
    }
}

pub fn rate_params_query(header: &SnacHeader) -> RawSnac {
    let class = RateClass {
        id: 1,
        window_size: 20,
        clear_level: 3000,
        alert_level: 2000,
        limit_level: 1500,
        disconnect_level: 800,
        current_level: 4000,
        max_level: 6000,
    };
    let group_rates = recognised_subgroups().into_iter().map(|(fg, sg)| (fg, sg, 1)).collect();
    let reply = RateParamsReply {
        classes: vec![class],
        group_rates,
    };
    let mut w = Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(oservice::RATE_PARAMS_REPLY),
        body: w.into_bytes(),
    }
}

pub async fn user_info_query(header: &SnacHeader, session: &Session) -> RawSnac {
    let reply = UserInfoUpdate {
        info: user_info_of(session).await,
    };
    let mut w = Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(oservice::USER_INFO_UPDATE),
        body: w.into_bytes(),
    }
}

/// `IdleNotification`: on a transition, re-announces the session's arrival
/// so buddies see the updated idle state (Section 4.5).
pub async fn idle_notification(state: &AppState, session: &Session, body: IdleNotification) {
    if session.set_idle_seconds(body.idle_seconds).await {
        buddy::broadcast_arrived(state, session).await;
    }
}

/// `SetUserInfoFields`: only the status TLV (0x06) is meaningful here;
/// toggling invisibility triggers an arrival or departure broadcast.
pub async fn set_user_info_fields(state: &AppState, session: &Session, body: SetUserInfoFields) {
    let Some(status) = body.tlvs.get(user_info::TAG_USER_STATUS).and_then(|t| t.as_u16()) else {
        return;
    };
    let invisible = status & user_info::STATUS_INVISIBLE != 0;
    if session.set_invisible(invisible).await {
        if invisible {
            buddy::broadcast_departed(state, session).await;
        } else {
            buddy::broadcast_arrived(state, session).await;
        }
    }
}

/// `ClientOnline`: marks the session interactive and issues the initial
/// buddy-arrival burst (Section 4.6).
pub async fn client_online(state: &AppState, session: &Session, _body: ClientOnline) {
    buddy::initial_burst(state, session).await;
}

/// `ServiceRequest(FoodGroup=Chat, ...)`: resolves the room cookie and
/// mints a fresh chat cookie binding that room to the caller's session,
/// via the `Auth` collaborator. The caller joins the room's participant
/// registry only once it actually connects to the chat listener and
/// presents this cookie in its own handshake (Section 4.6).
pub async fn service_request(
    state: &AppState,
    session: &std::sync::Arc<Session>,
    header: &SnacHeader,
    body: ServiceRequest,
) -> Result<Option<RawSnac>, ServerError> {
    if FoodGroup::from_u16(body.food_group) != FoodGroup::Chat {
        return Err(ServerError::UnsupportedSubGroup {
            food_group: FoodGroup::OService.as_u16(),
            sub_group: oservice::SERVICE_REQUEST,
        });
    }

    let room = state
        .chat_rooms
        .lookup(&body.room_cookie)
        .await
        .ok_or(ServerError::NotLoggedOn)?;

    let chat_cookie = state.auth.mint_chat_session(room.cookie, session.id()).await;

    let response = ServiceResponse {
        service_food_group: FoodGroup::Chat.as_u16(),
        host: state.config.network.oscar_host.clone(),
        port: state.config.network.chat_port,
        cookie: chat_cookie,
    };
    let mut w = Writer::new();
    response.encode(&mut w);
    Ok(Some(RawSnac {
        header: header.reply_to(oservice::SERVICE_RESPONSE),
        body: w.into_bytes(),
    }))
}

