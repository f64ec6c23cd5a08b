//! ChatNav handlers (Section 4.5: "ChatNav").

use oscar_wire::bodies::chat_nav::{self, CreateRoom, NavInfo, RequestRoomInfo};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::session::Session;
use crate::state::AppState;

/// `RequestChatRights`: a single fixed exchange description.
pub fn request_chat_rights(header: &SnacHeader) -> RawSnac {
    let info = NavInfo {
        exchange: 4,
        cookie: [0u8; 16],
        instance: 0,
        detail_level: 2,
        name: "default exchange".to_string(),
    };
    let mut w = Writer::new();
    info.encode(&mut w);
    RawSnac {
        header: header.reply_to(chat_nav::NAV_INFO),
        body: w.into_bytes(),
    }
}

pub async fn request_room_info(
    state: &AppState,
    header: &SnacHeader,
    body: RequestRoomInfo,
) -> Result<RawSnac, ServerError> {
    let room = state.chat_rooms.lookup(&body.cookie).await.ok_or(ServerError::NotLoggedOn)?;
    let info = NavInfo {
        exchange: room.exchange,
        cookie: room.cookie,
        instance: room.instance,
        detail_level: room.detail_level,
        name: room.name.clone(),
    };
    let mut w = Writer::new();
    info.encode(&mut w);
    Ok(RawSnac {
        header: header.reply_to(chat_nav::NAV_INFO),
        body: w.into_bytes(),
    })
}

/// `CreateRoom`: resolve-or-create by name under `exchange` (Section 4.5).
pub async fn create_room(
    state: &AppState,
    session: &std::sync::Arc<Session>,
    header: &SnacHeader,
    body: CreateRoom,
) -> RawSnac {
    let existing = if body.cookie == "create" {
        None
    } else {
        state.chat_rooms.find_by_name(body.exchange, &body.name).await
    };

    let room = match existing {
        Some(room) => room,
        None => {
            state
                .chat_rooms
                .create(
                    body.exchange,
                    body.instance,
                    body.detail_level,
                    body.name.clone(),
                    session.screen_name().canonical().to_string(),
                )
                .await
        }
    };

    let info = NavInfo {
        exchange: room.exchange,
        cookie: room.cookie,
        instance: room.instance,
        detail_level: room.detail_level,
        name: room.name.clone(),
    };
    let mut w = Writer::new();
    info.encode(&mut w);
    RawSnac {
        header: header.reply_to(chat_nav::NAV_INFO),
        body: w.into_bytes(),
    }
}
