//! ChatNav router (Section 4.4, Section 4.5: "ChatNav").

use std::sync::Arc;

use oscar_wire::bodies::chat_nav::{self, CreateRoom, RequestRoomInfo};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacErrorCode, SnacHeader};

use crate::error::ServerError;
use crate::handlers;
use crate::session::Session;
use crate::state::AppState;

pub async fn route(
    state: &AppState,
    session: &Arc<Session>,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        chat_nav::REQUEST_CHAT_RIGHTS => Ok(Some(handlers::chat_nav::request_chat_rights(header))),
        chat_nav::REQUEST_ROOM_INFO => {
            let body = RequestRoomInfo::decode(&mut r)?;
            match handlers::chat_nav::request_room_info(state, header, body).await {
                Ok(reply) => Ok(Some(reply)),
                Err(ServerError::NotLoggedOn) => {
                    let mut w = oscar_wire::codec::Writer::new();
                    w.u16(SnacErrorCode::InvalidSnac.as_u16());
                    Ok(Some(RawSnac {
                        header: header.error_reply(),
                        body: w.into_bytes(),
                    }))
                }
                Err(other) => Err(other),
            }
        }
        chat_nav::CREATE_ROOM => {
            let body = CreateRoom::decode(&mut r)?;
            Ok(Some(handlers::chat_nav::create_room(state, session, header, body).await))
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
