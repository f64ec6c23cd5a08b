//! Chat router (Section 4.4, Section 4.5: "Chat"), used only on chat-room
//! connections.

use oscar_wire::bodies::chat::{self, ChannelMsgToHost};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::chatroom::ChatRoom;
use crate::error::ServerError;
use crate::handlers;
use crate::session::Session;

pub async fn route(
    room: &ChatRoom,
    session: &Session,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        chat::CHANNEL_MSG_TO_HOST => {
            let body = ChannelMsgToHost::decode(&mut r)?;
            Ok(handlers::chat::channel_msg_to_host(room, session, header, body).await)
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
