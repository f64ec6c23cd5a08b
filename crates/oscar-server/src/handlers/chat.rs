//! Chat handlers (Section 4.5: "Chat"), exchanged on a chat-room
//! connection after the caller joined via ChatNav.

use oscar_types::FoodGroup;
use oscar_wire::bodies::chat::{self, ChannelMsgToClient, ChannelMsgToHost};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::chatroom::ChatRoom;
use crate::session::Session;

use super::user_info_of;

/// Broadcasts a room message to every other participant; if reflection was
/// requested, also returns it to the sender.
pub async fn channel_msg_to_host(
    room: &ChatRoom,
    session: &Session,
    header: &SnacHeader,
    body: ChannelMsgToHost,
) -> Option<RawSnac> {
    let wants_reflection = body.wants_reflection();
    let client_msg = ChannelMsgToClient::from_host_message(&body, &user_info_of(session).await);
    let mut w = Writer::new();
    client_msg.encode(&mut w);
    let broadcast = RawSnac {
        header: SnacHeader::new(FoodGroup::Chat.as_u16(), chat::CHANNEL_MSG_TO_CLIENT, 0),
        body: w.into_bytes(),
    };

    room.participants.broadcast_except(session, broadcast.clone()).await;

    wants_reflection.then(|| RawSnac {
        header: header.reply_to(chat::CHANNEL_MSG_TO_CLIENT),
        body: broadcast.body,
    })
}
