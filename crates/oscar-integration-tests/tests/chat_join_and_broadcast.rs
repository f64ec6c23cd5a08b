//! A full chat flow: create a room over ChatNav, both parties resolve a
//! chat-port connection via `ServiceRequest`/`ServiceResponse`, join the
//! room, and a reflected message reaches both the room and the sender.

mod support;

use oscar_types::FoodGroup;
use oscar_wire::bodies::chat::{self, ChannelMsgToClient, RosterChange};
use oscar_wire::bodies::chat_nav::{self, CreateRoom, NavInfo};
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::snac::SnacHeader;
use oscar_wire::tlv::TlvBlock;

#[tokio::test]
async fn room_join_broadcasts_and_reflects() {
    let server = support::TestServer::start().await;
    server.register_user("alice", "hunter2").await;
    server.register_user("bob", "sunshine").await;

    let mut alice_bos = support::connect_bos_online(&server, "alice", "hunter2").await;
    let mut bob_bos = support::connect_bos_online(&server, "bob", "sunshine").await;
    let bob_cookie = support::login(&server, "bob", "sunshine").await;

    // ==== Alice creates a room over ChatNav ====
    let create = CreateRoom {
        exchange: 4,
        cookie: "create".to_string(),
        instance: 0,
        detail_level: 2,
        name: "water cooler".to_string(),
    };
    let mut w = Writer::new();
    create.encode(&mut w);
    alice_bos
        .send_snac(SnacHeader::new(FoodGroup::ChatNav.as_u16(), chat_nav::CREATE_ROOM, 1), w.into_bytes())
        .await;
    let reply = alice_bos.recv_snac().await;
    assert_eq!(reply.header.sub_group, chat_nav::NAV_INFO);
    let nav_info = NavInfo::decode(&mut Reader::new(&reply.body)).expect("decode NavInfo");

    // ==== Alice and Bob each resolve their own chat cookie for the room ====
    let alice_chat_cookie = support::request_chat_cookie(&mut alice_bos, &nav_info, 2).await;
    let bob_chat_cookie = support::request_chat_cookie(&mut bob_bos, &nav_info, 1).await;
    assert_ne!(
        alice_chat_cookie, nav_info.cookie,
        "ServiceResponse must mint a fresh chat cookie, not echo the room cookie"
    );
    assert_ne!(
        alice_chat_cookie, bob_chat_cookie,
        "each session's chat cookie is minted independently"
    );

    // ==== Alice joins the chat-port connection for that room ====
    let alice_login = support::login(&server, "alice", "hunter2").await;
    let mut alice_chat = support::connect_chat(&server, &alice_login, &alice_chat_cookie).await;

    // ==== Bob joins the same room ====
    let mut bob_chat = support::connect_chat(&server, &bob_cookie, &bob_chat_cookie).await;

    // Alice is notified of Bob's arrival in the room roster.
    let roster = alice_chat.recv_snac().await;
    assert_eq!(roster.header.food_group, FoodGroup::Chat.as_u16());
    assert_eq!(roster.header.sub_group, chat::USERS_JOINED);
    let roster = RosterChange::decode(&mut Reader::new(&roster.body)).expect("decode RosterChange");
    assert_eq!(roster.users.len(), 1);
    assert_eq!(roster.users[0].screen_name, "bob");

    // ==== Alice sends a room message asking for reflection ====
    let mut tlvs = TlvBlock::new();
    tlvs.push(chat::msg_block("hi room")).push(chat::enable_reflection());
    let msg = chat::ChannelMsgToHost { channel: 1, tlvs };
    let mut w = Writer::new();
    msg.encode(&mut w);
    alice_chat
        .send_snac(SnacHeader::new(FoodGroup::Chat.as_u16(), chat::CHANNEL_MSG_TO_HOST, 5), w.into_bytes())
        .await;

    // ==== Bob receives the broadcast ====
    let received = bob_chat.recv_snac().await;
    assert_eq!(received.header.sub_group, chat::CHANNEL_MSG_TO_CLIENT);
    let client_msg = ChannelMsgToClient::decode(&mut Reader::new(&received.body)).expect("decode ChannelMsgToClient");
    assert!(client_msg.tlvs.0.contains(&chat::msg_block("hi room")));
    assert_eq!(
        client_msg.sender_info().expect("decode sender info").map(|info| info.screen_name),
        Some("alice".to_string())
    );

    // ==== Alice also gets her own message reflected back ====
    let reflected = alice_chat.recv_snac().await;
    assert_eq!(reflected.header.sub_group, chat::CHANNEL_MSG_TO_CLIENT);
    assert_eq!(reflected.header.request_id, 5, "reflection is a direct reply to the sender's request");
    let reflected = ChannelMsgToClient::decode(&mut Reader::new(&reflected.body)).expect("decode reflected message");
    assert!(reflected.tlvs.0.contains(&chat::msg_block("hi room")));
}
