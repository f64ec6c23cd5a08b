//! End-to-end instant-message round trip: a channel-1 `ChannelMsgToHost`
//! with a host-ack request arrives at its target as a `ChannelMsgToClient`
//! carrying the sender's user info, and the sender gets its `HostAck`.

mod support;

use oscar_types::FoodGroup;
use oscar_wire::bodies::icbm::{self, ChannelMsgToClient, HostAck};
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::snac::SnacHeader;

#[tokio::test]
async fn instant_message_round_trips_with_host_ack() {
    let server = support::TestServer::start().await;
    server.register_user("alice", "hunter2").await;
    server.register_user("bob", "sunshine").await;

    let mut alice = support::connect_bos_online(&server, "alice", "hunter2").await;
    let mut bob = support::connect_bos_online(&server, "bob", "sunshine").await;

    // ==== Alice sends an IM to Bob, requesting a host ack ====
    let cookie: u64 = 0x1234;
    let mut tlvs = oscar_wire::tlv::TlvBlock::new();
    tlvs.push(icbm::msg_block("hi")).push(icbm::request_host_ack());
    let msg = icbm::ChannelMsgToHost {
        cookie,
        channel: 1,
        target: "bob".to_string(),
        tlvs,
    };
    let mut w = Writer::new();
    msg.encode(&mut w);
    alice
        .send_snac(SnacHeader::new(FoodGroup::Icbm.as_u16(), icbm::CHANNEL_MSG_TO_HOST, 7), w.into_bytes())
        .await;

    // ==== Bob receives the relayed message ====
    let received = bob.recv_snac().await;
    assert_eq!(received.header.food_group, FoodGroup::Icbm.as_u16());
    assert_eq!(received.header.sub_group, icbm::CHANNEL_MSG_TO_CLIENT);
    let client_msg = ChannelMsgToClient::decode(&mut Reader::new(&received.body)).expect("decode ChannelMsgToClient");
    assert_eq!(client_msg.cookie, cookie, "relayed cookie should match the sender's");
    assert_eq!(client_msg.channel, 1);
    assert_eq!(client_msg.sender.screen_name, "alice");
    assert!(
        client_msg.tlvs.0.contains(&icbm::msg_block("hi")),
        "relayed message should carry the original text"
    );

    // ==== Alice receives her host ack ====
    let ack_reply = alice.recv_snac().await;
    assert_eq!(ack_reply.header.food_group, FoodGroup::Icbm.as_u16());
    assert_eq!(ack_reply.header.sub_group, icbm::HOST_ACK);
    assert_eq!(ack_reply.header.request_id, 7, "reply should echo the request id");
    let ack = HostAck::decode(&mut Reader::new(&ack_reply.body)).expect("decode HostAck");
    assert_eq!(ack.cookie, cookie);
    assert_eq!(ack.channel, 1);
    assert_eq!(ack.target, "bob");
}
