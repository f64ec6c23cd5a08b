//! A block is presented to the blocked party as if its target had simply
//! signed off: the sender gets `NotLoggedOn`, and the blocker never sees
//! the message at all.

mod support;

use oscar_types::FoodGroup;
use oscar_wire::bodies::icbm::{self};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{SnacErrorCode, SnacHeader};

#[tokio::test]
async fn blocked_target_looks_offline_to_the_sender() {
    let server = support::TestServer::start().await;
    server.register_user("alice", "hunter2").await;
    server.register_user("bob", "sunshine").await;
    server.set_blocked("bob", "alice").await;

    let mut alice = support::connect_bos_online(&server, "alice", "hunter2").await;
    let mut bob = support::connect_bos_online(&server, "bob", "sunshine").await;

    // ==== Alice tries to IM Bob, who has blocked her ====
    let mut tlvs = oscar_wire::tlv::TlvBlock::new();
    tlvs.push(icbm::msg_block("are you there?"));
    let msg = icbm::ChannelMsgToHost {
        cookie: 1,
        channel: 1,
        target: "bob".to_string(),
        tlvs,
    };
    let mut w = Writer::new();
    msg.encode(&mut w);
    alice
        .send_snac(SnacHeader::new(FoodGroup::Icbm.as_u16(), icbm::CHANNEL_MSG_TO_HOST, 3), w.into_bytes())
        .await;

    // ==== Alice sees the same error she'd get for an offline target ====
    let error = alice.recv_snac().await;
    assert_eq!(error.header.food_group, FoodGroup::Icbm.as_u16());
    assert_eq!(error.header.sub_group, oscar_wire::snac::ERROR_SUBGROUP);
    let code = u16::from_be_bytes([error.body[0], error.body[1]]);
    assert_eq!(code, SnacErrorCode::NotLoggedOn.as_u16(), "a block should look like the target is offline");

    // ==== Bob never receives anything ====
    bob.expect_silence(support::SILENCE_WINDOW).await;
}
