//! An anonymous warning bumps the target's warning level, notifies the
//! target without identifying the sender, re-announces the target's
//! arrival so its watchers see the new level, and reports the totals back
//! to the sender.

mod support;

use oscar_types::FoodGroup;
use oscar_wire::bodies::buddy::{self, BuddyArrived};
use oscar_wire::bodies::icbm::{self, EvilReply, EvilRequest};
use oscar_wire::bodies::oservice::{self, EvilNotificationAnon};
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::snac::SnacHeader;

#[tokio::test]
async fn anonymous_warning_bumps_level_and_notifies_watchers() {
    let server = support::TestServer::start().await;
    server.register_user("alice", "hunter2").await;
    server.register_user("bob", "sunshine").await;
    server.register_user("carol", "letmein").await;
    // Carol watches Bob: Bob's warning-level change should reach her.
    server.set_buddies("carol", vec!["bob"]).await;

    let mut alice = support::connect_bos_online(&server, "alice", "hunter2").await;
    let mut bob = support::connect_bos_online(&server, "bob", "sunshine").await;
    let mut carol = support::connect_bos_online(&server, "carol", "letmein").await;

    // ==== Alice anonymously warns Bob ====
    let request = EvilRequest {
        target: "bob".to_string(),
        send_as_anon: true,
    };
    let mut w = Writer::new();
    request.encode(&mut w);
    alice
        .send_snac(SnacHeader::new(FoodGroup::Icbm.as_u16(), icbm::EVIL_REQUEST, 9), w.into_bytes())
        .await;

    // ==== Bob gets an anonymous notification, no sender identity ====
    let notice = bob.recv_snac().await;
    assert_eq!(notice.header.food_group, FoodGroup::OService.as_u16());
    assert_eq!(notice.header.sub_group, oservice::EVIL_NOTIFICATION_ANON);
    let anon = EvilNotificationAnon::decode(&mut Reader::new(&notice.body)).expect("decode EvilNotificationAnon");
    assert_eq!(anon.new_evil, 30, "anonymous warnings apply 30 points");

    // ==== Carol, who watches Bob, sees his updated warning level ====
    let arrived = carol.recv_snac().await;
    assert_eq!(arrived.header.food_group, FoodGroup::Buddy.as_u16());
    assert_eq!(arrived.header.sub_group, buddy::BUDDY_ARRIVED);
    let arrived = BuddyArrived::decode(&mut Reader::new(&arrived.body)).expect("decode BuddyArrived");
    assert_eq!(arrived.info.screen_name, "bob");
    assert_eq!(arrived.info.warning_level, 30);

    // ==== Alice gets the totals back, but never learns Bob's identity beyond what she sent ====
    let reply = alice.recv_snac().await;
    assert_eq!(reply.header.food_group, FoodGroup::Icbm.as_u16());
    assert_eq!(reply.header.sub_group, icbm::EVIL_REPLY);
    let reply = EvilReply::decode(&mut Reader::new(&reply.body)).expect("decode EvilReply");
    assert_eq!(reply.applied, 30);
    assert_eq!(reply.updated, 30);
}
