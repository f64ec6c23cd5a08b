//! Toggling the invisible status bit looks exactly like signing off and
//! back on to the user's watchers.

mod support;

use oscar_types::FoodGroup;
use oscar_wire::bodies::buddy::{self, BuddyArrived, BuddyDeparted};
use oscar_wire::bodies::oservice::{self, SetUserInfoFields};
use oscar_wire::bodies::user_info;
use oscar_wire::codec::{Reader, Writer};
use oscar_wire::snac::SnacHeader;
use oscar_wire::tlv::TlvBlock;

#[tokio::test]
async fn going_invisible_and_back_mirrors_departure_and_arrival() {
    let server = support::TestServer::start().await;
    server.register_user("alice", "hunter2").await;
    server.register_user("bob", "sunshine").await;
    server.set_buddies("bob", vec!["alice"]).await;

    let mut alice = support::connect_bos_online(&server, "alice", "hunter2").await;
    let mut bob = support::connect_bos_online(&server, "bob", "sunshine").await;

    // ==== Alice goes invisible ====
    let mut tlvs = TlvBlock::new();
    tlvs.push(oscar_wire::tlv::Tlv::u16(user_info::TAG_USER_STATUS, user_info::STATUS_INVISIBLE));
    let body = SetUserInfoFields { tlvs };
    let mut w = Writer::new();
    body.encode(&mut w);
    alice
        .send_snac(
            SnacHeader::new(FoodGroup::OService.as_u16(), oservice::SET_USER_INFO_FIELDS, 1),
            w.into_bytes(),
        )
        .await;

    // ==== Bob sees Alice depart ====
    let departed = bob.recv_snac().await;
    assert_eq!(departed.header.sub_group, buddy::BUDDY_DEPARTED);
    let departed = BuddyDeparted::decode(&mut Reader::new(&departed.body)).expect("decode BuddyDeparted");
    assert_eq!(departed.screen_name, "alice");

    // ==== Alice becomes visible again ====
    let mut tlvs = TlvBlock::new();
    tlvs.push(oscar_wire::tlv::Tlv::u16(user_info::TAG_USER_STATUS, 0));
    let body = SetUserInfoFields { tlvs };
    let mut w = Writer::new();
    body.encode(&mut w);
    alice
        .send_snac(
            SnacHeader::new(FoodGroup::OService.as_u16(), oservice::SET_USER_INFO_FIELDS, 2),
            w.into_bytes(),
        )
        .await;

    // ==== Bob sees Alice arrive again ====
    let arrived = bob.recv_snac().await;
    assert_eq!(arrived.header.sub_group, buddy::BUDDY_ARRIVED);
    let arrived = BuddyArrived::decode(&mut Reader::new(&arrived.body)).expect("decode BuddyArrived");
    assert_eq!(arrived.info.screen_name, "alice");
    assert!(!arrived.info.invisible, "alice should be reported visible again");
}
