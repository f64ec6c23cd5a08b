//! Buddy handlers (Section 4.5: "Buddy") plus the cross-session fan-out
//! primitives other food groups call into (arrival/departure broadcast).

use oscar_types::FoodGroup;
use oscar_wire::bodies::buddy::{self, BuddyArrived, BuddyDeparted, BuddyNameList, RightsReply};
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::collab::BlockState;
use crate::error::ServerError;
use crate::session::Session;
use crate::state::AppState;

const MAX_BUDDIES: u16 = 500;
const MAX_WATCHERS: u16 = 500;

pub fn rights_query(header: &SnacHeader) -> RawSnac {
    let reply = RightsReply {
        max_buddies: MAX_BUDDIES,
        max_watchers: MAX_WATCHERS,
    };
    let mut w = oscar_wire::codec::Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(buddy::RIGHTS_REPLY),
        body: w.into_bytes(),
    }
}

/// `AddBuddies`: stores the names and reports which of them are currently
/// online by enqueuing a `BuddyArrived` for each to the caller.
pub async fn add_buddies(state: &AppState, session: &Session, body: BuddyNameList) -> Result<Option<RawSnac>, ServerError> {
    state
        .persistence
        .add_buddies(session.screen_name().canonical(), &body.screen_names)
        .await;

    for name in &body.screen_names {
        if let Some(online) = state.sessions.lookup_by_name(&canonical(name)).await {
            let info = crate::handlers::user_info_of(&online).await;
            let arrived = BuddyArrived { info };
            let mut w = oscar_wire::codec::Writer::new();
            arrived.encode(&mut w);
            let message = RawSnac {
                header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy::BUDDY_ARRIVED, 0),
                body: w.into_bytes(),
            };
            let _ = session.relay(message);
        }
    }
    Ok(None)
}

pub async fn del_buddies(state: &AppState, session: &Session, body: BuddyNameList) -> Result<Option<RawSnac>, ServerError> {
    state
        .persistence
        .remove_buddies(session.screen_name().canonical(), &body.screen_names)
        .await;
    Ok(None)
}

fn canonical(name: &str) -> String {
    oscar_types::ScreenName::new(name).canonical().to_string()
}

/// Notifies every user who has `session` on their buddy list (and isn't in
/// a mutual block with it) that `session` is now visible.
pub async fn broadcast_arrived(state: &AppState, session: &Session) {
    let name = session.screen_name().canonical();
    let info = crate::handlers::user_info_of(session).await;
    let arrived = BuddyArrived { info };
    let mut w = oscar_wire::codec::Writer::new();
    arrived.encode(&mut w);
    let message = RawSnac {
        header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy::BUDDY_ARRIVED, 0),
        body: w.into_bytes(),
    };

    for watcher in state.persistence.adjacent_users(name).await {
        if state.persistence.blocked(&watcher, name).await == BlockState::None {
            state.sessions.relay_to_name(&watcher, message.clone()).await;
        }
    }
}

/// Notifies every watcher that `session` is no longer visible (signed off,
/// or turned invisible).
pub async fn broadcast_departed(state: &AppState, session: &Session) {
    let name = session.screen_name().canonical();
    let departed = BuddyDeparted {
        screen_name: session.screen_name().display().to_string(),
    };
    let mut w = oscar_wire::codec::Writer::new();
    departed.encode(&mut w);
    let message = RawSnac {
        header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy::BUDDY_DEPARTED, 0),
        body: w.into_bytes(),
    };

    for watcher in state.persistence.adjacent_users(name).await {
        if state.persistence.blocked(&watcher, name).await == BlockState::None {
            state.sessions.relay_to_name(&watcher, message.clone()).await;
        }
    }
}

/// The initial arrival burst on `ClientOnline` (Section 4.6): tells the
/// newly-online session about every buddy of theirs already online, then
/// announces the arrival to that session's own watchers.
pub async fn initial_burst(state: &AppState, session: &Session) {
    for buddy_name in state.persistence.buddies(session.screen_name().canonical()).await {
        if let Some(online) = state.sessions.lookup_by_name(&canonical(&buddy_name)).await {
            if state
                .persistence
                .blocked(session.screen_name().canonical(), &canonical(&buddy_name))
                .await
                == BlockState::None
            {
                let info = crate::handlers::user_info_of(&online).await;
                let arrived = BuddyArrived { info };
                let mut w = oscar_wire::codec::Writer::new();
                arrived.encode(&mut w);
                let message = RawSnac {
                    header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy::BUDDY_ARRIVED, 0),
                    body: w.into_bytes(),
                };
                let _ = session.relay(message);
            }
        }
    }
    broadcast_arrived(state, session).await;
}
