//! Feedbag handlers (Section 4.5: "Feedbag") — server-side buddy-list
//! storage, mostly thin passes to the persistence collaborator.

use oscar_types::FoodGroup;
use oscar_wire::bodies::buddy::{self as buddy_bodies, BuddyArrived, BuddyDeparted};
use oscar_wire::bodies::feedbag::{self, FeedbagReply, ItemBatch, QueryIfModified, Status};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::session::Session;
use crate::state::AppState;

use super::user_info_of;

/// Feedbag item class reserved for deny-list entries (blocks).
const CLASS_DENY: u16 = 3;

pub fn rights_query(header: &SnacHeader) -> RawSnac {
    RawSnac {
        header: header.reply_to(feedbag::RIGHTS_REPLY),
        body: Vec::new(),
    }
}

pub async fn query(state: &AppState, session: &Session, header: &SnacHeader) -> RawSnac {
    let reply = FeedbagReply {
        last_update: state.persistence.last_modified(session.screen_name().canonical()).await,
        items: state.persistence.retrieve_feedbag(session.screen_name().canonical()).await,
    };
    let mut w = Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(feedbag::REPLY),
        body: w.into_bytes(),
    }
}

/// Replies with a fresh [`FeedbagReply`] only if storage changed since the
/// client's cached `last_update`; otherwise with an empty not-modified
/// reply on the same subgroup.
pub async fn query_if_modified(
    state: &AppState,
    session: &Session,
    header: &SnacHeader,
    body: QueryIfModified,
) -> RawSnac {
    let last_update = state.persistence.last_modified(session.screen_name().canonical()).await;
    let items = if last_update > body.last_update {
        state.persistence.retrieve_feedbag(session.screen_name().canonical()).await
    } else {
        Vec::new()
    };
    let reply = FeedbagReply { last_update, items };
    let mut w = Writer::new();
    reply.encode(&mut w);
    RawSnac {
        header: header.reply_to(feedbag::REPLY),
        body: w.into_bytes(),
    }
}

/// Applies an insert/update/delete batch and reports per-item status.
/// Deny-class edits additionally flip block state and tell the affected
/// target, and only that target, whether `session` is now visible to it
/// (Section 4.5).
pub async fn apply_batch(state: &AppState, session: &Session, header: &SnacHeader, body: ItemBatch, delete: bool) -> RawSnac {
    let name = session.screen_name().canonical();
    let mut codes = Vec::with_capacity(body.items.len());

    for item in &body.items {
        if item.class_id == CLASS_DENY {
            if delete {
                state.persistence.unblock(name, &item.name).await;
            } else {
                state.persistence.block(name, &item.name).await;
            }
            if let Some(target) = state.sessions.lookup_by_name(&oscar_types::ScreenName::new(&item.name).canonical().to_string()).await {
                let message = if delete {
                    let arrived = BuddyArrived {
                        info: user_info_of(session).await,
                    };
                    let mut w = Writer::new();
                    arrived.encode(&mut w);
                    RawSnac {
                        header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy_bodies::BUDDY_ARRIVED, 0),
                        body: w.into_bytes(),
                    }
                } else {
                    let departed = BuddyDeparted {
                        screen_name: session.screen_name().display().to_string(),
                    };
                    let mut w = Writer::new();
                    departed.encode(&mut w);
                    RawSnac {
                        header: SnacHeader::new(FoodGroup::Buddy.as_u16(), buddy_bodies::BUDDY_DEPARTED, 0),
                        body: w.into_bytes(),
                    }
                };
                let _ = target.relay(message);
            }
        }
        codes.push(0);
    }

    if delete {
        state
            .persistence
            .delete_feedbag_items(name, &body.items.iter().map(|i| i.item_id).collect::<Vec<_>>())
            .await;
    } else {
        state.persistence.upsert_feedbag(name, body.items).await;
    }

    let status = Status { codes };
    let mut w = Writer::new();
    status.encode(&mut w);
    RawSnac {
        header: header.reply_to(feedbag::STATUS),
        body: w.into_bytes(),
    }
}
