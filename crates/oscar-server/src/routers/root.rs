//! Root router (Section 4.4): dispatches a decoded SNAC to its food-group
//! router and folds any leftover error into the generic error reply.

use std::sync::Arc;

use oscar_types::FoodGroup;
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacErrorCode, SnacHeader};

use crate::chatroom::ChatRoom;
use crate::error::ServerError;
use crate::routers;
use crate::session::Session;
use crate::state::AppState;

/// Routes one decoded SNAC to its food-group handler.
///
/// `room` is `Some` only on chat-room connections, where it additionally
/// unlocks the Chat food group; BOS connections always pass `None` and
/// never reach Chat or BUCP (the auth listener routes BUCP directly,
/// bypassing this function entirely).
pub async fn route(
    state: &AppState,
    session: &Arc<Session>,
    room: Option<&ChatRoom>,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let _span = tracing::info_span!(
        "dispatch",
        screen_name = session.screen_name().canonical(),
        food_group = header.food_group,
        sub_group = header.sub_group,
    )
    .entered();

    let result = match FoodGroup::from_u16(header.food_group) {
        FoodGroup::OService => routers::oservice::route(state, session, header, body).await,
        FoodGroup::Locate => routers::locate::route(state, session, header, body).await,
        FoodGroup::Buddy => routers::buddy::route(state, session, header, body).await,
        FoodGroup::Icbm => routers::icbm::route(state, session, header, body).await,
        FoodGroup::ChatNav => routers::chat_nav::route(state, session, header, body).await,
        FoodGroup::Chat => match room {
            Some(room) => routers::chat::route(room, session, header, body).await,
            None => unsupported(header),
        },
        FoodGroup::Feedbag => routers::feedbag::route(state, session, header, body).await,
        FoodGroup::Alert => routers::alert::route(session, header, body).await,
        FoodGroup::Bucp | FoodGroup::Unknown(_) => unsupported(header),
    };

    match result {
        Ok(reply) => Ok(reply),
        Err(err) if err.closes_connection() => Err(err),
        Err(err) => {
            if state.config.advanced.fail_fast {
                panic!(
                    "unsupported request {:#06x}/{:#06x}: {err}",
                    header.food_group, header.sub_group
                );
            }
            tracing::warn!(%err, "request failed, replying with generic error");
            let mut w = Writer::new();
            w.u16(SnacErrorCode::InvalidSnac.as_u16());
            Ok(Some(RawSnac {
                header: header.error_reply(),
                body: w.into_bytes(),
            }))
        }
    }
}

fn unsupported(header: &SnacHeader) -> Result<Option<RawSnac>, ServerError> {
    Err(ServerError::UnsupportedSubGroup {
        food_group: header.food_group,
        sub_group: header.sub_group,
    })
}
