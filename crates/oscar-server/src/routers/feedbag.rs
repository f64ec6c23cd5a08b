//! Feedbag router (Section 4.4, Section 4.5: "Feedbag").

use oscar_wire::bodies::feedbag::{self, ItemBatch, QueryIfModified};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::handlers;
use crate::session::Session;
use crate::state::AppState;

pub async fn route(
    state: &AppState,
    session: &Session,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        feedbag::RIGHTS_QUERY => Ok(Some(handlers::feedbag::rights_query(header))),
        feedbag::QUERY => Ok(Some(handlers::feedbag::query(state, session, header).await)),
        feedbag::QUERY_IF_MODIFIED => {
            let body = QueryIfModified::decode(&mut r)?;
            Ok(Some(handlers::feedbag::query_if_modified(state, session, header, body).await))
        }
        feedbag::INSERT_ITEM | feedbag::UPDATE_ITEM => {
            let body = ItemBatch::decode(&mut r)?;
            Ok(Some(handlers::feedbag::apply_batch(state, session, header, body, false).await))
        }
        feedbag::DELETE_ITEM => {
            let body = ItemBatch::decode(&mut r)?;
            Ok(Some(handlers::feedbag::apply_batch(state, session, header, body, true).await))
        }
        feedbag::START_CLUSTER | feedbag::END_CLUSTER => Ok(None),
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
