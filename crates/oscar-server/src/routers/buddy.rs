//! Buddy router (Section 4.4, Section 4.5: "Buddy").

use oscar_wire::bodies::buddy::{self, BuddyNameList};
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
        buddy::RIGHTS_QUERY => Ok(Some(handlers::buddy::rights_query(header))),
        buddy::ADD_BUDDIES => {
            let body = BuddyNameList::decode(&mut r)?;
            handlers::buddy::add_buddies(state, session, body).await
        }
        buddy::DEL_BUDDIES => {
            let body = BuddyNameList::decode(&mut r)?;
            handlers::buddy::del_buddies(state, session, body).await
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
