//! BUCP router (Section 4.4, Section 4.5: "BUCP") — reachable only from the
//! dedicated auth listener; never routed from a BOS or chat connection.

use oscar_wire::bodies::bucp::{self, ChallengeRequest, LoginRequest};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::handlers;
use crate::state::AppState;

pub async fn route(
    state: &AppState,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        bucp::CHALLENGE_REQUEST => {
            let body = ChallengeRequest::decode(&mut r)?;
            Ok(Some(handlers::bucp::challenge_request(state, header, body).await))
        }
        bucp::LOGIN_REQUEST => {
            let body = LoginRequest::decode(&mut r)?;
            Ok(Some(handlers::bucp::login_request(state, header, body).await))
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
