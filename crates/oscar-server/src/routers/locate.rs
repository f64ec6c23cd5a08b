//! Locate router (Section 4.4, Section 4.5: "Locate").

use oscar_wire::bodies::locate::{self, OpaquePayload, SetInfo, UserInfoQuery};
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
        locate::SET_INFO => {
            let body = SetInfo::decode(&mut r)?;
            handlers::locate::set_info(state, session, body).await;
            Ok(None)
        }
        locate::USER_INFO_QUERY => {
            let body = UserInfoQuery::decode(&mut r)?;
            match handlers::locate::user_info_query(state, header, body).await {
                Ok(reply) => Ok(Some(reply)),
                Err(ServerError::NotLoggedOn) => Ok(Some(handlers::locate::not_logged_on_error(header))),
                Err(other) => Err(other),
            }
        }
        locate::SET_DIR_INFO | locate::SET_KEYWORD_INFO => {
            let body = OpaquePayload::decode(&mut r)?;
            handlers::locate::opaque_payload(session, &body);
            Ok(None)
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
