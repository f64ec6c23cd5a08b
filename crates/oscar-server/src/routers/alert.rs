//! Alert router (Section 4.4, Section 4.5: "Alert").

use oscar_wire::bodies::alert::{self, OpaquePayload};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::handlers;
use crate::session::Session;

pub async fn route(
    session: &Session,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        alert::NOTIFY_CAPABILITIES | alert::NOTIFY_TOPICS => {
            let body = OpaquePayload::decode(&mut r)?;
            handlers::alert::accept(session, header.sub_group, &body);
            Ok(None)
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
