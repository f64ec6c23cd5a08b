//! OService router (Section 4.4, Section 4.5: "OService").

use std::sync::Arc;

use oscar_wire::bodies::oservice::{self, ClientOnline, ClientVersions, IdleNotification, ServiceRequest, SetUserInfoFields};
use oscar_wire::codec::Reader;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::handlers;
use crate::session::Session;
use crate::state::AppState;

pub async fn route(
    state: &AppState,
    session: &Arc<Session>,
    header: &SnacHeader,
    body: &[u8],
) -> Result<Option<RawSnac>, ServerError> {
    let mut r = Reader::new(body);
    match header.sub_group {
        oservice::CLIENT_VERSIONS => {
            let versions = ClientVersions::decode(&mut r)?;
            Ok(Some(handlers::oservice::client_versions(header, versions)))
        }
        oservice::RATE_PARAMS_QUERY => Ok(Some(handlers::oservice::rate_params_query(header))),
        oservice::RATE_PARAMS_SUB_ADD => Ok(None),
        oservice::USER_INFO_QUERY => Ok(Some(handlers::oservice::user_info_query(header, session).await)),
        oservice::IDLE_NOTIFICATION => {
            let body = IdleNotification::decode(&mut r)?;
            handlers::oservice::idle_notification(state, session, body).await;
            Ok(None)
        }
        oservice::SET_USER_INFO_FIELDS => {
            let body = SetUserInfoFields::decode(&mut r)?;
            handlers::oservice::set_user_info_fields(state, session, body).await;
            Ok(None)
        }
        oservice::CLIENT_ONLINE => {
            let body = ClientOnline::decode(&mut r)?;
            handlers::oservice::client_online(state, session, body).await;
            Ok(None)
        }
        oservice::SERVICE_REQUEST => {
            let body = ServiceRequest::decode(&mut r)?;
            handlers::oservice::service_request(state, session, header, body).await
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
