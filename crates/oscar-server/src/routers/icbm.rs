//! ICBM router (Section 4.4, Section 4.5: "ICBM").

use oscar_wire::bodies::icbm::{self, ChannelMsgToHost, ClientEvent, EvilRequest};
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
        icbm::PARAMETER_QUERY => Ok(Some(handlers::icbm::parameter_query(header))),
        icbm::CHANNEL_MSG_TO_HOST => {
            let body = ChannelMsgToHost::decode(&mut r)?;
            handlers::icbm::channel_msg_to_host(state, session, header, body).await
        }
        icbm::EVIL_REQUEST => {
            let body = EvilRequest::decode(&mut r)?;
            handlers::icbm::evil_request(state, session, header, body).await
        }
        icbm::CLIENT_EVENT => {
            let body = ClientEvent::decode(&mut r)?;
            handlers::icbm::client_event(state, session, body).await;
            Ok(None)
        }
        icbm::CLIENT_ERR => {
            tracing::debug!(screen_name = session.screen_name().canonical(), "client reported ICBM error");
            Ok(None)
        }
        other => Err(ServerError::UnsupportedSubGroup {
            food_group: header.food_group,
            sub_group: other,
        }),
    }
}
