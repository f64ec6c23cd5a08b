//! BUCP handlers (Section 4.5: "BUCP") — the pre-BOS authentication
//! handshake, handled only on the dedicated auth listener.

use oscar_wire::bodies::bucp::{self, ChallengeRequest, ChallengeResponse, ErrorSubcode, LoginRequest, LoginResponse};
use oscar_wire::codec::Writer;
use oscar_wire::snac::{RawSnac, SnacHeader};

use crate::error::ServerError;
use crate::state::AppState;

/// `ChallengeRequest`: mints a fresh auth key for a known user, or (when
/// authentication is disabled) for anyone.
pub async fn challenge_request(
    state: &AppState,
    header: &SnacHeader,
    body: ChallengeRequest,
) -> RawSnac {
    let known = state.persistence.get_user(&body.screen_name).await.is_some();
    let mut w = Writer::new();

    if known || state.config.auth.disable_auth {
        let auth_key = state.auth.bucp_challenge(&body.screen_name).await;
        ChallengeResponse { auth_key }.encode(&mut w);
        RawSnac {
            header: header.reply_to(bucp::CHALLENGE_RESPONSE),
            body: w.into_bytes(),
        }
    } else {
        LoginResponse::failure(body.screen_name, ErrorSubcode::InvalidUsername).encode(&mut w);
        RawSnac {
            header: header.reply_to(bucp::LOGIN_RESPONSE),
            body: w.into_bytes(),
        }
    }
}

/// `LoginRequest`: validates the password hash and mints a BOS login
/// cookie on success.
pub async fn login_request(state: &AppState, header: &SnacHeader, body: LoginRequest) -> RawSnac {
    let mut w = Writer::new();

    match state.auth.bucp_login(&body.screen_name, body.password_hash).await {
        Ok(cookie) => {
            let bos_host = format!("{}:{}", state.config.network.oscar_host, state.config.network.bos_port);
            LoginResponse::success(body.screen_name, bos_host, cookie.cookie).encode(&mut w);
        }
        Err(ServerError::AuthFailed) => {
            LoginResponse::failure(body.screen_name, ErrorSubcode::BadPassword).encode(&mut w);
        }
        Err(_) => {
            LoginResponse::failure(body.screen_name, ErrorSubcode::InvalidUsername).encode(&mut w);
        }
    }
    RawSnac {
        header: header.reply_to(bucp::LOGIN_RESPONSE),
        body: w.into_bytes(),
    }
}
