//! Listener services (Section 4.7): three independent TCP accept loops
//! sharing the dispatcher skeleton, one per connection kind. Each spawns
//! one task per connection, logging accept/close at `info` and
//! per-connection protocol errors at `warn` without bringing the listener
//! down — the same shape as the teacher daemon's own accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::dispatcher;
use crate::state::AppState;

/// Binds and runs the BUCP auth listener until the socket errors out.
pub async fn run_auth_listener(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = (state.config.network.oscar_host.clone(), state.config.network.auth_port);
    let listener = TcpListener::bind(addr).await?;
    info!(port = state.config.network.auth_port, "auth listener bound");
    accept_loop(listener, state, dispatcher::run_auth_connection).await
}

/// Binds and runs the BOS listener until the socket errors out.
pub async fn run_bos_listener(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = (state.config.network.oscar_host.clone(), state.config.network.bos_port);
    let listener = TcpListener::bind(addr).await?;
    info!(port = state.config.network.bos_port, "BOS listener bound");
    accept_loop(listener, state, dispatcher::run_bos_connection).await
}

/// Binds and runs the chat listener until the socket errors out.
pub async fn run_chat_listener(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = (state.config.network.oscar_host.clone(), state.config.network.chat_port);
    let listener = TcpListener::bind(addr).await?;
    info!(port = state.config.network.chat_port, "chat listener bound");
    accept_loop(listener, state, dispatcher::run_chat_connection).await
}

/// Shared accept loop: every connection kind differs only in which
/// dispatcher function handles the accepted socket (Section 4.7).
async fn accept_loop<F, Fut>(listener: TcpListener, state: Arc<AppState>, handle: F) -> anyhow::Result<()>
where
    F: Fn(Arc<AppState>, tokio::net::TcpStream, std::net::SocketAddr) -> Fut + Copy + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!(%peer, "accepted connection");
                let state = state.clone();
                tokio::spawn(async move {
                    handle(state, stream, peer).await;
                });
            }
            Err(err) => {
                error!(%err, "accept error");
            }
        }
    }
}
