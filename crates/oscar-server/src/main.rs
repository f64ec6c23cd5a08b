//! oscar-server: the OSCAR/AIM protocol engine binary (Section 4.8).

use std::sync::Arc;

use oscar_server::collab::{MemoryAuth, MemoryPersistence};
use oscar_server::{AppState, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("oscar=info".parse()?))
        .init();

    info!("oscar-server starting");

    let config = ServerConfig::load()?;
    let persistence = Arc::new(MemoryPersistence::new());
    let auth = Arc::new(MemoryAuth::new(persistence.clone(), config.auth.disable_auth));
    let state = AppState::new(config, persistence, auth);

    let auth_listener = tokio::spawn(oscar_server::listener::run_auth_listener(state.clone()));
    let bos_listener = tokio::spawn(oscar_server::listener::run_bos_listener(state.clone()));
    let chat_listener = tokio::spawn(oscar_server::listener::run_chat_listener(state.clone()));

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        result = auth_listener => log_listener_exit("auth", result),
        result = bos_listener => log_listener_exit("BOS", result),
        result = chat_listener => log_listener_exit("chat", result),
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            return Ok(());
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down");
            return Ok(());
        }
    }

    anyhow::bail!("a listener exited unexpectedly")
}

fn log_listener_exit(name: &str, result: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => error!(listener = name, "listener task returned without error"),
        Ok(Err(err)) => error!(listener = name, %err, "listener task failed"),
        Err(err) => error!(listener = name, %err, "listener task panicked"),
    }
}
