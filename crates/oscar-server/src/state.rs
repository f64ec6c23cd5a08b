//! Shared process-wide state (Section 4.8: "the shared `AppState`").

use std::sync::Arc;

use crate::chatroom::ChatRoomRegistry;
use crate::collab::{Auth, Persistence};
use crate::config::ServerConfig;
use crate::registry::SessionRegistry;

/// Everything a connection's dispatch task needs beyond its own local
/// state: the BOS session registry, the chat-room registry, the
/// collaborator interfaces, and the resolved configuration.
pub struct AppState {
    pub config: ServerConfig,
    pub sessions: SessionRegistry,
    pub chat_rooms: ChatRoomRegistry,
    pub persistence: Arc<dyn Persistence>,
    pub auth: Arc<dyn Auth>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, persistence: Arc<dyn Persistence>, auth: Arc<dyn Auth>) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: SessionRegistry::new(),
            chat_rooms: ChatRoomRegistry::new(),
            persistence,
            auth,
        })
    }
}
