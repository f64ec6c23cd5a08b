//! Session registry (Section 4.3): process-wide mapping of canonical
//! screen name to live [`Session`].

use std::collections::HashMap;
use std::sync::Arc;

use oscar_wire::snac::RawSnac;
use tokio::sync::Mutex;
use tracing::warn;

use crate::session::Session;

/// A registry of live sessions keyed by canonical screen name. One
/// instance backs the whole BOS population; one more instance is owned
/// by each chat room, scoped to that room's participants (Section 4.3).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `session`, closing and evicting any existing session for
    /// the same canonical name first (Section 3: "a new login ... evicts
    /// the old Session by closing it").
    pub async fn add(&self, session: Arc<Session>) {
        let key = session.screen_name().canonical().to_string();
        let mut sessions = self.sessions.lock().await;
        if let Some(old) = sessions.insert(key, session) {
            old.close();
        }
    }

    /// Removes `session` by identity (not by name); safe if already
    /// absent or if a newer session has since replaced it under the
    /// same name.
    pub async fn remove(&self, session: &Session) {
        let key = session.screen_name().canonical().to_string();
        let mut sessions = self.sessions.lock().await;
        if let Some(current) = sessions.get(&key) {
            if current.id() == session.id() {
                sessions.remove(&key);
            }
        }
    }

    pub async fn lookup_by_name(&self, canonical_name: &str) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(canonical_name).cloned()
    }

    #[must_use = "the returned list snapshots live sessions"]
    pub async fn online_names(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Looks up `canonical_name` and enqueues `message`; silently returns
    /// if the recipient is offline (Section 4.3).
    pub async fn relay_to_name(&self, canonical_name: &str, message: RawSnac) {
        if let Some(session) = self.lookup_by_name(canonical_name).await {
            if let Err(err) = session.relay(message) {
                warn!(screen_name = canonical_name, %err, "dropping notification");
            }
        }
    }

    /// Best-effort enqueue of `message` to every name in `names`.
    pub async fn broadcast_to_names(&self, names: &[String], message: RawSnac) {
        let sessions = self.sessions.lock().await;
        for name in names {
            if let Some(session) = sessions.get(name) {
                if let Err(err) = session.relay(message.clone()) {
                    warn!(screen_name = name, %err, "dropping notification");
                }
            }
        }
    }

    /// Enqueues `message` to every live session except `exclude`.
    pub async fn broadcast_except(&self, exclude: &Session, message: RawSnac) {
        let sessions = self.sessions.lock().await;
        for session in sessions.values() {
            if session.id() == exclude.id() {
                continue;
            }
            if let Err(err) = session.relay(message.clone()) {
                warn!(screen_name = session.screen_name().canonical(), %err, "dropping notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscar_types::ScreenName;
    use oscar_wire::snac::SnacHeader;

    fn sample_message() -> RawSnac {
        RawSnac {
            header: SnacHeader::new(0x0004, 0x0006, 0),
            body: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn new_login_evicts_old_session_with_same_name() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = Session::new([1u8; 8], ScreenName::new("Bob"));
        let (second, _rx2) = Session::new([2u8; 8], ScreenName::new("bob"));

        registry.add(first.clone()).await;
        assert!(!first.is_closed());
        registry.add(second.clone()).await;
        assert!(first.is_closed());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn relay_to_offline_name_is_silent() {
        let registry = SessionRegistry::new();
        registry.relay_to_name("nobody", sample_message()).await;
    }

    #[tokio::test]
    async fn broadcast_except_skips_sender() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = Session::new([1u8; 8], ScreenName::new("A"));
        let (b, mut rx_b) = Session::new([2u8; 8], ScreenName::new("B"));
        registry.add(a.clone()).await;
        registry.add(b).await;

        registry.broadcast_except(&a, sample_message()).await;
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn remove_is_safe_when_superseded() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = Session::new([1u8; 8], ScreenName::new("Bob"));
        let (second, _rx2) = Session::new([2u8; 8], ScreenName::new("Bob"));
        registry.add(first.clone()).await;
        registry.add(second.clone()).await;
        registry.remove(&first).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.lookup_by_name("bob").await.is_some());
    }
}
