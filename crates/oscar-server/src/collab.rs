//! Collaborator interfaces (Section 4.10): the narrow trait boundary to
//! out-of-scope services (SQL-backed persistence, the real password
//! store). An in-memory reference implementation backs tests and local
//! `--ephemeral` runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use oscar_types::{ChatCookie, SessionId};
use oscar_wire::bodies::feedbag::FeedbagItem;
use rand::Rng;
use tokio::sync::RwLock;

use crate::error::ServerError;

/// A stored account. Real deployments hold a salted password hash here;
/// the in-memory reference implementation stores the plaintext the test
/// suite configured it with, because it is never meant to run against
/// real user data (Section 4.10).
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub screen_name: String,
    pub password: String,
}

/// Blocking relationship between two screen names, queried before
/// relaying an IM or a warning (Section 4.5: "ICBM").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    None,
    ABlocksB,
    BBlocksA,
}

/// Persisted buddy-list storage and profile/away text (Section 4.10,
/// Section 6: "Persistence collaborator").
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn users(&self) -> Vec<UserRecord>;
    async fn get_user(&self, name: &str) -> Option<UserRecord>;
    async fn insert_user(&self, user: UserRecord);
    async fn upsert_user(&self, user: UserRecord);
    async fn buddies(&self, name: &str) -> Vec<String>;
    async fn add_buddies(&self, name: &str, buddies: &[String]);
    async fn remove_buddies(&self, name: &str, buddies: &[String]);
    /// Users who have `name` on their own buddy list (Section 4.5:
    /// "Cross-session fan-out primitives", Section 9: "back-references").
    async fn adjacent_users(&self, name: &str) -> Vec<String>;
    async fn blocked(&self, a: &str, b: &str) -> BlockState;
    async fn block(&self, blocker: &str, blocked: &str);
    async fn unblock(&self, blocker: &str, blocked: &str);
    async fn retrieve_feedbag(&self, name: &str) -> Vec<FeedbagItem>;
    async fn upsert_feedbag(&self, name: &str, items: Vec<FeedbagItem>);
    async fn delete_feedbag_items(&self, name: &str, item_ids: &[u16]);
    async fn last_modified(&self, name: &str) -> u32;
    async fn retrieve_profile(&self, name: &str) -> Option<String>;
    async fn upsert_profile(&self, name: &str, body: String);
}

/// A minted BOS login cookie bound to a screen name (Section 4.5:
/// "BUCP"; Section 6: "Auth collaborator").
#[derive(Debug, Clone)]
pub struct LoginCookie {
    pub cookie: Vec<u8>,
    pub screen_name: String,
}

/// The pre-BOS authentication handshake plus login-cookie bookkeeping
/// (Section 4.10, Section 6: "Auth collaborator").
#[async_trait]
pub trait Auth: Send + Sync {
    /// Issues a fresh per-attempt auth key for `screen_name`.
    async fn bucp_challenge(&self, screen_name: &str) -> String;
    /// Validates `password_hash` against the expected hash for
    /// `screen_name`, using the auth key most recently issued to it by
    /// [`Auth::bucp_challenge`]; returns a minted login cookie on success.
    async fn bucp_login(&self, screen_name: &str, password_hash: [u8; 16]) -> Result<LoginCookie, ServerError>;
    /// Resolves a BOS sign-on cookie to the screen name it was minted
    /// for.
    async fn retrieve_bos_session(&self, cookie: &[u8]) -> Option<String>;
    /// Mints a fresh chat cookie binding `room_cookie` to the BOS session
    /// that requested it, for `ServiceRequest` to hand back to the caller
    /// (Section 4.5: "OService").
    async fn mint_chat_session(&self, room_cookie: ChatCookie, bos_session_id: SessionId) -> ChatCookie;
    /// Resolves a chat cookie minted by [`Auth::mint_chat_session`] back to
    /// its room cookie.
    async fn retrieve_chat_session(&self, chat_cookie: &ChatCookie) -> Option<ChatCookie>;
    async fn signout(&self, screen_name: &str);
    /// Clears a chat cookie's binding once its connection tears down.
    async fn signout_chat(&self, chat_cookie: &ChatCookie);
}

/// In-memory `Persistence` used by tests and `--ephemeral` local runs
/// (Section 4.10). Not a production collaborator.
#[derive(Default)]
pub struct MemoryPersistence {
    users: RwLock<HashMap<String, UserRecord>>,
    buddies: RwLock<HashMap<String, Vec<String>>>,
    blocks: RwLock<HashMap<String, Vec<String>>>,
    feedbags: RwLock<HashMap<String, (u32, Vec<FeedbagItem>)>>,
    profiles: RwLock<HashMap<String, String>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/setup helper: declares that `name` has `buddy` on their
    /// buddy list (drives `adjacent_users` and arrival/departure
    /// fan-out).
    pub async fn set_buddies(&self, name: &str, buddies: Vec<String>) {
        self.buddies.write().await.insert(name.to_string(), buddies);
    }

    /// Test/setup helper: declares that `blocker` has blocked `blocked`.
    pub async fn set_blocked(&self, blocker: &str, blocked: &str) {
        self.blocks
            .write()
            .await
            .entry(blocker.to_string())
            .or_default()
            .push(blocked.to_string());
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn users(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }

    async fn get_user(&self, name: &str) -> Option<UserRecord> {
        self.users.read().await.get(name).cloned()
    }

    async fn insert_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.screen_name.clone(), user);
    }

    async fn upsert_user(&self, user: UserRecord) {
        self.insert_user(user).await;
    }

    async fn buddies(&self, name: &str) -> Vec<String> {
        self.buddies.read().await.get(name).cloned().unwrap_or_default()
    }

    async fn add_buddies(&self, name: &str, buddies: &[String]) {
        let mut list = self.buddies.write().await;
        let entry = list.entry(name.to_string()).or_default();
        for buddy in buddies {
            if !entry.contains(buddy) {
                entry.push(buddy.clone());
            }
        }
    }

    async fn remove_buddies(&self, name: &str, buddies: &[String]) {
        if let Some(entry) = self.buddies.write().await.get_mut(name) {
            entry.retain(|b| !buddies.contains(b));
        }
    }

    async fn adjacent_users(&self, name: &str) -> Vec<String> {
        self.buddies
            .read()
            .await
            .iter()
            .filter(|(_, list)| list.iter().any(|b| b == name))
            .map(|(owner, _)| owner.clone())
            .collect()
    }

    async fn blocked(&self, a: &str, b: &str) -> BlockState {
        let blocks = self.blocks.read().await;
        if blocks.get(a).is_some_and(|list| list.iter().any(|n| n == b)) {
            BlockState::ABlocksB
        } else if blocks.get(b).is_some_and(|list| list.iter().any(|n| n == a)) {
            BlockState::BBlocksA
        } else {
            BlockState::None
        }
    }

    async fn block(&self, blocker: &str, blocked: &str) {
        let mut blocks = self.blocks.write().await;
        let entry = blocks.entry(blocker.to_string()).or_default();
        if !entry.contains(&blocked.to_string()) {
            entry.push(blocked.to_string());
        }
    }

    async fn unblock(&self, blocker: &str, blocked: &str) {
        if let Some(entry) = self.blocks.write().await.get_mut(blocker) {
            entry.retain(|n| n != blocked);
        }
    }

    async fn retrieve_feedbag(&self, name: &str) -> Vec<FeedbagItem> {
        self.feedbags
            .read()
            .await
            .get(name)
            .map(|(_, items)| items.clone())
            .unwrap_or_default()
    }

    async fn upsert_feedbag(&self, name: &str, items: Vec<FeedbagItem>) {
        let mut feedbags = self.feedbags.write().await;
        let entry = feedbags.entry(name.to_string()).or_insert((0, Vec::new()));
        for item in items {
            if let Some(existing) = entry.1.iter_mut().find(|i| i.item_id == item.item_id) {
                *existing = item;
            } else {
                entry.1.push(item);
            }
        }
        entry.0 = now_unix();
    }

    async fn delete_feedbag_items(&self, name: &str, item_ids: &[u16]) {
        let mut feedbags = self.feedbags.write().await;
        if let Some(entry) = feedbags.get_mut(name) {
            entry.1.retain(|item| !item_ids.contains(&item.item_id));
            entry.0 = now_unix();
        }
    }

    async fn last_modified(&self, name: &str) -> u32 {
        self.feedbags.read().await.get(name).map_or(0, |(ts, _)| *ts)
    }

    async fn retrieve_profile(&self, name: &str) -> Option<String> {
        self.profiles.read().await.get(name).cloned()
    }

    async fn upsert_profile(&self, name: &str, body: String) {
        self.profiles.write().await.insert(name.to_string(), body);
    }
}

/// In-memory `Auth` used by tests and `--ephemeral` local runs
/// (Section 4.10). Not a production collaborator.
pub struct MemoryAuth {
    persistence: Arc<MemoryPersistence>,
    disable_auth: bool,
    challenges: RwLock<HashMap<String, String>>,
    cookies: RwLock<HashMap<Vec<u8>, String>>,
    /// Chat cookie -> (room cookie, BOS session id it was minted for).
    chat_sessions: RwLock<HashMap<ChatCookie, (ChatCookie, SessionId)>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new(persistence: Arc<MemoryPersistence>, disable_auth: bool) -> Self {
        Self {
            persistence,
            disable_auth,
            challenges: RwLock::new(HashMap::new()),
            cookies: RwLock::new(HashMap::new()),
            chat_sessions: RwLock::new(HashMap::new()),
        }
    }

    /// MD5 of `auth_key || md5(password) || "AOL Instant Messenger (SM)"`
    /// (Section 4.5: "BUCP").
    fn expected_hash(auth_key: &str, password: &str) -> [u8; 16] {
        use md5::{Digest, Md5};
        let inner = Md5::digest(password.as_bytes());
        let mut hasher = Md5::new();
        hasher.update(auth_key.as_bytes());
        hasher.update(inner);
        hasher.update(b"AOL Instant Messenger (SM)");
        hasher.finalize().into()
    }
}

#[async_trait]
impl Auth for MemoryAuth {
    async fn bucp_challenge(&self, screen_name: &str) -> String {
        let key = hex::encode(rand::thread_rng().gen::<[u8; 8]>());
        self.challenges
            .write()
            .await
            .insert(screen_name.to_string(), key.clone());
        key
    }

    async fn bucp_login(&self, screen_name: &str, password_hash: [u8; 16]) -> Result<LoginCookie, ServerError> {
        let auth_key = self.challenges.read().await.get(screen_name).cloned();
        let user = self.persistence.get_user(screen_name).await;
        let matches = match (&user, &auth_key) {
            (Some(user), Some(auth_key)) => Self::expected_hash(auth_key, &user.password) == password_hash,
            _ => false,
        };

        if !matches && !self.disable_auth {
            return Err(ServerError::AuthFailed);
        }

        let cookie: Vec<u8> = rand::thread_rng().gen::<[u8; 16]>().to_vec();
        self.cookies
            .write()
            .await
            .insert(cookie.clone(), screen_name.to_string());
        Ok(LoginCookie {
            cookie,
            screen_name: screen_name.to_string(),
        })
    }

    async fn retrieve_bos_session(&self, cookie: &[u8]) -> Option<String> {
        self.cookies.read().await.get(cookie).cloned()
    }

    async fn mint_chat_session(&self, room_cookie: ChatCookie, bos_session_id: SessionId) -> ChatCookie {
        let chat_cookie: ChatCookie = rand::thread_rng().gen();
        self.chat_sessions
            .write()
            .await
            .insert(chat_cookie, (room_cookie, bos_session_id));
        chat_cookie
    }

    async fn retrieve_chat_session(&self, chat_cookie: &ChatCookie) -> Option<ChatCookie> {
        self.chat_sessions.read().await.get(chat_cookie).map(|(room_cookie, _)| *room_cookie)
    }

    async fn signout(&self, screen_name: &str) {
        self.cookies.write().await.retain(|_, name| name != screen_name);
    }

    async fn signout_chat(&self, chat_cookie: &ChatCookie) {
        self.chat_sessions.write().await.remove(chat_cookie);
    }
}

fn now_unix() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32
}
