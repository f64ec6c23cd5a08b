//! Chat room and chat-room registry (Section 3: "Chat room",
//! "Chat-room registry"; Section 4.3).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use oscar_types::ChatCookie;
use tokio::sync::Mutex;

use crate::registry::SessionRegistry;

/// One active chat room: an opaque cookie, an exchange/instance/detail
/// triple, a name, and its own scoped session registry.
pub struct ChatRoom {
    pub cookie: ChatCookie,
    pub exchange: u16,
    pub instance: u16,
    pub detail_level: u8,
    pub name: String,
    pub creator: String,
    pub created_at: u32,
    pub chat_id: u16,
    pub participants: SessionRegistry,
}

impl ChatRoom {
    fn new(
        cookie: ChatCookie,
        exchange: u16,
        instance: u16,
        detail_level: u8,
        name: String,
        creator: String,
        chat_id: u16,
    ) -> Self {
        Self {
            cookie,
            exchange,
            instance,
            detail_level,
            name,
            creator,
            created_at: now_unix(),
            chat_id,
            participants: SessionRegistry::new(),
        }
    }
}

/// Maps chat cookies to live rooms, assigning each a stable small
/// integer chat-id and destroying rooms once empty (Section 3).
#[derive(Default)]
pub struct ChatRoomRegistry {
    rooms: Mutex<HashMap<ChatCookie, Arc<ChatRoom>>>,
    next_chat_id: AtomicU16,
}

impl ChatRoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new room with a freshly minted cookie.
    pub async fn create(
        &self,
        exchange: u16,
        instance: u16,
        detail_level: u8,
        name: String,
        creator: String,
    ) -> Arc<ChatRoom> {
        let cookie = rand::random::<ChatCookie>();
        let chat_id = self.next_chat_id.fetch_add(1, Ordering::SeqCst);
        let room = Arc::new(ChatRoom::new(
            cookie,
            exchange,
            instance,
            detail_level,
            name,
            creator,
            chat_id,
        ));
        self.rooms.lock().await.insert(cookie, room.clone());
        room
    }

    pub async fn lookup(&self, cookie: &ChatCookie) -> Option<Arc<ChatRoom>> {
        self.rooms.lock().await.get(cookie).cloned()
    }

    /// Finds an existing room by exchange and display name (Section 4.5:
    /// "CreateRoom ... resolve-or-create").
    pub async fn find_by_name(&self, exchange: u16, name: &str) -> Option<Arc<ChatRoom>> {
        self.rooms
            .lock()
            .await
            .values()
            .find(|room| room.exchange == exchange && room.name == name)
            .cloned()
    }

    /// Destroys `cookie`'s room if its participant registry is empty.
    /// Call after a participant leaves.
    pub async fn remove_if_empty(&self, cookie: &ChatCookie) {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(cookie) {
            if room.participants.len().await == 0 {
                rooms.remove(cookie);
            }
        }
    }
}

fn now_unix() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32
}
