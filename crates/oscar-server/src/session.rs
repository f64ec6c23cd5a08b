//! Per-connected-user session state (Section 4.2).

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use oscar_types::{ScreenName, SessionId};
use oscar_wire::snac::RawSnac;
use tokio::sync::{mpsc, Notify, RwLock};

use crate::error::ServerError;

/// Capacity of a session's pending-notification FIFO (Section 3
/// invariant: "never grows without bound").
const NOTIFICATION_QUEUE_CAPACITY: usize = 256;

/// Mutable fields a handler running on a *different* connection's task
/// may need to read (e.g. a buddy's current TLV user info during a
/// broadcast). Grouped behind one lock per Section 5's "per-session
/// read-write mutex" guidance.
#[derive(Debug, Clone, Default)]
pub struct SessionFields {
    pub away_message: Option<String>,
    pub profile: Option<String>,
    pub capabilities: Vec<[u8; 16]>,
    pub idle_since: Option<u32>,
    pub invisible: bool,
}

/// A connected user's state, owned by exactly one connection's dispatch
/// task but readable (and partially writable) from any task via the
/// registry.
pub struct Session {
    id: SessionId,
    screen_name: ScreenName,
    signon_time: u32,
    warning_level: AtomicU16,
    fields: RwLock<SessionFields>,
    outbound_tx: mpsc::Sender<RawSnac>,
    closed: AtomicBool,
    closed_notify: Notify,
}

impl Session {
    /// Creates a new session and the receiver its owning dispatcher task
    /// will drain. Only one receiver ever exists for a given session.
    #[must_use]
    pub fn new(id: SessionId, screen_name: ScreenName) -> (Arc<Self>, mpsc::Receiver<RawSnac>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(NOTIFICATION_QUEUE_CAPACITY);
        let session = Arc::new(Self {
            id,
            screen_name,
            signon_time: now_unix(),
            warning_level: AtomicU16::new(0),
            fields: RwLock::new(SessionFields::default()),
            outbound_tx,
            closed: AtomicBool::new(false),
            closed_notify: Notify::new(),
        });
        (session, outbound_rx)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn screen_name(&self) -> &ScreenName {
        &self.screen_name
    }

    #[must_use]
    pub fn signon_time(&self) -> u32 {
        self.signon_time
    }

    #[must_use]
    pub fn warning_level(&self) -> u16 {
        self.warning_level.load(Ordering::SeqCst)
    }

    /// Adds `delta` to the warning level, saturating at `u16::MAX`.
    pub fn add_warning(&self, delta: u16) -> u16 {
        let mut updated = 0;
        self.warning_level
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                updated = cur.saturating_add(delta);
                Some(updated)
            })
            .ok();
        updated
    }

    pub async fn fields(&self) -> SessionFields {
        self.fields.read().await.clone()
    }

    pub async fn set_away_message(&self, message: Option<String>) {
        self.fields.write().await.away_message = message;
    }

    pub async fn set_profile(&self, profile: Option<String>) {
        self.fields.write().await.profile = profile;
    }

    pub async fn set_capabilities(&self, capabilities: Vec<[u8; 16]>) {
        self.fields.write().await.capabilities = capabilities;
    }

    /// Sets idle-since (`IdleTime == 0` clears it). Returns whether this
    /// call changed the idle state (for arrival-broadcast triggers).
    pub async fn set_idle_seconds(&self, idle_seconds: u32) -> bool {
        let mut fields = self.fields.write().await;
        let was_idle = fields.idle_since.is_some();
        fields.idle_since = if idle_seconds == 0 {
            None
        } else {
            Some(now_unix().saturating_sub(idle_seconds))
        };
        was_idle != fields.idle_since.is_some()
    }

    /// Sets invisibility. Returns whether this call changed the state.
    pub async fn set_invisible(&self, invisible: bool) -> bool {
        let mut fields = self.fields.write().await;
        let changed = fields.invisible != invisible;
        fields.invisible = invisible;
        changed
    }

    /// Non-blocking enqueue of an outbound SNAC notification.
    pub fn relay(&self, message: RawSnac) -> Result<(), ServerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ServerError::SessClosed);
        }
        match self.outbound_tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(ServerError::SessQueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ServerError::SessClosed),
        }
    }

    /// Idempotent close: marks the session closed and wakes every
    /// `wait_closed` waiter. The outbound channel is left open so any
    /// already-enqueued messages can still drain through the receiver.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closed_notify.notify_waiters();
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves once the session is closed. Safe to call from multiple
    /// tasks and after the session is already closed (checks the flag
    /// first to avoid missing a notification that fired earlier).
    pub async fn wait_closed(&self) {
        if self.is_closed() {
            return;
        }
        self.closed_notify.notified().await;
    }
}

fn now_unix() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> (Arc<Session>, mpsc::Receiver<RawSnac>) {
        Session::new([1u8; 8], ScreenName::new("BobSmith"))
    }

    #[tokio::test]
    async fn warning_level_saturates() {
        let (session, _rx) = sample_session();
        session.add_warning(u16::MAX - 5);
        assert_eq!(session.add_warning(100), u16::MAX);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_wakes_all_waiters() {
        let (session, _rx) = sample_session();
        let a = session.clone();
        let b = session.clone();
        let wait_a = tokio::spawn(async move { a.wait_closed().await });
        let wait_b = tokio::spawn(async move { b.wait_closed().await });
        tokio::task::yield_now().await;
        session.close();
        session.close();
        wait_a.await.unwrap();
        wait_b.await.unwrap();
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn relay_fails_after_close() {
        let (session, _rx) = sample_session();
        session.close();
        let header = oscar_wire::snac::SnacHeader::new(0x0004, 0x0005, 0);
        let err = session.relay(RawSnac { header, body: vec![] }).unwrap_err();
        assert!(matches!(err, ServerError::SessClosed));
    }

    #[tokio::test]
    async fn idle_and_invisibility_transitions_report_change() {
        let (session, _rx) = sample_session();
        assert!(session.set_idle_seconds(60).await);
        assert!(!session.set_idle_seconds(120).await);
        assert!(session.set_idle_seconds(0).await);

        assert!(session.set_invisible(true).await);
        assert!(!session.set_invisible(true).await);
        assert!(session.set_invisible(false).await);
    }
}
