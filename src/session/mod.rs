//! Session state shared by the HTTP adapter, the stores, and the router guard.
//!
//! The persisted session is two string keys in durable storage: the bearer
//! token and the user's role. They are written together at login and cleared
//! together at logout or on a 401. The keys themselves are private to this
//! module; every other component goes through [`SessionManager`], which also
//! carries a broadcast channel so interested parties (the navigator) can
//! react to session changes without polling storage.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const TOKEN_KEY: &str = "token";
const ROLE_KEY: &str = "userRole";

/// Capacity of the session event channel. Events are small and consumers
/// are expected to keep up; lagging receivers just miss old events.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Durable string key-value storage, the localStorage analogue.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage. Durable only for the life of the process; used in
/// tests and headless embedding.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// File-backed storage: a flat JSON object persisted on every write, so the
/// session survives process restarts.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), %err, "session file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "failed to serialize session storage");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), %err, "failed to persist session storage");
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        entries.remove(key);
        self.persist(&entries);
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login stored a fresh token and role.
    Established { role: String },
    /// The user logged out locally.
    Cleared,
    /// The server rejected the token (401); the session was torn down from
    /// inside the transport layer.
    Expired,
}

/// Single owner of the persisted session keys.
///
/// The HTTP adapter reads the token from here, the router guard reads the
/// role, and the auth store writes both. Cloning is cheap; all clones share
/// the same storage and event channel.
#[derive(Clone)]
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { storage, events }
    }

    /// Current bearer token, if a session is persisted.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Persisted role string. Kept as its own key so the router guard can
    /// check it without decoding the user object.
    pub fn role(&self) -> Option<String> {
        self.storage.get(ROLE_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a fresh session after login.
    pub fn establish(&self, token: &str, role: &str) {
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(ROLE_KEY, role);
        debug!(role, "session established");
        let _ = self.events.send(SessionEvent::Established {
            role: role.to_string(),
        });
    }

    /// Local logout: remove both keys and notify subscribers.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(ROLE_KEY);
        debug!("session cleared");
        let _ = self.events.send(SessionEvent::Cleared);
    }

    /// Teardown triggered by a 401: same storage effect as [`clear`], but a
    /// distinguishable event so the navigator can redirect to login.
    ///
    /// [`clear`]: SessionManager::clear
    pub fn expire(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(ROLE_KEY);
        warn!("session expired, tearing down");
        let _ = self.events.send(SessionEvent::Expired);
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_and_clear_round_trip() {
        let session = SessionManager::new(Arc::new(MemoryStorage::new()));
        assert!(!session.is_authenticated());

        session.establish("tok-123", "teacher");
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(session.role().as_deref(), Some("teacher"));
        assert!(session.is_authenticated());

        session.clear();
        assert!(session.token().is_none());
        assert!(session.role().is_none());
    }

    #[test]
    fn test_expire_clears_both_keys_and_notifies() {
        let session = SessionManager::new(Arc::new(MemoryStorage::new()));
        let mut events = session.subscribe();

        session.establish("tok-123", "admin");
        session.expire();

        assert!(session.token().is_none());
        assert!(session.role().is_none());
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Established {
                role: "admin".to_string()
            }
        );
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let storage = FileStorage::open(&path);
            storage.set("token", "tok-456");
            storage.set("userRole", "admin");
        }

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("tok-456"));
        assert_eq!(reopened.get("userRole").as_deref(), Some("admin"));

        reopened.remove("token");
        let again = FileStorage::open(&path);
        assert!(again.get("token").is_none());
        assert_eq!(again.get("userRole").as_deref(), Some("admin"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get("token").is_none());
    }
}
