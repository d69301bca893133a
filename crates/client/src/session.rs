//! Session persistence.
//!
//! The transport reads the bearer token fresh from the session store on
//! every request, so a login or logout takes effect immediately without
//! rebuilding clients.

use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use facture_core::User;

/// An authenticated session as persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token attached to API requests.
    pub token: String,
    /// Refresh token, held for the (out-of-scope) refresh flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// The logged-in user record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Key-value session storage surviving restarts.
///
/// Implementations must be `Send + Sync`; reads and writes are synchronous
/// and infallible from the caller's perspective (failures are logged, not
/// raised), matching the fire-and-forget contract of browser local storage.
pub trait SessionStore: Send + Sync {
    /// Current bearer token, if a session exists.
    fn token(&self) -> Option<String>;

    /// The persisted user record, if a session exists.
    fn user(&self) -> Option<User>;

    /// Persist a session, replacing any previous one.
    fn store_session(&self, session: &Session);

    /// Drop the session entirely.
    fn clear(&self);
}

/// In-memory session store for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    fn user(&self) -> Option<User> {
        self.session.read().as_ref().and_then(|s| s.user.clone())
    }

    fn store_session(&self, session: &Session) {
        *self.session.write() = Some(session.clone());
    }

    fn clear(&self) {
        *self.session.write() = None;
    }
}

/// JSON-file-backed session store.
///
/// The file is read once at construction and rewritten on every change;
/// reads are served from the in-memory copy.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    session: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Open a store backed by `path`, loading any existing session.
    ///
    /// A missing or unreadable file starts the store empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "session file corrupt, starting empty");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            path,
            session: RwLock::new(session),
        }
    }

    fn persist(&self, session: Option<&Session>) {
        let result = match session {
            Some(session) => serde_json::to_string_pretty(session)
                .map_err(|e| e.to_string())
                .and_then(|raw| std::fs::write(&self.path, raw).map_err(|e| e.to_string())),
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.to_string()),
            },
        };
        match result {
            Ok(()) => debug!(path = %self.path.display(), "session persisted"),
            Err(e) => error!(path = %self.path.display(), error = %e, "failed to persist session"),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    fn user(&self) -> Option<User> {
        self.session.read().as_ref().and_then(|s| s.user.clone())
    }

    fn store_session(&self, session: &Session) {
        *self.session.write() = Some(session.clone());
        self.persist(Some(session));
    }

    fn clear(&self) {
        *self.session.write() = None;
        self.persist(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            refresh_token: Some("refresh".to_string()),
            user: None,
        }
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.token().is_none());

        store.store_session(&session("tok-1"));
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        store.clear();
        assert!(store.token().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::open(&path);
        store.store_session(&session("tok-persisted"));
        drop(store);

        let reopened = FileSessionStore::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("tok-persisted"));

        reopened.clear();
        drop(reopened);
        let empty = FileSessionStore::open(&path);
        assert!(empty.token().is_none());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::open(&path);
        assert!(store.token().is_none());
    }
}
