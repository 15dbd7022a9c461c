use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::User;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// The authenticated identity: bearer token plus the user record the API
/// returned at login. The two travel as one value, so there is no state
/// in which a token exists without a user or vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
}

/// Single source of truth for the current session.
///
/// The store owns both the in-memory session and its on-disk copy; every
/// other component reads through it and none mutates either directly.
/// Mutations hit disk before they are visible in memory, so a session the
/// rest of the app can observe is always one that survives a restart.
///
/// Shared as `Arc<SessionStore>` with the API client, which reads the
/// token at call time rather than capturing it.
pub struct SessionStore {
    data_dir: PathBuf,
    current: RwLock<Option<SessionData>>,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            current: RwLock::new(None),
        }
    }

    /// Rehydrate the session from disk. Called once at startup.
    ///
    /// Adopts the persisted session only if it parses into a well-formed
    /// token/user pair; a missing file, unreadable bytes, invalid JSON, or
    /// a record failing validation all yield "no session". Never errors:
    /// a corrupt session file must look exactly like being logged out.
    pub fn initialize(&self) -> Option<SessionData> {
        let session = self.read_from_disk();
        *self.write_lock() = session.clone();
        session
    }

    fn read_from_disk(&self) -> Option<SessionData> {
        let path = self.session_path();
        if !path.exists() {
            debug!("No persisted session found");
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to read session file, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str::<SessionData>(&contents) {
            Ok(data) if Self::is_well_formed(&data) => {
                debug!(user = %data.user.email, "Session rehydrated");
                Some(data)
            }
            Ok(_) => {
                warn!("Persisted session failed validation, treating as logged out");
                None
            }
            Err(e) => {
                warn!(error = %e, "Persisted session is malformed, treating as logged out");
                None
            }
        }
    }

    fn is_well_formed(data: &SessionData) -> bool {
        !data.token.is_empty() && !data.user.email.is_empty()
    }

    /// Replace the current session with a new token/user pair.
    ///
    /// The pair is written to disk before memory is updated; a failed
    /// write returns an error and leaves the previous session intact.
    pub fn set_session(&self, token: String, user: User) -> Result<()> {
        let data = SessionData { token, user };

        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(&data)?;
        std::fs::write(&path, contents).context("Failed to persist session")?;

        *self.write_lock() = Some(data);
        Ok(())
    }

    /// Drop the current session from memory and disk. Idempotent: clearing
    /// an already-empty store is a no-op.
    pub fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("Failed to remove session file"),
        }

        *self.write_lock() = None;
        Ok(())
    }

    /// Snapshot of the current session, or `None`. Never a partial value.
    pub fn current(&self) -> Option<SessionData> {
        self.read_lock().clone()
    }

    /// The bearer token, if a session is active.
    pub fn token(&self) -> Option<String> {
        self.read_lock().as_ref().map(|d| d.token.clone())
    }

    /// The logged-in user, if a session is active.
    pub fn user(&self) -> Option<User> {
        self.read_lock().as_ref().map(|d| d.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_lock().is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    // A poisoned lock means a panic mid-clone of plain data; the value
    // itself is still coherent, so recover it rather than propagate.
    fn read_lock(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn test_user() -> User {
        User {
            id: "665f1c2ab1d2c3d4e5f60718".into(),
            email: "asha@mrf.example".into(),
            full_name: "Asha Nair".into(),
            role: Role::Operator,
            mrf_id: Some("MRF-KL-014".into()),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn store_in(dir: &std::path::Path) -> SessionStore {
        SessionStore::new(dir.to_path_buf())
    }

    #[test]
    fn initialize_with_no_file_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.initialize().is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn initialize_with_invalid_json_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        let store = store_in(dir.path());
        assert!(store.initialize().is_none());
    }

    #[test]
    fn initialize_with_missing_user_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), r#"{"token": "T"}"#).unwrap();
        let store = store_in(dir.path());
        assert!(store.initialize().is_none());
    }

    #[test]
    fn initialize_with_empty_token_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("T".into(), test_user()).unwrap();

        // Corrupt the persisted record in place
        let path = dir.path().join(SESSION_FILE);
        let doctored = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"T\"", "\"\"");
        std::fs::write(&path, doctored).unwrap();

        let fresh = store_in(dir.path());
        assert!(fresh.initialize().is_none());
    }

    #[test]
    fn initialize_with_unknown_role_yields_no_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SESSION_FILE),
            r#"{"token": "T", "user": {"_id": "x", "email": "a@b.c", "full_name": "A", "role": "superadmin"}}"#,
        )
        .unwrap();
        let store = store_in(dir.path());
        assert!(store.initialize().is_none());
    }

    #[test]
    fn set_then_current_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("tok-123".into(), test_user()).unwrap();

        let session = store.current().expect("session set");
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user.email, "asha@mrf.example");
        assert_eq!(store.token().as_deref(), Some("tok-123"));
    }

    #[test]
    fn session_survives_rehydration() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("tok-123".into(), test_user()).unwrap();

        // A second store over the same directory models a process restart
        let fresh = store_in(dir.path());
        let session = fresh.initialize().expect("persisted session adopted");
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user.role, Role::Operator);
    }

    #[test]
    fn clear_removes_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("tok-123".into(), test_user()).unwrap();

        store.clear_session().unwrap();
        assert!(store.current().is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());

        let fresh = store_in(dir.path());
        assert!(fresh.initialize().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("tok-123".into(), test_user()).unwrap();

        store.clear_session().unwrap();
        store.clear_session().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn set_overwrites_prior_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_session("first".into(), test_user()).unwrap();

        let mut other = test_user();
        other.email = "ravi@mrf.example".into();
        store.set_session("second".into(), other).unwrap();

        let session = store.current().unwrap();
        assert_eq!(session.token, "second");
        assert_eq!(session.user.email, "ravi@mrf.example");
    }
}
