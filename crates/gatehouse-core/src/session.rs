//! Session store: single-writer snapshot holder plus disk persistence.
//!
//! The hub is the only writer of session state; readers subscribe and receive
//! immutable snapshots. The persisted session lives in
//! `<base>/session.json` with restricted permissions (0600). Tokens are never
//! logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use crate::backend::types::{Session, UserIdentity};
use crate::config::paths;

/// Persisted session filename.
const SESSION_FILE: &str = "session.json";

/// Immutable view of the current authentication state.
///
/// `settled` is false until the first session event (the initial load)
/// arrives; readers render a loading state until then.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub settled: bool,
    pub session: Option<Session>,
}

impl SessionSnapshot {
    /// Derived identity of the signed-in user, if any.
    pub fn user(&self) -> Option<&UserIdentity> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_loading(&self) -> bool {
        !self.settled
    }
}

/// Single-writer publisher of session snapshots.
///
/// Every client-side session mutation (sign-in, sign-up, sign-out, initial
/// load, refresh) publishes through the hub; subscribers observe the
/// sequence of session-or-absent events. Dropping a receiver unsubscribes.
#[derive(Debug, Clone)]
pub struct SessionHub {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Publishes a new session state. The first publish settles the store.
    pub fn publish(&self, session: Option<Session>) {
        self.tx.send_replace(SessionSnapshot {
            settled: true,
            session,
        });
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot without subscribing.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }
}

/// Returns the path to the persisted session file.
pub fn session_path() -> PathBuf {
    paths::gatehouse_home().join(SESSION_FILE)
}

/// Loads the persisted session from disk.
/// Returns `None` if the file doesn't exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_persisted() -> Result<Option<Session>> {
    let path = session_path();
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read session from {}", path.display()))?;

    let session = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse session from {}", path.display()))?;
    Ok(Some(session))
}

/// Saves the session to disk with restricted permissions (0600).
///
/// # Errors
/// Returns an error if the operation fails.
pub fn persist(session: &Session) -> Result<()> {
    let path = session_path();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(session).context("Failed to serialize session")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

/// Removes the persisted session, if any.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_persisted() -> Result<()> {
    let path = session_path();
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove session at {}", path.display()))?;
    }
    Ok(())
}
