//! Session store for the signed-in user
//!
//! The store is created once at start-up and passed to every service that
//! needs the current user. Its lifecycle is explicit:
//!
//! - **load on start**: [`SessionStore::open`] reads the persisted session file
//! - **update on profile change**: [`SessionStore::update_user`]
//! - **clear on sign-out**: [`SessionStore::sign_out`]
//!
//! State lives behind `Arc<RwLock<..>>`, so clones share the same session.
//! Writers are not ordered against each other; the last write wins.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{Result, SessionError};
use crate::types::{Session, UserProfile};

#[derive(Clone)]
pub struct SessionStore {
    /// Where the session is persisted; `None` keeps it in memory only
    state_file: Option<PathBuf>,
    state: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Open a store backed by `state_file`, loading any persisted session
    pub fn open(state_file: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            state_file: Some(state_file.into()),
            state: Arc::new(RwLock::new(None)),
        };
        store.load()?;
        Ok(store)
    }

    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            state_file: None,
            state: Arc::new(RwLock::new(None)),
        }
    }

    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().ok().flatten().is_some()
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Result<Option<Session>> {
        let state = self.state.read().map_err(|_| SessionError::Poisoned)?;
        Ok(state.clone())
    }

    /// Current user, or `SessionError::NotSignedIn`
    pub fn current_user(&self) -> Result<UserProfile> {
        self.current()?
            .map(|session| session.user)
            .ok_or_else(|| SessionError::NotSignedIn.into())
    }

    /// Bearer token of the current session, if any
    pub fn token(&self) -> Option<String> {
        self.current().ok().flatten().map(|session| session.token)
    }

    pub fn sign_in(&self, session: Session) -> Result<()> {
        tracing::info!(user_id = %session.user.id, "signed in");
        {
            let mut state = self.state.write().map_err(|_| SessionError::Poisoned)?;
            *state = Some(session);
        }
        self.save()
    }

    /// Replace the stored profile with one returned by the API
    pub fn update_user(&self, user: UserProfile) -> Result<()> {
        {
            let mut state = self.state.write().map_err(|_| SessionError::Poisoned)?;
            let session = state.as_mut().ok_or(SessionError::NotSignedIn)?;
            tracing::debug!(user_id = %user.id, "updating stored profile");
            session.user = user;
        }
        self.save()
    }

    /// Forget the session and remove the persisted file
    pub fn sign_out(&self) -> Result<()> {
        {
            let mut state = self.state.write().map_err(|_| SessionError::Poisoned)?;
            *state = None;
        }

        if let Some(path) = &self.state_file {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| {
                    SessionError::StateFile(format!("Failed to remove session file: {}", e))
                })?;
            }
        }

        tracing::info!("signed out");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };

        let state = self.state.read().map_err(|_| SessionError::Poisoned)?;
        let Some(session) = state.as_ref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SessionError::StateFile(format!("Failed to create directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(session)
            .map_err(|e| SessionError::StateFile(format!("Failed to serialize session: {}", e)))?;
        write_private(path, content.as_bytes())
            .map_err(|e| SessionError::StateFile(format!("Failed to write session file: {}", e)))?;

        Ok(())
    }

    /// A missing file means signed out; an unreadable one is logged and ignored
    fn load(&self) -> Result<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SessionError::StateFile(format!("Failed to read session file: {}", e)))?;

        match toml::from_str::<Session>(&content) {
            Ok(session) => {
                let mut state = self.state.write().map_err(|_| SessionError::Poisoned)?;
                *state = Some(session);
            }
            Err(e) => {
                tracing::warn!("Corrupted session file, starting signed out: {}", e);
            }
        }
        Ok(())
    }
}

/// Write `content` to a file only the owner can read.
///
/// The file holds a bearer token, so on unix it is created with mode 0600
/// and a pre-existing file is tightened before anything is written.
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content)?;
    file.sync_all()
}
