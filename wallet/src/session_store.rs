//! Optional persistence of the connected account between page loads or runs.
//!
//! Only the address is stored. The network and balances are always read
//! again from the wallet.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::WalletResult;
use crate::session::WalletSession;
use crate::storage::{write_atomic, WalletPaths};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub address: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn from_session(session: &WalletSession) -> Self {
        Self {
            address: session.address.clone(),
            saved_at: Utc::now(),
        }
    }
}

pub trait SessionStore: Send + Sync {
    fn save(&self, session: &StoredSession) -> WalletResult<()>;
    fn load(&self) -> WalletResult<Option<StoredSession>>;
    fn clear(&self) -> WalletResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &StoredSession) -> WalletResult<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> WalletResult<Option<StoredSession>> {
        Ok(self.slot.lock().clone())
    }

    fn clear(&self) -> WalletResult<()> {
        self.slot.lock().take();
        Ok(())
    }
}

/// JSON file store, written atomically.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_paths(paths: &WalletPaths) -> Self {
        Self::new(paths.session_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &StoredSession) -> WalletResult<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(session)?)
    }

    fn load(&self) -> WalletResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    fn clear(&self) -> WalletResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
