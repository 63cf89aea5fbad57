use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{WalletError, WalletResult};

/// Filesystem layout for the native donation client.
#[derive(Debug, Clone)]
pub struct WalletPaths {
    /// Root directory for wallet data.
    root_dir: PathBuf,
    /// Path to persisted donation configuration.
    config_file: PathBuf,
    /// Path to the remembered wallet session, when persistence is enabled.
    session_file: PathBuf,
}

impl WalletPaths {
    pub const CONFIG_FILENAME: &'static str = "tipjar.config";
    pub const SESSION_FILENAME: &'static str = "session.json";

    /// Create a new path manager rooted at the provided directory.
    pub fn new(root: impl AsRef<Path>) -> WalletResult<Self> {
        let root_dir = root.as_ref().to_path_buf();
        if root_dir.as_os_str().is_empty() {
            return Err(WalletError::StorageError(
                "Wallet root directory cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            config_file: root_dir.join(Self::CONFIG_FILENAME),
            session_file: root_dir.join(Self::SESSION_FILENAME),
            root_dir,
        })
    }

    pub fn ensure_directories(&self) -> WalletResult<()> {
        fs::create_dir_all(&self.root_dir)?;
        Ok(())
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}
