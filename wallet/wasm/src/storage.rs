use tipjar_wallet_lib::{SessionStore, StoredSession, WalletError, WalletResult};
use web_sys::Storage;

pub const SESSION_KEY: &str = "tipjar.wallet.session";

/// Session store backed by `window.localStorage`.
///
/// Holds only the key; the storage handle is looked up on every call so the
/// store stays `Send + Sync`.
#[derive(Debug, Clone)]
pub struct LocalSessionStore {
    key: String,
}

impl Default for LocalSessionStore {
    fn default() -> Self {
        Self::new(SESSION_KEY)
    }
}

impl LocalSessionStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn storage(&self) -> WalletResult<Storage> {
        web_sys::window()
            .ok_or_else(|| WalletError::StorageError("no window".to_string()))?
            .local_storage()
            .map_err(|_| WalletError::PermissionDenied("localStorage is blocked".to_string()))?
            .ok_or_else(|| WalletError::StorageError("localStorage unavailable".to_string()))
    }
}

impl SessionStore for LocalSessionStore {
    fn save(&self, session: &StoredSession) -> WalletResult<()> {
        let text = serde_json::to_string(session)?;
        self.storage()?
            .set_item(&self.key, &text)
            .map_err(|_| WalletError::StorageError("localStorage write failed".to_string()))
    }

    fn load(&self) -> WalletResult<Option<StoredSession>> {
        let text = self
            .storage()?
            .get_item(&self.key)
            .map_err(|_| WalletError::StorageError("localStorage read failed".to_string()))?;
        let Some(text) = text else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                log::warn!("Ignoring unreadable stored session: {}", err);
                Ok(None)
            }
        }
    }

    fn clear(&self) -> WalletResult<()> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|_| WalletError::StorageError("localStorage delete failed".to_string()))
    }
}
