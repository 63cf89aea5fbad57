use serde::{Deserialize, Serialize};
use std::fmt;

/// EIP-1193 code for a request the user declined in the wallet UI.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletError {
    // Provider errors
    NoProvider,
    UserRejected(String),
    ProviderError(String),

    // Transfer validation errors
    InvalidAmount(String),
    NoTokenSelected,
    InsufficientBalance(String),
    NoRecipient(String),

    // Network errors
    NetworkError(String),
    InvalidResponse(String),

    // Storage errors
    StorageError(String),
    FileNotFound(String),
    PermissionDenied(String),

    // Validation errors
    ValidationError(String),
    InvalidAddress(String),

    // Application errors
    InvalidState(String),
    NotFound(String),
}

/// Coarse error classification reported to the widget with a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NoProvider,
    UserRejected,
    Provider,
    InvalidAmount,
    NoTokenSelected,
    InsufficientBalance,
    NoRecipient,
    Other,
}

impl WalletError {
    /// Translate an EIP-1193 / JSON-RPC error object into a wallet error.
    pub fn from_provider_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE {
            WalletError::UserRejected(message)
        } else {
            WalletError::ProviderError(format!("{}: {}", code, message))
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NoProvider => ErrorKind::NoProvider,
            WalletError::UserRejected(_) => ErrorKind::UserRejected,
            WalletError::ProviderError(_)
            | WalletError::NetworkError(_)
            | WalletError::InvalidResponse(_) => ErrorKind::Provider,
            WalletError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            WalletError::NoTokenSelected => ErrorKind::NoTokenSelected,
            WalletError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            WalletError::NoRecipient(_) => ErrorKind::NoRecipient,
            _ => ErrorKind::Other,
        }
    }

    /// Local validation failures are reported inline and never reach the provider.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidAmount
                | ErrorKind::NoTokenSelected
                | ErrorKind::InsufficientBalance
                | ErrorKind::NoRecipient
        )
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::NoProvider => write!(f, "No wallet provider detected"),
            WalletError::UserRejected(msg) => write!(f, "Request rejected by user: {}", msg),
            WalletError::ProviderError(msg) => write!(f, "Provider error: {}", msg),

            WalletError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            WalletError::NoTokenSelected => write!(f, "No token selected"),
            WalletError::InsufficientBalance(msg) => write!(f, "Insufficient balance: {}", msg),
            WalletError::NoRecipient(msg) => write!(f, "No donation recipient: {}", msg),

            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),

            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            WalletError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            WalletError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),

            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),

            WalletError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            WalletError::NotFound(msg) => write!(f, "Not found: {}", msg),

        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

// Conversion helpers
impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => WalletError::FileNotFound(error.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                WalletError::PermissionDenied(error.to_string())
            }
            _ => WalletError::StorageError(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::ValidationError(format!("JSON error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_code_maps_to_user_rejected() {
        let err = WalletError::from_provider_code(4001, "User denied account authorization");
        assert_eq!(err.kind(), ErrorKind::UserRejected);
    }

    #[test]
    fn other_codes_map_to_provider_error() {
        let err = WalletError::from_provider_code(-32603, "Internal JSON-RPC error.");
        assert_eq!(
            err,
            WalletError::ProviderError("-32603: Internal JSON-RPC error.".to_string())
        );
        assert_eq!(WalletError::NetworkError("timeout".into()).kind(), ErrorKind::Provider);
    }

    #[test]
    fn validation_kinds_are_flagged() {
        assert!(WalletError::NoTokenSelected.is_validation());
        assert!(WalletError::InvalidAmount("0".into()).is_validation());
        assert!(!WalletError::NoProvider.is_validation());
    }
}
