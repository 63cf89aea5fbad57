// lib.rs - Core library for the tip jar wallet widget

pub mod abi;
pub mod amount;
pub mod app_state;
pub mod catalog;
pub mod config_store;
pub mod controller;
pub mod errors;
pub mod network;
pub mod provider;
pub mod recipient;
#[cfg(feature = "native")]
pub mod rpc_client;
pub mod scanner;
pub mod session;
pub mod session_store;
pub mod storage;
pub mod transfer;
pub mod validation;

// Re-export common types
pub use amount::TokenAmount;
pub use app_state::DonationContext;
pub use catalog::{catalog_for, TokenCatalogEntry};
pub use config_store::{ConfigStore, DonationConfig, RpcConfig, ScanConfig};
pub use controller::DonationController;
pub use errors::{ErrorKind, WalletError, WalletResult};
pub use network::{resolve_network, supported_networks, AddressFormat, NetworkDescriptor};
pub use provider::{CallRequest, RpcMethod, TransactionRequest, WalletProvider};
pub use recipient::recipient_for;
#[cfg(feature = "native")]
pub use rpc_client::JsonRpcProvider;
pub use scanner::{scan_balances, TokenBalance};
pub use session::{DonationPhase, DonationView, Notice, SessionManager, WalletSession};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
pub use storage::WalletPaths;
pub use transfer::{transfer, TransferOutcome, TransferRequest};
pub use validation::InputValidator;
