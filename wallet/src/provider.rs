//! The wallet provider gateway: the only way the rest of the crate talks to a
//! wallet or node.
//!
//! The trait mirrors the EIP-1193 methods the donation flow needs. It is
//! declared `?Send` so the browser implementation, whose futures wrap JS
//! promises, satisfies it on every target.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::WalletResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    EthRequestAccounts,
    EthAccounts,
    EthChainId,
    EthGetBalance,
    EthCall,
    EthSendTransaction,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EthRequestAccounts => "eth_requestAccounts",
            Self::EthAccounts => "eth_accounts",
            Self::EthChainId => "eth_chainId",
            Self::EthGetBalance => "eth_getBalance",
            Self::EthCall => "eth_call",
            Self::EthSendTransaction => "eth_sendTransaction",
        }
    }
}

/// Read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: String,
    pub data: String,
}

/// Transaction handed to the wallet for signing and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Positional JSON-RPC params for each gateway method.
pub mod params {
    use super::*;

    pub fn none() -> Value {
        json!([])
    }

    pub fn get_balance(address: &str) -> Value {
        json!([address, "latest"])
    }

    pub fn call(request: &CallRequest) -> Value {
        json!([request, "latest"])
    }

    pub fn send_transaction(request: &TransactionRequest) -> Value {
        json!([request])
    }
}

#[async_trait(?Send)]
pub trait WalletProvider {
    /// Ask the wallet for account access. Fails with `NoProvider` or `UserRejected`.
    async fn request_accounts(&self) -> WalletResult<Vec<String>>;

    /// Accounts already authorized for this site, without prompting.
    async fn accounts(&self) -> WalletResult<Vec<String>>;

    /// Current chain id as a hex string.
    async fn chain_id(&self) -> WalletResult<String>;

    /// Native balance in smallest units as a hex quantity.
    async fn native_balance(&self, address: &str) -> WalletResult<String>;

    /// Read-only contract call returning raw hex.
    async fn call(&self, request: &CallRequest) -> WalletResult<String>;

    /// Submit a transaction; returns the transaction hash.
    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String>;
}

#[async_trait(?Send)]
impl<P: WalletProvider + ?Sized> WalletProvider for std::sync::Arc<P> {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        (**self).request_accounts().await
    }

    async fn accounts(&self) -> WalletResult<Vec<String>> {
        (**self).accounts().await
    }

    async fn chain_id(&self) -> WalletResult<String> {
        (**self).chain_id().await
    }

    async fn native_balance(&self, address: &str) -> WalletResult<String> {
        (**self).native_balance(address).await
    }

    async fn call(&self, request: &CallRequest) -> WalletResult<String> {
        (**self).call(request).await
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        (**self).send_transaction(request).await
    }
}
