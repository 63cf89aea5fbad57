//! HTTP JSON-RPC wallet provider for native builds.
//!
//! Talks to a node endpoint (a local dev node or a signing proxy) instead of
//! an injected browser wallet. Nodes never prompt, so account access uses
//! `eth_accounts`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config_store::RpcConfig;
use crate::errors::{WalletError, WalletResult};
use crate::provider::{params, CallRequest, RpcMethod, TransactionRequest, WalletProvider};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct JsonRpcProvider {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(config: &RpcConfig) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                WalletError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: RpcMethod, params: Value) -> WalletResult<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.as_str(),
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        log::trace!("JSON-RPC {} #{}", request.method, request.id);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::NetworkError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WalletError::NetworkError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WalletError::NetworkError(format!("Failed to read response: {}", e)))?;
        decode_response(&body)
    }
}

/// Decode a JSON-RPC 2.0 response body into its `result`.
fn decode_response<T: DeserializeOwned>(body: &[u8]) -> WalletResult<T> {
    let response: JsonRpcResponse = serde_json::from_slice(body)
        .map_err(|e| WalletError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(WalletError::from_provider_code(error.code, error.message));
    }

    let result = response
        .result
        .ok_or_else(|| WalletError::InvalidResponse("No result in RPC response".to_string()))?;
    serde_json::from_value(result)
        .map_err(|e| WalletError::InvalidResponse(format!("Unexpected result shape: {}", e)))
}

#[async_trait(?Send)]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        self.accounts().await
    }

    async fn accounts(&self) -> WalletResult<Vec<String>> {
        self.rpc_call(RpcMethod::EthAccounts, params::none()).await
    }

    async fn chain_id(&self) -> WalletResult<String> {
        self.rpc_call(RpcMethod::EthChainId, params::none()).await
    }

    async fn native_balance(&self, address: &str) -> WalletResult<String> {
        self.rpc_call(RpcMethod::EthGetBalance, params::get_balance(address))
            .await
    }

    async fn call(&self, request: &CallRequest) -> WalletResult<String> {
        self.rpc_call(RpcMethod::EthCall, params::call(request)).await
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        self.rpc_call(RpcMethod::EthSendTransaction, params::send_transaction(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn result_is_extracted() {
        let chain: String = decode_response(br#"{"jsonrpc":"2.0","id":1,"result":"0x89"}"#).unwrap();
        assert_eq!(chain, "0x89");

        let accounts: Vec<String> =
            decode_response(br#"{"jsonrpc":"2.0","id":2,"result":["0xabc"]}"#).unwrap();
        assert_eq!(accounts, vec!["0xabc".to_string()]);
    }

    #[test]
    fn error_codes_are_translated() {
        let err = decode_response::<String>(
            br#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserRejected);

        let err = decode_response::<String>(
            br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::ProviderError(msg) if msg.contains("insufficient funds")));
    }

    #[test]
    fn missing_or_mistyped_result_is_invalid() {
        for body in [
            &br#"{"jsonrpc":"2.0","id":1}"#[..],
            br#"{"jsonrpc":"2.0","id":1,"result":null}"#,
            br#"{"jsonrpc":"2.0","id":1,"result":42}"#,
            br#"<html>bad gateway</html>"#,
        ] {
            assert!(matches!(
                decode_response::<String>(body),
                Err(WalletError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn endpoint_is_normalized() {
        let provider = JsonRpcProvider::new(&RpcConfig {
            endpoint: "http://localhost:8545/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8545");
    }

    #[tokio::test]
    #[ignore = "requires running RPC node at localhost:8545"]
    async fn test_real_chain_id_call() {
        let provider = JsonRpcProvider::new(&RpcConfig::default()).unwrap();
        assert!(provider.chain_id().await.is_ok(), "chain id call should succeed");
    }
}
