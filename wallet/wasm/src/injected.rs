//! EIP-1193 provider injected by browser wallets as `window.ethereum`.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use tipjar_wallet_lib::provider::params;
use tipjar_wallet_lib::{
    CallRequest, RpcMethod, TransactionRequest, WalletError, WalletProvider, WalletResult,
};

use crate::{js_to_rust, rust_to_js};

pub struct InjectedProvider {
    ethereum: Option<JsValue>,
}

impl InjectedProvider {
    /// Look up `window.ethereum`. A missing provider is reported as
    /// `NoProvider` on first use, not here.
    pub fn from_window() -> Self {
        let ethereum = web_sys::window()
            .and_then(|window| Reflect::get(&window, &"ethereum".into()).ok())
            .filter(|value| !value.is_undefined() && !value.is_null());
        Self { ethereum }
    }

    pub fn is_available(&self) -> bool {
        self.ethereum.is_some()
    }

    fn ethereum(&self) -> WalletResult<&JsValue> {
        self.ethereum.as_ref().ok_or(WalletError::NoProvider)
    }

    fn method(&self, name: &str) -> WalletResult<Function> {
        Reflect::get(self.ethereum()?, &name.into())
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or(WalletError::NoProvider)
    }

    async fn request(&self, method: RpcMethod, params: Value) -> WalletResult<JsValue> {
        let args = Object::new();
        let params = rust_to_js(&params).map_err(|_| {
            WalletError::InvalidState(format!("could not encode params for {}", method.as_str()))
        })?;
        let _ = Reflect::set(&args, &"method".into(), &method.as_str().into());
        let _ = Reflect::set(&args, &"params".into(), &params);

        let promise: Promise = self
            .method("request")?
            .call1(self.ethereum()?, &args)
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| WalletError::InvalidResponse("request() did not return a promise".into()))?;

        JsFuture::from(promise).await.map_err(provider_error)
    }

    async fn request_string(&self, method: RpcMethod, params: Value) -> WalletResult<String> {
        self.request(method, params).await?.as_string().ok_or_else(|| {
            WalletError::InvalidResponse(format!("{} returned a non-string result", method.as_str()))
        })
    }

    /// Register an EIP-1193 event listener (`chainChanged`, `accountsChanged`).
    pub fn on(&self, event: &str, handler: &Function) -> WalletResult<()> {
        self.method("on")?
            .call2(self.ethereum()?, &event.into(), handler)
            .map(|_| ())
            .map_err(provider_error)
    }

    pub fn remove_listener(&self, event: &str, handler: &Function) -> WalletResult<()> {
        self.method("removeListener")?
            .call2(self.ethereum()?, &event.into(), handler)
            .map(|_| ())
            .map_err(provider_error)
    }
}

/// Translate a rejected provider request. EIP-1193 errors carry a numeric
/// `code` and a `message`.
pub(crate) fn provider_error(err: JsValue) -> WalletError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|code| code.as_f64());
    let message = Reflect::get(&err, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown provider error".to_string());

    match code {
        Some(code) => WalletError::from_provider_code(code as i64, message),
        None => WalletError::ProviderError(message),
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        let accounts = self
            .request(RpcMethod::EthRequestAccounts, params::none())
            .await?;
        js_to_rust(&accounts)
            .map_err(|_| WalletError::InvalidResponse("accounts must be a list of strings".into()))
    }

    async fn accounts(&self) -> WalletResult<Vec<String>> {
        let accounts = self.request(RpcMethod::EthAccounts, params::none()).await?;
        js_to_rust(&accounts)
            .map_err(|_| WalletError::InvalidResponse("accounts must be a list of strings".into()))
    }

    async fn chain_id(&self) -> WalletResult<String> {
        self.request_string(RpcMethod::EthChainId, params::none()).await
    }

    async fn native_balance(&self, address: &str) -> WalletResult<String> {
        self.request_string(RpcMethod::EthGetBalance, params::get_balance(address))
            .await
    }

    async fn call(&self, request: &CallRequest) -> WalletResult<String> {
        self.request_string(RpcMethod::EthCall, params::call(request))
            .await
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        self.request_string(RpcMethod::EthSendTransaction, params::send_transaction(request))
            .await
    }
}
