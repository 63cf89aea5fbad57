//! Tip Jar Wallet WebAssembly Library
//!
//! Browser bindings for the donation widget: the injected EIP-1193 provider,
//! a `localStorage` session store and the `DonationWidget` exported to JS.

use std::fmt;
use std::time::Duration;

use js_sys::{Object, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use tipjar_wallet_lib::WalletError;

mod injected;
mod logger;
mod storage;
mod widget;

pub use injected::InjectedProvider;
pub use storage::LocalSessionStore;
pub use widget::DonationWidget;

pub type WasmResult<T> = Result<T, JsValue>;

/// Error surfaced to JavaScript as an `Error` with a `code` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmError {
    pub code: String,
    pub message: String,
}

impl WasmError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for WasmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<WalletError> for WasmError {
    fn from(err: WalletError) -> Self {
        let code = serde_json::to_value(err.kind())
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "other".to_string());
        Self {
            code,
            message: err.to_string(),
        }
    }
}

impl From<WasmError> for JsValue {
    fn from(err: WasmError) -> Self {
        let error = js_sys::Error::new(&err.message);
        let _ = Reflect::set(&error, &"code".into(), &JsValue::from_str(&err.code));
        error.into()
    }
}

pub(crate) fn wallet_err(err: WalletError) -> JsValue {
    WasmError::from(err).into()
}

/// Convert to a plain JS value. Maps become objects and `None` becomes `null`,
/// matching what the JSON encoding of the same value looks like.
pub fn rust_to_js<T: Serialize + ?Sized>(value: &T) -> WasmResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| WasmError::new("SERIALIZATION", &e.to_string()).into())
}

pub fn js_to_rust<T: DeserializeOwned>(value: &JsValue) -> WasmResult<T> {
    serde_wasm_bindgen::from_value(value.clone())
        .map_err(|e| WasmError::new("DESERIALIZATION", &e.to_string()).into())
}

/// Resolve after `duration` using `setTimeout`.
pub(crate) async fn sleep(duration: Duration) {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Networks the widget can donate on, with their recipient.
#[wasm_bindgen(js_name = supportedNetworks)]
pub fn supported_networks() -> WasmResult<JsValue> {
    let networks: Vec<_> = tipjar_wallet_lib::supported_networks()
        .iter()
        .map(|network| {
            serde_json::json!({
                "network": network,
                "recipient": tipjar_wallet_lib::recipient_for(Some(network)),
            })
        })
        .collect();
    rust_to_js(&networks)
}

/// Every donation address with its address format, including Solana.
#[wasm_bindgen(js_name = donationRecipients)]
pub fn donation_recipients() -> WasmResult<JsValue> {
    rust_to_js(tipjar_wallet_lib::recipient::donation_recipients())
}

/// Initialize the WASM module
#[wasm_bindgen]
pub fn init_wasm() -> Result<Object, JsValue> {
    let status = Object::new();
    let _ = Reflect::set(&status, &"initialized".into(), &true.into());
    let _ = Reflect::set(
        &status,
        &"providerDetected".into(),
        &InjectedProvider::from_window().is_available().into(),
    );
    let _ = Reflect::set(
        &status,
        &"version".into(),
        &env!("CARGO_PKG_VERSION").into(),
    );
    Ok(status)
}

// Module initialization
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    log::info!("Tip jar wallet module loaded");
}
