//! The donation widget exported to JavaScript.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use js_sys::{Function, Promise};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use tipjar_wallet_lib::{DonationController, TransferOutcome};

use crate::injected::InjectedProvider;
use crate::storage::LocalSessionStore;
use crate::{js_to_rust, rust_to_js, sleep, wallet_err, WasmResult};

const CHAIN_CHANGED: &str = "chainChanged";
const ACCOUNTS_CHANGED: &str = "accountsChanged";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WidgetOptions {
    persist_session: bool,
    rescan_delay_ms: u64,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            persist_session: false,
            rescan_delay_ms: 4_000,
        }
    }
}

struct WidgetInner {
    controller: DonationController<InjectedProvider>,
    on_change: RefCell<Option<Function>>,
    listeners: RefCell<Vec<(&'static str, Closure<dyn FnMut(JsValue)>)>>,
}

impl WidgetInner {
    fn notify(&self) {
        let Some(callback) = self.on_change.borrow().clone() else {
            return;
        };
        match rust_to_js(&self.controller.view()) {
            Ok(view) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &view) {
                    log::warn!("onChange callback threw: {:?}", err);
                }
            }
            Err(err) => log::error!("Could not serialize widget state: {:?}", err),
        }
    }

    fn view(&self) -> WasmResult<JsValue> {
        rust_to_js(&self.controller.view())
    }
}

/// Subscribe to wallet events once per widget.
fn attach_listeners(inner: &Rc<WidgetInner>) {
    if !inner.listeners.borrow().is_empty() || !inner.controller.provider().is_available() {
        return;
    }

    let weak = Rc::downgrade(inner);
    let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |chain_id: JsValue| {
        let Some(chain_id) = chain_id.as_string() else {
            return;
        };
        with_inner(&weak, |inner| {
            spawn_local(async move {
                inner.controller.handle_chain_changed(&chain_id).await;
                inner.notify();
            });
        });
    });

    let weak = Rc::downgrade(inner);
    let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
        let accounts: Vec<String> = js_to_rust(&accounts).unwrap_or_default();
        with_inner(&weak, |inner| {
            spawn_local(async move {
                inner.controller.handle_accounts_changed(&accounts).await;
                inner.notify();
            });
        });
    });

    let mut listeners = inner.listeners.borrow_mut();
    for (event, closure) in [(CHAIN_CHANGED, on_chain), (ACCOUNTS_CHANGED, on_accounts)] {
        let handler: &Function = closure.as_ref().unchecked_ref();
        if let Err(err) = inner.controller.provider().on(event, handler) {
            log::warn!("Could not subscribe to {}: {}", event, err);
            continue;
        }
        listeners.push((event, closure));
    }
}

/// Rescan once after the configured delay, then re-render.
fn schedule_rescan(inner: &Rc<WidgetInner>) {
    let inner = Rc::clone(inner);
    spawn_local(async move {
        let delay = inner.controller.rescan_delay();
        inner.controller.refresh_after(sleep(delay)).await;
        inner.notify();
    });
}

impl Drop for WidgetInner {
    fn drop(&mut self) {
        for (event, closure) in self.listeners.borrow_mut().drain(..) {
            let handler: &Function = closure.as_ref().unchecked_ref();
            let _ = self.controller.provider().remove_listener(event, handler);
        }
    }
}

fn with_inner<F: FnOnce(Rc<WidgetInner>)>(weak: &Weak<WidgetInner>, f: F) {
    if let Some(inner) = weak.upgrade() {
        f(inner);
    }
}

#[wasm_bindgen]
pub struct DonationWidget {
    inner: Rc<WidgetInner>,
}

#[wasm_bindgen]
impl DonationWidget {
    /// `options`: `{ persistSession?: boolean, rescanDelayMs?: number }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<DonationWidget, JsValue> {
        let options: WidgetOptions = if options.is_undefined() || options.is_null() {
            WidgetOptions::default()
        } else {
            js_to_rust(&options)?
        };

        let mut controller = DonationController::new(InjectedProvider::from_window())
            .with_rescan_delay(Duration::from_millis(options.rescan_delay_ms));
        if options.persist_session {
            controller = controller.with_store(Arc::new(LocalSessionStore::default()));
        }

        Ok(DonationWidget {
            inner: Rc::new(WidgetInner {
                controller,
                on_change: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        })
    }

    #[wasm_bindgen(js_name = hasProvider)]
    pub fn has_provider(&self) -> bool {
        self.inner.controller.provider().is_available()
    }

    /// Called with the new view after every state change.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.inner.on_change.borrow_mut() = Some(callback);
    }

    pub fn view(&self) -> WasmResult<JsValue> {
        self.inner.view()
    }

    /// Resolves with the view once connected and scanned.
    pub fn connect(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let result = inner.controller.connect().await;
            inner.notify();
            result.map_err(wallet_err)?;
            attach_listeners(&inner);
            inner.view()
        })
    }

    /// Resolves with the view, or `null` when there is nothing to restore.
    pub fn restore(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let restored = inner.controller.restore().await.map_err(wallet_err)?;
            if restored.is_none() {
                return Ok(JsValue::NULL);
            }
            attach_listeners(&inner);
            inner.notify();
            inner.view()
        })
    }

    pub fn disconnect(&self) {
        self.inner.controller.disconnect();
        self.inner.notify();
    }

    pub fn refresh(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.controller.refresh_balances().await;
            inner.notify();
            inner.view()
        })
    }

    /// Select by key (`"native"` or contract address); `undefined` clears.
    #[wasm_bindgen(js_name = selectToken)]
    pub fn select_token(&self, key: Option<String>) -> WasmResult<()> {
        self.inner
            .controller
            .select_token(key.as_deref())
            .map_err(wallet_err)?;
        self.inner.notify();
        Ok(())
    }

    #[wasm_bindgen(js_name = setAmount)]
    pub fn set_amount(&self, amount: String) {
        self.inner.controller.set_amount(&amount);
        self.inner.notify();
    }

    #[wasm_bindgen(js_name = useMaxAmount)]
    pub fn use_max_amount(&self) -> WasmResult<String> {
        let amount = self.inner.controller.use_max_amount().map_err(wallet_err)?;
        self.inner.notify();
        Ok(amount)
    }

    /// Resolves with the transfer outcome. A submitted donation triggers one
    /// delayed rescan.
    pub fn donate(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let outcome = inner.controller.donate().await.map_err(wallet_err)?;
            inner.notify();
            if let TransferOutcome::Submitted { .. } = outcome {
                schedule_rescan(&inner);
            }
            rust_to_js(&outcome)
        })
    }
}
