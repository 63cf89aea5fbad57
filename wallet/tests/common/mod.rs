//! A scripted in-memory wallet shared by the integration tests.
//!
//! Balances are kept per owner and updated by submitted transfers, so a
//! rescan after a donation sees the new amounts.

#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use futures::channel::oneshot;
use parking_lot::Mutex;

use tipjar_wallet_lib::abi;
use tipjar_wallet_lib::{CallRequest, TransactionRequest, WalletError, WalletProvider, WalletResult};

pub const HOLDER: &str = "0x1111111111111111111111111111111111111111";

pub struct ScriptedWallet {
    pub accounts: Mutex<WalletResult<Vec<String>>>,
    pub chain_id: Mutex<String>,
    /// Lowercase owner -> native balance in wei.
    pub native: Mutex<HashMap<String, u128>>,
    /// (lowercase contract, lowercase owner) -> token balance in smallest units.
    pub tokens: Mutex<HashMap<(String, String), u128>>,
    pub reject_sends: Mutex<bool>,
    pub sent: Mutex<Vec<TransactionRequest>>,
    native_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedWallet {
    pub fn new(chain_id: &str) -> Self {
        Self {
            accounts: Mutex::new(Ok(vec![HOLDER.to_string()])),
            chain_id: Mutex::new(chain_id.to_string()),
            native: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            reject_sends: Mutex::new(false),
            sent: Mutex::new(Vec::new()),
            native_gate: Mutex::new(None),
        }
    }

    pub fn fund_native(self, owner: &str, wei: u128) -> Self {
        self.native.lock().insert(owner.to_lowercase(), wei);
        self
    }

    pub fn fund_token(self, contract: &str, owner: &str, amount: u128) -> Self {
        self.tokens
            .lock()
            .insert((contract.to_lowercase(), owner.to_lowercase()), amount);
        self
    }

    pub fn set_native(&self, owner: &str, wei: u128) {
        self.native.lock().insert(owner.to_lowercase(), wei);
    }

    pub fn token_balance(&self, contract: &str, owner: &str) -> u128 {
        self.tokens
            .lock()
            .get(&(contract.to_lowercase(), owner.to_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    /// Hold the next native balance read until the returned sender fires.
    pub fn gate_next_native_read(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.native_gate.lock() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl WalletProvider for ScriptedWallet {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        self.accounts.lock().clone()
    }

    async fn accounts(&self) -> WalletResult<Vec<String>> {
        self.accounts.lock().clone()
    }

    async fn chain_id(&self) -> WalletResult<String> {
        Ok(self.chain_id.lock().clone())
    }

    async fn native_balance(&self, address: &str) -> WalletResult<String> {
        let gate = self.native_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let wei = self
            .native
            .lock()
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(0);
        Ok(format!("0x{:x}", wei))
    }

    async fn call(&self, request: &CallRequest) -> WalletResult<String> {
        // 0x + selector (8) + 24 zero nibbles, then the 40 owner nibbles.
        let owner = format!("0x{}", &request.data[34..74]);
        Ok(format!(
            "0x{:064x}",
            self.token_balance(&request.to, &owner)
        ))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> WalletResult<String> {
        self.sent.lock().push(request.clone());
        if *self.reject_sends.lock() {
            return Err(WalletError::from_provider_code(
                4001,
                "User denied transaction signature.",
            ));
        }

        let from = request.from.to_lowercase();
        match (&request.value, &request.data) {
            (Some(value), None) => {
                let wei = u128::from_str_radix(value.trim_start_matches("0x"), 16)
                    .map_err(|e| WalletError::ProviderError(e.to_string()))?;
                let mut native = self.native.lock();
                let balance = native.entry(from).or_insert(0);
                *balance = balance
                    .checked_sub(wei)
                    .ok_or_else(|| WalletError::ProviderError("insufficient funds".into()))?;
            }
            (None, Some(data)) => {
                let (_, amount) = abi::decode_transfer(data)?;
                let amount: u128 = amount
                    .to_string()
                    .parse()
                    .map_err(|_| WalletError::ProviderError("amount overflow".into()))?;
                let mut tokens = self.tokens.lock();
                let balance = tokens
                    .entry((request.to.to_lowercase(), from))
                    .or_insert(0);
                *balance = balance
                    .checked_sub(amount)
                    .ok_or_else(|| WalletError::ProviderError("transfer amount exceeds balance".into()))?;
            }
            _ => {
                return Err(WalletError::ProviderError(
                    "transaction must carry either value or data".into(),
                ))
            }
        }

        Ok(format!("0x{:064x}", self.sent.lock().len()))
    }
}
