use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config_store::DonationConfig;
use crate::errors::{WalletError, WalletResult};
use crate::provider::WalletProvider;
use crate::scanner::scan_balances;
use crate::session::{DonationView, SessionManager, WalletSession};
use crate::session_store::{SessionStore, StoredSession};
use crate::transfer::{self, TransferOutcome};

/// Drives the donation flow against one wallet provider.
pub struct DonationController<P: WalletProvider> {
    provider: P,
    session: SessionManager,
    store: Option<Arc<dyn SessionStore>>,
    rescan_delay: Duration,
}

impl<P: WalletProvider> DonationController<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: SessionManager::new(),
            store: None,
            rescan_delay: Duration::from_millis(4_000),
        }
    }

    /// Build a controller honouring `config`. `store` is used only when
    /// session persistence is enabled.
    pub fn from_config(
        provider: P,
        config: &DonationConfig,
        store: Option<Arc<dyn SessionStore>>,
    ) -> Self {
        let controller = Self::new(provider).with_rescan_delay(config.scan.rescan_delay());
        match store {
            Some(store) if config.persist_session => controller.with_store(store),
            _ => controller,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_rescan_delay(mut self, delay: Duration) -> Self {
        self.rescan_delay = delay;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session
    }

    pub fn rescan_delay(&self) -> Duration {
        self.rescan_delay
    }

    pub fn view(&self) -> DonationView {
        self.session.snapshot()
    }

    /// Ask the wallet for access, resolve its network and scan balances.
    pub async fn connect(&self) -> WalletResult<WalletSession> {
        self.session.begin_connect()?;

        let handshake: WalletResult<(String, String)> = async {
            let accounts = self.provider.request_accounts().await?;
            let address = accounts.into_iter().next().ok_or_else(|| {
                WalletError::ProviderError("wallet returned no accounts".to_string())
            })?;
            let chain_id = self.provider.chain_id().await?;
            Ok((address, chain_id))
        }
        .await;

        let (address, chain_id) = match handshake {
            Ok(pair) => pair,
            Err(err) => {
                log::warn!("Wallet connection failed: {}", err);
                self.session.abort_connect();
                return Err(err);
            }
        };

        let session = self.session.complete_connect(&address, &chain_id)?;
        log::info!(
            "Connected {} on chain {} (session {})",
            session.address,
            chain_id,
            session.session_id
        );
        self.persist(&session);
        self.refresh_balances().await;
        Ok(session)
    }

    /// Reconnect a remembered account without prompting. Returns `None` when
    /// nothing is stored, persistence is off, or the wallet no longer
    /// authorizes the stored account (the stored session is then forgotten).
    pub async fn restore(&self) -> WalletResult<Option<WalletSession>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let Some(stored) = store.load()? else {
            return Ok(None);
        };

        self.session.begin_connect()?;
        let handshake: WalletResult<Option<String>> = async {
            let authorized = match self.provider.accounts().await {
                Ok(accounts) => accounts
                    .iter()
                    .any(|account| account.eq_ignore_ascii_case(&stored.address)),
                Err(WalletError::NoProvider) => return Err(WalletError::NoProvider),
                Err(err) => {
                    log::warn!("Could not read authorized accounts: {}", err);
                    false
                }
            };
            if !authorized {
                return Ok(None);
            }
            self.provider.chain_id().await.map(Some)
        }
        .await;

        let chain_id = match handshake {
            Ok(Some(chain_id)) => chain_id,
            Ok(None) => {
                log::info!("Stored account {} is no longer authorized", stored.address);
                self.session.abort_connect();
                if let Err(err) = store.clear() {
                    log::warn!("Failed to clear stored session: {}", err);
                }
                return Ok(None);
            }
            Err(err) => {
                log::warn!("Could not restore session for {}: {}", stored.address, err);
                self.session.abort_connect();
                return Err(err);
            }
        };

        let session = self.session.complete_connect(&stored.address, &chain_id)?;
        log::info!("Restored session for {} on chain {}", session.address, chain_id);
        self.persist(&session);
        self.refresh_balances().await;
        Ok(Some(session))
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                log::warn!("Failed to clear stored session: {}", err);
            }
        }
        log::info!("Wallet disconnected");
    }

    /// Rescan balances for the current session. Returns whether the result
    /// was applied; it is dropped if a newer scan or a disconnect won.
    pub async fn refresh_balances(&self) -> bool {
        let Some((ticket, session)) = self.session.begin_scan() else {
            return false;
        };
        let balances = scan_balances(&self.provider, &session.address, session.network.as_ref()).await;
        self.session.apply_scan(ticket, balances)
    }

    /// Wait for `delay`, then rescan once.
    pub async fn refresh_after<F>(&self, delay: F) -> bool
    where
        F: Future<Output = ()>,
    {
        delay.await;
        self.refresh_balances().await
    }

    #[cfg(feature = "native")]
    pub async fn refresh_after_delay(&self) -> bool {
        self.refresh_after(tokio::time::sleep(self.rescan_delay)).await
    }

    /// EIP-1193 `chainChanged`.
    pub async fn handle_chain_changed(&self, chain_id: &str) -> Option<WalletSession> {
        let session = self.session.update_network(chain_id)?;
        log::info!("Wallet switched to chain {}", chain_id);
        self.persist(&session);
        self.refresh_balances().await;
        Some(session)
    }

    /// EIP-1193 `accountsChanged`. An empty list means the wallet revoked access.
    pub async fn handle_accounts_changed(&self, accounts: &[String]) -> Option<WalletSession> {
        let Some(address) = accounts.first() else {
            self.disconnect();
            return None;
        };

        let current = self.session.session()?;
        if current.address.eq_ignore_ascii_case(address) {
            return Some(current);
        }

        let session = self.session.update_address(address)?;
        log::info!("Wallet switched to account {}", session.address);
        self.persist(&session);
        self.refresh_balances().await;
        Some(session)
    }

    pub fn select_token(&self, key: Option<&str>) -> WalletResult<()> {
        self.session.select_token(key)
    }

    pub fn set_amount(&self, amount: &str) {
        self.session.set_amount(amount);
    }

    pub fn use_max_amount(&self) -> WalletResult<String> {
        self.session.use_max_amount()
    }

    /// Submit the current selection and amount to the network's recipient.
    /// Errors only when no session is connected or a donation is already
    /// pending; everything else is reported in the outcome.
    pub async fn donate(&self) -> WalletResult<TransferOutcome> {
        let (session, request) = self.session.begin_submit()?;
        let outcome = transfer::submit(&self.provider, &session, &request).await;
        self.session.finish_submit(session.session_id, outcome.clone());
        Ok(outcome)
    }

    fn persist(&self, session: &WalletSession) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&StoredSession::from_session(session)) {
                log::warn!("Failed to persist session: {}", err);
            }
        }
    }
}
