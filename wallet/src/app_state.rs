use std::path::PathBuf;
use std::sync::Arc;

use crate::config_store::{ConfigStore, DonationConfig};
use crate::controller::DonationController;
use crate::errors::WalletResult;
use crate::provider::WalletProvider;
use crate::session_store::{FileSessionStore, SessionStore};
use crate::storage::WalletPaths;

pub const ENV_WALLET_ENV: &str = "TIPJAR_WALLET_ENV";

/// On-disk state for a native donation client: paths, stored config and the
/// session file.
#[derive(Debug)]
pub struct DonationContext {
    paths: WalletPaths,
    config_store: ConfigStore,
    config: DonationConfig,
    environment: String,
}

impl DonationContext {
    pub fn initialize(root_dir: PathBuf) -> WalletResult<Self> {
        let environment =
            std::env::var(ENV_WALLET_ENV).unwrap_or_else(|_| "development".to_string());
        let paths = WalletPaths::new(&root_dir)?;
        paths.ensure_directories()?;

        let config_store = ConfigStore::from_paths(&paths);
        let mut config = config_store.load_or_default(environment.clone())?;
        config.apply_env_overrides();
        log::info!(
            "Donation context ready in {} ({} environment, endpoint {})",
            paths.root_dir().display(),
            environment,
            config.rpc.endpoint
        );

        Ok(Self {
            paths,
            config_store,
            config,
            environment,
        })
    }

    pub fn config(&self) -> &DonationConfig {
        &self.config
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn paths(&self) -> &WalletPaths {
        &self.paths
    }

    /// Persist a config change. Environment overrides are re-applied to the
    /// in-memory copy but never written to disk.
    pub fn update_config<F>(&mut self, updater: F) -> WalletResult<DonationConfig>
    where
        F: FnOnce(&mut DonationConfig) -> WalletResult<()>,
    {
        let updated = self
            .config_store
            .update(self.environment.clone(), updater)?;
        let mut effective = updated.clone();
        effective.apply_env_overrides();
        self.config = effective;
        Ok(updated)
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::new(FileSessionStore::from_paths(&self.paths))
    }

    pub fn build_controller<P: WalletProvider>(&self, provider: P) -> DonationController<P> {
        DonationController::from_config(provider, &self.config, Some(self.session_store()))
    }
}
