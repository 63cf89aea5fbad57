use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::abi;
use crate::amount::TokenAmount;
use crate::catalog::{catalog_for, TokenCatalogEntry};
use crate::errors::WalletResult;
use crate::network::NetworkDescriptor;
use crate::provider::{CallRequest, WalletProvider};

/// A positive balance discovered for the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub symbol: String,
    pub display_name: String,
    pub icon: String,
    pub human_readable_balance: String,
    pub decimals: u8,
    #[serde(default)]
    pub contract_address: Option<String>,
    pub is_native: bool,
}

impl TokenBalance {
    pub const NATIVE_KEY: &'static str = "native";

    fn native(network: &NetworkDescriptor, amount: &TokenAmount) -> Self {
        Self {
            symbol: network.native_currency_symbol.to_string(),
            display_name: network.native_currency_name.to_string(),
            icon: network.icon.to_string(),
            human_readable_balance: amount.to_decimal_string(),
            decimals: amount.decimals(),
            contract_address: None,
            is_native: true,
        }
    }

    fn token(entry: &TokenCatalogEntry, amount: &TokenAmount) -> Self {
        Self {
            symbol: entry.symbol.to_string(),
            display_name: entry.display_name.to_string(),
            icon: entry.icon.to_string(),
            human_readable_balance: amount.to_decimal_string(),
            decimals: entry.decimals,
            contract_address: Some(entry.contract_address.to_string()),
            is_native: false,
        }
    }

    /// Selection key: `"native"` or the lowercase contract address.
    pub fn key(&self) -> String {
        match &self.contract_address {
            Some(contract) if !self.is_native => contract.to_lowercase(),
            _ => Self::NATIVE_KEY.to_string(),
        }
    }

    /// The balance back in smallest units.
    pub fn amount(&self) -> WalletResult<TokenAmount> {
        TokenAmount::parse(&self.human_readable_balance, self.decimals)
    }
}

/// Discover the native balance and every catalog token balance for `address`.
///
/// Reads are dispatched together and each one is settled independently: a
/// failed read is logged and counted as zero. The result holds positive
/// balances only, native first, then catalog order. Never fails.
pub async fn scan_balances<P>(
    provider: &P,
    address: &str,
    network: Option<&NetworkDescriptor>,
) -> Vec<TokenBalance>
where
    P: WalletProvider + ?Sized,
{
    let Some(network) = network else {
        log::debug!("Skipping balance scan for {}: unsupported network", address);
        return Vec::new();
    };

    let catalog = catalog_for(network.chain_id);
    let native = read_native(provider, address, network);
    let tokens = join_all(
        catalog
            .iter()
            .map(|entry| read_token(provider, address, entry)),
    );
    let (native, tokens) = futures::join!(native, tokens);

    let mut balances = Vec::with_capacity(1 + catalog.len());
    balances.extend(native);
    balances.extend(tokens.into_iter().flatten());

    log::info!(
        "Balance scan on {} for {} found {} positive balance(s)",
        network.name,
        address,
        balances.len()
    );
    balances
}

async fn read_native<P>(
    provider: &P,
    address: &str,
    network: &NetworkDescriptor,
) -> Option<TokenBalance>
where
    P: WalletProvider + ?Sized,
{
    let result: WalletResult<TokenAmount> = async {
        let quantity = provider.native_balance(address).await?;
        TokenAmount::from_hex_quantity(&quantity, network.native_decimals)
    }
    .await;

    match result {
        Ok(amount) if !amount.is_zero() => Some(TokenBalance::native(network, &amount)),
        Ok(_) => None,
        Err(err) => {
            log::warn!(
                "Native {} balance read failed, treating as zero: {}",
                network.native_currency_symbol,
                err
            );
            None
        }
    }
}

async fn read_token<P>(
    provider: &P,
    address: &str,
    entry: &TokenCatalogEntry,
) -> Option<TokenBalance>
where
    P: WalletProvider + ?Sized,
{
    let result: WalletResult<TokenAmount> = async {
        let request = CallRequest {
            to: entry.contract_address.to_string(),
            data: abi::encode_balance_of(address)?,
        };
        let raw = abi::decode_uint256(&provider.call(&request).await?)?;
        TokenAmount::from_raw(raw, entry.decimals)
    }
    .await;

    match result {
        Ok(amount) if !amount.is_zero() => Some(TokenBalance::token(entry, &amount)),
        Ok(_) => None,
        Err(err) => {
            log::warn!(
                "{} balance read at {} failed, treating as zero: {}",
                entry.symbol,
                entry.contract_address,
                err
            );
            None
        }
    }
}
