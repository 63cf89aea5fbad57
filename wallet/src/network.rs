use serde::Serialize;

/// Address encoding a network's accounts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressFormat {
    Evm,
    Solana,
}

/// Display metadata for a supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub chain_id: &'static str,
    pub name: &'static str,
    pub native_currency_symbol: &'static str,
    pub native_currency_name: &'static str,
    pub icon: &'static str,
    pub native_decimals: u8,
    pub address_format: AddressFormat,
}

impl NetworkDescriptor {
    pub fn chain_id_number(&self) -> Option<u64> {
        parse_chain_id(self.chain_id)
    }
}

pub const NETWORKS: [NetworkDescriptor; 6] = [
    NetworkDescriptor {
        chain_id: "0x1",
        name: "Ethereum",
        native_currency_symbol: "ETH",
        native_currency_name: "Ether",
        icon: "/icons/networks/ethereum.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
    NetworkDescriptor {
        chain_id: "0x38",
        name: "BNB Smart Chain",
        native_currency_symbol: "BNB",
        native_currency_name: "BNB",
        icon: "/icons/networks/bsc.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
    NetworkDescriptor {
        chain_id: "0x89",
        name: "Polygon",
        native_currency_symbol: "POL",
        native_currency_name: "Polygon Ecosystem Token",
        icon: "/icons/networks/polygon.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
    NetworkDescriptor {
        chain_id: "0xa",
        name: "Optimism",
        native_currency_symbol: "ETH",
        native_currency_name: "Ether",
        icon: "/icons/networks/optimism.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
    NetworkDescriptor {
        chain_id: "0xa4b1",
        name: "Arbitrum One",
        native_currency_symbol: "ETH",
        native_currency_name: "Ether",
        icon: "/icons/networks/arbitrum.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
    NetworkDescriptor {
        chain_id: "0x2105",
        name: "Base",
        native_currency_symbol: "ETH",
        native_currency_name: "Ether",
        icon: "/icons/networks/base.svg",
        native_decimals: 18,
        address_format: AddressFormat::Evm,
    },
];

/// Parse a provider-reported chain id. Hex (`0x`-prefixed) is the EIP-1193
/// form; bare decimal is accepted for node configs.
pub fn parse_chain_id(chain_id: &str) -> Option<u64> {
    let chain_id = chain_id.trim();
    match chain_id
        .strip_prefix("0x")
        .or_else(|| chain_id.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => chain_id.parse().ok(),
    }
}

/// Look up a chain id in the built-in table. Unknown or malformed ids
/// resolve to `None`.
pub fn resolve_network(chain_id: &str) -> Option<NetworkDescriptor> {
    let wanted = parse_chain_id(chain_id)?;
    NETWORKS
        .iter()
        .find(|network| network.chain_id_number() == Some(wanted))
        .copied()
}

pub fn supported_networks() -> &'static [NetworkDescriptor] {
    &NETWORKS
}
