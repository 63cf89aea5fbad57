use serde::Serialize;

use crate::network::parse_chain_id;

/// A fungible token the widget checks balances for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCatalogEntry {
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub contract_address: &'static str,
    pub decimals: u8,
    pub icon: &'static str,
}

const fn token(
    symbol: &'static str,
    display_name: &'static str,
    contract_address: &'static str,
    decimals: u8,
    icon: &'static str,
) -> TokenCatalogEntry {
    TokenCatalogEntry {
        symbol,
        display_name,
        contract_address,
        decimals,
        icon,
    }
}

const USDT_ICON: &str = "/icons/tokens/usdt.svg";
const USDC_ICON: &str = "/icons/tokens/usdc.svg";
const DAI_ICON: &str = "/icons/tokens/dai.svg";

const ETHEREUM_TOKENS: [TokenCatalogEntry; 3] = [
    token("USDT", "Tether USD", "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6, USDT_ICON),
    token("USDC", "USD Coin", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, USDC_ICON),
    token("DAI", "Dai Stablecoin", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18, DAI_ICON),
];

const BSC_TOKENS: [TokenCatalogEntry; 3] = [
    token("USDT", "Tether USD", "0x55d398326f99059fF775485246999027B3197955", 18, USDT_ICON),
    token("USDC", "USD Coin", "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d", 18, USDC_ICON),
    token("BUSD", "Binance USD", "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56", 18, "/icons/tokens/busd.svg"),
];

const POLYGON_TOKENS: [TokenCatalogEntry; 3] = [
    token("USDT", "Tether USD", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F", 6, USDT_ICON),
    token("USDC", "USD Coin", "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359", 6, USDC_ICON),
    token("DAI", "Dai Stablecoin", "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063", 18, DAI_ICON),
];

const OPTIMISM_TOKENS: [TokenCatalogEntry; 3] = [
    token("USDT", "Tether USD", "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58", 6, USDT_ICON),
    token("USDC", "USD Coin", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85", 6, USDC_ICON),
    token("OP", "Optimism", "0x4200000000000000000000000000000000000042", 18, "/icons/tokens/op.svg"),
];

const ARBITRUM_TOKENS: [TokenCatalogEntry; 3] = [
    token("USDT", "Tether USD", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", 6, USDT_ICON),
    token("USDC", "USD Coin", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", 6, USDC_ICON),
    token("ARB", "Arbitrum", "0x912CE59144191C1204E64559FE8253a0e49E6548", 18, "/icons/tokens/arb.svg"),
];

const BASE_TOKENS: [TokenCatalogEntry; 2] = [
    token("USDC", "USD Coin", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", 6, USDC_ICON),
    token("DAI", "Dai Stablecoin", "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb", 18, DAI_ICON),
];

/// Tokens registered for a chain, in declaration order. Unknown chains have none.
pub fn catalog_for(chain_id: &str) -> &'static [TokenCatalogEntry] {
    match parse_chain_id(chain_id) {
        Some(1) => &ETHEREUM_TOKENS,
        Some(56) => &BSC_TOKENS,
        Some(137) => &POLYGON_TOKENS,
        Some(10) => &OPTIMISM_TOKENS,
        Some(42161) => &ARBITRUM_TOKENS,
        Some(8453) => &BASE_TOKENS,
        _ => &[],
    }
}
