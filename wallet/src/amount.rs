//! Exact conversion between human-readable decimal amounts and on-chain
//! smallest units.
//!
//! All arithmetic is done on `U256` integers; floating point is never used, so
//! a value survives decimal -> smallest unit -> decimal without drift.

use std::cmp::Ordering;
use std::fmt;

use alloy_primitives::U256;

use crate::errors::{WalletError, WalletResult};
use crate::validation::InputValidator;

/// Largest decimals value a `U256` scale factor can hold (10^77 < 2^256).
pub const MAX_DECIMALS: u8 = 77;

/// An amount in a token's smallest unit together with the token's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn from_raw(raw: U256, decimals: u8) -> WalletResult<Self> {
        if decimals > MAX_DECIMALS {
            return Err(WalletError::InvalidAmount(format!(
                "Unsupported decimals: {}",
                decimals
            )));
        }
        Ok(Self { raw, decimals })
    }

    pub fn zero(decimals: u8) -> WalletResult<Self> {
        Self::from_raw(U256::ZERO, decimals)
    }

    /// Parse a decimal string such as `"1.5"` into smallest units.
    ///
    /// Trailing fractional zeros are ignored; any remaining fractional digits
    /// beyond `decimals` cannot be represented and are rejected.
    pub fn parse(amount: &str, decimals: u8) -> WalletResult<Self> {
        let amount = amount.trim();
        InputValidator::validate_amount(amount).or_else(|err| {
            // Zero is a valid amount to parse; positivity is the caller's check.
            if is_zero_literal(amount) {
                Ok(())
            } else {
                Err(err)
            }
        })?;

        let (whole_str, frac_str) = match amount.split_once('.') {
            Some((whole, frac)) => (whole, frac.trim_end_matches('0')),
            None => (amount, ""),
        };

        if frac_str.len() > decimals as usize {
            return Err(WalletError::InvalidAmount(format!(
                "Too many decimal places for a token with {} decimals",
                decimals
            )));
        }

        let scale = pow10(decimals)?;
        let whole = if whole_str.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole_str, 10)
                .map_err(|_| WalletError::InvalidAmount("Invalid integer part".to_string()))?
        };

        let fractional = if frac_str.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
            U256::from_str_radix(&padded, 10)
                .map_err(|_| WalletError::InvalidAmount("Invalid fractional part".to_string()))?
        };

        let raw = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(fractional))
            .ok_or_else(|| WalletError::InvalidAmount("Amount overflow".to_string()))?;

        Self::from_raw(raw, decimals)
    }

    /// Decode a JSON-RPC hex quantity (`0x...`) in smallest units.
    pub fn from_hex_quantity(quantity: &str, decimals: u8) -> WalletResult<Self> {
        let digits = quantity
            .strip_prefix("0x")
            .or_else(|| quantity.strip_prefix("0X"))
            .ok_or_else(|| {
                WalletError::InvalidResponse(format!("Expected hex quantity, got {}", quantity))
            })?;

        if digits.is_empty() {
            return Err(WalletError::InvalidResponse(
                "Empty hex quantity".to_string(),
            ));
        }

        let raw = U256::from_str_radix(digits, 16).map_err(|e| {
            WalletError::InvalidResponse(format!("Invalid hex quantity {}: {}", quantity, e))
        })?;

        Self::from_raw(raw, decimals)
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// JSON-RPC hex quantity: lowercase, no leading zeros, `0x0` for zero.
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.raw)
    }

    /// Full-precision decimal string with trailing fractional zeros removed.
    pub fn to_decimal_string(&self) -> String {
        // decimals <= MAX_DECIMALS is enforced at construction
        let scale = match pow10(self.decimals) {
            Ok(scale) => scale,
            Err(_) => return self.raw.to_string(),
        };
        let whole = self.raw / scale;
        let fractional = self.raw % scale;

        if fractional.is_zero() {
            whole.to_string()
        } else {
            let frac_str = format!(
                "{:0>width$}",
                fractional.to_string(),
                width = self.decimals as usize
            );
            format!("{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }

    /// Compare against another amount of the same token.
    pub fn cmp_same_token(&self, other: &TokenAmount) -> WalletResult<Ordering> {
        if self.decimals != other.decimals {
            return Err(WalletError::InvalidAmount(format!(
                "Cannot compare amounts with {} and {} decimals",
                self.decimals, other.decimals
            )));
        }
        Ok(self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

fn is_zero_literal(amount: &str) -> bool {
    !amount.is_empty()
        && amount.chars().all(|c| c == '0' || c == '.')
        && amount.chars().filter(|c| *c == '.').count() <= 1
        && amount.chars().any(|c| c == '0')
}

fn pow10(decimals: u8) -> WalletResult<U256> {
    let ten = U256::from(10u64);
    let mut value = U256::from(1u64);
    for _ in 0..decimals {
        value = value
            .checked_mul(ten)
            .ok_or_else(|| WalletError::InvalidAmount("Decimals overflow".to_string()))?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_smallest_units() {
        let amount = TokenAmount::parse("0.1", 18).unwrap();
        assert_eq!(amount.raw(), U256::from(100_000_000_000_000_000u64));
        assert_eq!(amount.to_hex_quantity(), "0x16345785d8a0000");

        let usdc = TokenAmount::parse("5", 6).unwrap();
        assert_eq!(usdc.raw(), U256::from(5_000_000u64));
    }

    #[test]
    fn trailing_zeros_beyond_decimals_are_accepted() {
        let amount = TokenAmount::parse("2.500000000", 6).unwrap();
        assert_eq!(amount.raw(), U256::from(2_500_000u64));
    }

    #[test]
    fn excess_precision_rejected() {
        let err = TokenAmount::parse("0.0000001", 6).unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
    }

    #[test]
    fn zero_parses_but_garbage_does_not() {
        assert!(TokenAmount::parse("0.0", 18).unwrap().is_zero());
        assert!(TokenAmount::parse("-1", 18).is_err());
        assert!(TokenAmount::parse("1.2.3", 18).is_err());
    }

    #[test]
    fn hex_quantity_decodes_and_formats() {
        let balance = TokenAmount::from_hex_quantity("0x1bc16d674ec80000", 18).unwrap();
        assert_eq!(balance.to_decimal_string(), "2");

        let small = TokenAmount::from_hex_quantity("0x1", 18).unwrap();
        assert_eq!(small.to_decimal_string(), "0.000000000000000001");

        assert_eq!(TokenAmount::zero(18).unwrap().to_hex_quantity(), "0x0");
    }

    #[test]
    fn malformed_hex_quantity_is_invalid_response() {
        for bad in ["", "0x", "12", "0xzz"] {
            assert!(matches!(
                TokenAmount::from_hex_quantity(bad, 18),
                Err(WalletError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn decimal_string_round_trips_without_drift() {
        for (text, decimals) in [("1.5", 18), ("123456.123456", 6), ("0.333333333333333333", 18), ("7", 0)] {
            let parsed = TokenAmount::parse(text, decimals).unwrap();
            assert_eq!(parsed.to_decimal_string(), text);
            let via_hex = TokenAmount::from_hex_quantity(&parsed.to_hex_quantity(), decimals).unwrap();
            assert_eq!(via_hex, parsed);
        }
    }

    #[test]
    fn comparison_requires_matching_decimals() {
        let a = TokenAmount::parse("2.0", 6).unwrap();
        let b = TokenAmount::parse("1.5", 6).unwrap();
        assert_eq!(a.cmp_same_token(&b).unwrap(), Ordering::Greater);
        assert!(a.cmp_same_token(&TokenAmount::parse("1", 18).unwrap()).is_err());
    }
}
