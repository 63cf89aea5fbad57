use crate::errors::{WalletError, WalletResult};
use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX][a-fA-F0-9]{40}$").expect("address regex must compile"));

static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(\.\d*)?|\.\d+)$").expect("amount regex must compile")
});

/// Input validation for addresses and user-entered amounts.
pub struct InputValidator;

impl InputValidator {
    /// Validate a 20-byte hex EVM address. Checksum casing is not enforced.
    pub fn validate_address(address: &str) -> WalletResult<()> {
        if address.is_empty() {
            return Err(WalletError::InvalidAddress(
                "Address cannot be empty".to_string(),
            ));
        }

        if !ADDRESS_PATTERN.is_match(address) {
            return Err(WalletError::InvalidAddress(format!(
                "Address format is invalid: {}",
                address
            )));
        }

        Ok(())
    }

    pub fn is_evm_address(address: &str) -> bool {
        ADDRESS_PATTERN.is_match(address)
    }

    /// Validate that an amount string is a plain, strictly positive decimal number.
    pub fn validate_amount(amount: &str) -> WalletResult<()> {
        let amount = amount.trim();
        if amount.is_empty() {
            return Err(WalletError::InvalidAmount(
                "Amount cannot be empty".to_string(),
            ));
        }

        if !AMOUNT_PATTERN.is_match(amount) {
            return Err(WalletError::InvalidAmount(format!(
                "Amount format is invalid: {}",
                amount
            )));
        }

        if !amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
            return Err(WalletError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_case_addresses() {
        assert!(InputValidator::validate_address("0xdAC17F958D2ee523a2206206994597C13D831ec7").is_ok());
        assert!(InputValidator::validate_address("0xdac17f958d2ee523a2206206994597c13d831ec7").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "0x1234", "dac17f958d2ee523a2206206994597c13d831ec7", "0xZZC17F958D2ee523a2206206994597C13D831ec7"] {
            assert!(matches!(
                InputValidator::validate_address(bad),
                Err(WalletError::InvalidAddress(_))
            ));
        }
    }

    #[test]
    fn positive_amounts_pass() {
        for ok in ["1", "0.1", "2.0", ".5", "10.", " 3 ", "0.000000000000000001"] {
            assert!(InputValidator::validate_amount(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn zero_negative_and_garbage_fail() {
        for bad in ["", "0", "0.000", "-1", "abc", "1e5", "1.2.3", ".", "1,5"] {
            assert!(
                matches!(InputValidator::validate_amount(bad), Err(WalletError::InvalidAmount(_))),
                "{bad}"
            );
        }
    }
}
