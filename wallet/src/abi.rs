//! Minimal ERC-20 ABI encoding for the two calls the donation flow makes:
//! `balanceOf(address)` and `transfer(address,uint256)`.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::errors::{WalletError, WalletResult};
use crate::validation::InputValidator;

pub const WORD_SIZE: usize = 32;

/// `keccak256("balanceOf(address)")[..4]`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// `keccak256("transfer(address,uint256)")[..4]`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Compute the 4-byte selector of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Left-pad a 20-byte address into a 32-byte ABI word.
pub fn encode_address(address: &str) -> WalletResult<[u8; WORD_SIZE]> {
    InputValidator::validate_address(address)?;
    let bytes = hex::decode(&address[2..])
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;

    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

pub fn encode_uint256(value: U256) -> [u8; WORD_SIZE] {
    value.to_be_bytes::<WORD_SIZE>()
}

/// Selector followed by the argument words, as `0x`-prefixed lowercase hex.
pub fn encode_function_call(selector: [u8; 4], args: &[[u8; WORD_SIZE]]) -> String {
    let mut data = Vec::with_capacity(4 + args.len() * WORD_SIZE);
    data.extend_from_slice(&selector);
    for word in args {
        data.extend_from_slice(word);
    }
    format!("0x{}", hex::encode(data))
}

pub fn encode_balance_of(owner: &str) -> WalletResult<String> {
    Ok(encode_function_call(
        BALANCE_OF_SELECTOR,
        &[encode_address(owner)?],
    ))
}

pub fn encode_transfer(recipient: &str, amount: U256) -> WalletResult<String> {
    Ok(encode_function_call(
        TRANSFER_SELECTOR,
        &[encode_address(recipient)?, encode_uint256(amount)],
    ))
}

/// Decode a single uint256 return value from an `eth_call` result.
///
/// Only the first word is read; results longer than one word are tolerated.
pub fn decode_uint256(result: &str) -> WalletResult<U256> {
    let bytes = decode_hex_payload(result)?;
    if bytes.is_empty() {
        return Err(WalletError::InvalidResponse(
            "Empty call result".to_string(),
        ));
    }

    let word = if bytes.len() > WORD_SIZE {
        &bytes[..WORD_SIZE]
    } else {
        &bytes[..]
    };

    U256::try_from_be_slice(word)
        .ok_or_else(|| WalletError::InvalidResponse("uint256 out of range".to_string()))
}

/// Inverse of [`encode_transfer`]: returns the lowercase recipient and amount.
pub fn decode_transfer(data: &str) -> WalletResult<(String, U256)> {
    let bytes = decode_hex_payload(data)?;
    if bytes.len() != 4 + 2 * WORD_SIZE {
        return Err(WalletError::InvalidResponse(format!(
            "transfer calldata must be {} bytes, got {}",
            4 + 2 * WORD_SIZE,
            bytes.len()
        )));
    }
    if bytes[..4] != TRANSFER_SELECTOR {
        return Err(WalletError::InvalidResponse(
            "calldata is not an ERC-20 transfer".to_string(),
        ));
    }

    let address_word = &bytes[4..4 + WORD_SIZE];
    if address_word[..12].iter().any(|b| *b != 0) {
        return Err(WalletError::InvalidResponse(
            "address word has dirty high bytes".to_string(),
        ));
    }
    let recipient = format!("0x{}", hex::encode(&address_word[12..]));
    let amount = U256::from_be_slice(&bytes[4 + WORD_SIZE..]);
    Ok((recipient, amount))
}

fn decode_hex_payload(payload: &str) -> WalletResult<Vec<u8>> {
    let digits = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidResponse(format!("Expected 0x-prefixed hex: {}", payload)))?;

    if digits.len() % 2 == 1 {
        // eth_call results are byte strings, but some nodes trim a leading nibble
        return hex::decode(format!("0{}", digits))
            .map_err(|e| WalletError::InvalidResponse(format!("Invalid hex payload: {}", e)));
    }

    hex::decode(digits)
        .map_err(|e| WalletError::InvalidResponse(format!("Invalid hex payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLDER: &str = "0x1111111111111111111111111111111111111111";
    const RECIPIENT: &str = "0x7Ec3C1f8b2D4aA51C7f6E3B9a8d05c2F4E1b9A63";

    #[test]
    fn selector_constants_match_keccak() {
        assert_eq!(selector("balanceOf(address)"), BALANCE_OF_SELECTOR);
        assert_eq!(selector("transfer(address,uint256)"), TRANSFER_SELECTOR);
    }

    #[test]
    fn balance_of_calldata_layout() {
        let data = encode_balance_of(HOLDER).unwrap();
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.starts_with("0x70a08231"));
        assert!(data.ends_with(&format!("{:0>64}", &HOLDER[2..])));
    }

    #[test]
    fn transfer_calldata_layout() {
        let data = encode_transfer(RECIPIENT, U256::from(5_000_000u64)).unwrap();
        assert!(data.starts_with("0xa9059cbb"));
        let body = &data[10..];
        assert_eq!(&body[..64], format!("{:0>64}", RECIPIENT[2..].to_lowercase()));
        assert_eq!(&body[64..], format!("{:0>64}", "4c4b40"));
    }

    #[test]
    fn transfer_round_trip() {
        let amount = U256::from(123_456_789_000u64);
        let data = encode_transfer(RECIPIENT, amount).unwrap();
        let (to, decoded) = decode_transfer(&data).unwrap();
        assert_eq!(to, RECIPIENT.to_lowercase());
        assert_eq!(decoded, amount);
    }

    #[test]
    fn decode_uint256_accepts_word_and_short_results() {
        let word = format!("0x{}", hex::encode(encode_uint256(U256::from(42u64))));
        assert_eq!(decode_uint256(&word).unwrap(), U256::from(42u64));
        assert_eq!(decode_uint256("0x2a").unwrap(), U256::from(42u64));
        assert_eq!(decode_uint256("0x0").unwrap(), U256::ZERO);
    }

    #[test]
    fn decode_uint256_rejects_empty_and_garbage() {
        assert!(decode_uint256("0x").is_err());
        assert!(decode_uint256("nothex").is_err());
        assert!(decode_uint256("0xgg").is_err());
    }

    #[test]
    fn invalid_address_is_rejected_before_encoding() {
        assert!(matches!(
            encode_balance_of("0x1234"),
            Err(WalletError::InvalidAddress(_))
        ));
    }
}
