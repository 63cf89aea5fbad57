use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::abi;
use crate::amount::TokenAmount;
use crate::errors::{ErrorKind, WalletError, WalletResult};
use crate::provider::{TransactionRequest, WalletProvider};
use crate::scanner::TokenBalance;
use crate::session::WalletSession;
use crate::validation::InputValidator;

/// Result of one donation submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransferOutcome {
    Submitted {
        #[serde(rename = "txId")]
        tx_id: String,
    },
    Failed {
        #[serde(rename = "errorKind")]
        error_kind: ErrorKind,
        message: String,
    },
}

impl TransferOutcome {
    pub fn failed(error: &WalletError) -> Self {
        TransferOutcome::Failed {
            error_kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, TransferOutcome::Submitted { .. })
    }
}

/// What the user asked to donate, captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub selected_token: Option<TokenBalance>,
    pub amount: String,
    pub recipient: Option<String>,
}

impl TransferRequest {
    pub fn validate(&self) -> WalletResult<PreparedTransfer> {
        validate_transfer(
            self.selected_token.as_ref(),
            &self.amount,
            self.recipient.as_deref(),
        )
    }
}

/// A transfer that passed validation, with the amount in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    pub token: TokenBalance,
    pub amount: TokenAmount,
    pub recipient: String,
}

/// Check a requested donation. Checks run in a fixed order and the first
/// failure is returned: amount, token selection, balance, recipient.
pub fn validate_transfer(
    selected_token: Option<&TokenBalance>,
    amount: &str,
    recipient: Option<&str>,
) -> WalletResult<PreparedTransfer> {
    InputValidator::validate_amount(amount)?;

    let token = selected_token.ok_or(WalletError::NoTokenSelected)?;

    let requested = TokenAmount::parse(amount, token.decimals)?;
    let available = token.amount()?;
    if requested.cmp_same_token(&available)? == Ordering::Greater {
        return Err(WalletError::InsufficientBalance(format!(
            "requested {} {} but only {} available",
            requested, token.symbol, available
        )));
    }

    let recipient = recipient
        .ok_or_else(|| WalletError::NoRecipient("no recipient for this network".to_string()))?;
    if !InputValidator::is_evm_address(recipient) {
        return Err(WalletError::NoRecipient(format!(
            "recipient {} is not an EVM address",
            recipient
        )));
    }

    Ok(PreparedTransfer {
        token: token.clone(),
        amount: requested,
        recipient: recipient.to_string(),
    })
}

/// Native transfers carry `value` only; token transfers carry `transfer` calldata only.
pub fn build_transaction(from: &str, prepared: &PreparedTransfer) -> WalletResult<TransactionRequest> {
    if prepared.token.is_native {
        return Ok(TransactionRequest {
            from: from.to_string(),
            to: prepared.recipient.clone(),
            value: Some(prepared.amount.to_hex_quantity()),
            data: None,
        });
    }

    let contract = prepared.token.contract_address.clone().ok_or_else(|| {
        WalletError::InvalidState(format!(
            "token {} has no contract address",
            prepared.token.symbol
        ))
    })?;

    Ok(TransactionRequest {
        from: from.to_string(),
        to: contract,
        value: None,
        data: Some(abi::encode_transfer(
            &prepared.recipient,
            prepared.amount.raw(),
        )?),
    })
}

/// Validate, build and submit a donation. Validation failures never reach
/// the provider; provider failures are reported, not retried.
pub async fn transfer<P>(
    provider: &P,
    session: &WalletSession,
    selected_token: Option<&TokenBalance>,
    amount: &str,
    recipient: Option<&str>,
) -> TransferOutcome
where
    P: WalletProvider + ?Sized,
{
    let request = TransferRequest {
        selected_token: selected_token.cloned(),
        amount: amount.to_string(),
        recipient: recipient.map(str::to_string),
    };
    submit(provider, session, &request).await
}

/// Submit a captured request. See [`transfer`].
pub async fn submit<P>(provider: &P, session: &WalletSession, request: &TransferRequest) -> TransferOutcome
where
    P: WalletProvider + ?Sized,
{
    let request = match request
        .validate()
        .and_then(|prepared| build_transaction(&session.address, &prepared))
    {
        Ok(request) => request,
        Err(err) if err.is_validation() => {
            log::debug!("Donation rejected locally: {}", err);
            return TransferOutcome::failed(&err);
        }
        Err(err) => {
            log::warn!("Donation could not be built: {}", err);
            return TransferOutcome::failed(&err);
        }
    };

    match provider.send_transaction(&request).await {
        Ok(tx_id) => {
            log::info!("Donation submitted from {}: {}", session.address, tx_id);
            TransferOutcome::Submitted { tx_id }
        }
        Err(err) => {
            log::warn!("Donation from {} failed: {}", session.address, err);
            TransferOutcome::failed(&err)
        }
    }
}
