use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::{WalletError, WalletResult};
use crate::network::{resolve_network, NetworkDescriptor};
use crate::recipient::recipient_for;
use crate::scanner::TokenBalance;
use crate::transfer::{TransferOutcome, TransferRequest};

/// The connected account. Either fully present or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub session_id: u64,
    pub address: String,
    pub network: Option<NetworkDescriptor>,
}

impl WalletSession {
    pub fn recipient(&self) -> Option<&'static str> {
        recipient_for(self.network.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationPhase {
    Disconnected,
    Connecting,
    Connected,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notice {
    UnsupportedNetwork {
        #[serde(rename = "chainId")]
        chain_id: String,
    },
}

/// Everything the widget needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub phase: DonationPhase,
    pub session: Option<WalletSession>,
    pub balances: Vec<TokenBalance>,
    pub selected_token: Option<String>,
    pub amount: String,
    pub notice: Option<Notice>,
    pub last_outcome: Option<TransferOutcome>,
}

/// Identifies one scan request. A result is applied only while its ticket
/// is the latest one issued for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
    pub generation: u64,
    pub session_id: u64,
}

#[derive(Debug)]
struct DonationState {
    phase: DonationPhase,
    session: Option<WalletSession>,
    balances: Vec<TokenBalance>,
    selected: Option<String>,
    amount: String,
    notice: Option<Notice>,
    last_outcome: Option<TransferOutcome>,
    scan_generation: u64,
    next_session_id: u64,
}

impl Default for DonationState {
    fn default() -> Self {
        Self {
            phase: DonationPhase::Disconnected,
            session: None,
            balances: Vec::new(),
            selected: None,
            amount: String::new(),
            notice: None,
            last_outcome: None,
            scan_generation: 0,
            next_session_id: 1,
        }
    }
}

impl DonationState {
    fn clear_flow(&mut self) {
        self.session = None;
        self.balances.clear();
        self.selected = None;
        self.amount.clear();
        self.notice = None;
        self.last_outcome = None;
        // Invalidate any scan still in flight.
        self.scan_generation += 1;
    }

    fn issue_session_id(&mut self) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        id
    }

    fn set_network(&mut self, chain_id: &str) -> Option<NetworkDescriptor> {
        let network = resolve_network(chain_id);
        self.notice = match network {
            Some(_) => None,
            None => Some(Notice::UnsupportedNetwork {
                chain_id: chain_id.to_string(),
            }),
        };
        network
    }

    fn selected_balance(&self) -> Option<&TokenBalance> {
        let key = self.selected.as_deref()?;
        self.balances.iter().find(|balance| balance.key() == key)
    }
}

/// Owns the donation flow state: session, balances, selection and the
/// phase machine `Disconnected -> Connecting -> Connected <-> Submitting`.
///
/// The lock is never held across an `.await`; callers take a snapshot, do
/// their async work, then report back.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    state: Arc<RwLock<DonationState>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DonationPhase {
        self.state.read().phase
    }

    pub fn session(&self) -> Option<WalletSession> {
        self.state.read().session.clone()
    }

    pub fn balances(&self) -> Vec<TokenBalance> {
        self.state.read().balances.clone()
    }

    /// Enter `Connecting`. Any previous session is dropped first.
    pub fn begin_connect(&self) -> WalletResult<()> {
        let mut state = self.state.write();
        match state.phase {
            DonationPhase::Connecting | DonationPhase::Submitting => {
                Err(WalletError::InvalidState(format!(
                    "cannot connect while {:?}",
                    state.phase
                )))
            }
            DonationPhase::Disconnected | DonationPhase::Connected => {
                state.clear_flow();
                state.phase = DonationPhase::Connecting;
                Ok(())
            }
        }
    }

    /// Finish a connect attempt. Fails if the attempt was cancelled by a
    /// disconnect in the meantime.
    pub fn complete_connect(&self, address: &str, chain_id: &str) -> WalletResult<WalletSession> {
        let mut state = self.state.write();
        if state.phase != DonationPhase::Connecting {
            return Err(WalletError::InvalidState(
                "connect attempt was cancelled".to_string(),
            ));
        }

        let network = state.set_network(chain_id);
        let session = WalletSession {
            session_id: state.issue_session_id(),
            address: address.to_string(),
            network,
        };
        state.session = Some(session.clone());
        state.phase = DonationPhase::Connected;
        Ok(session)
    }

    pub fn abort_connect(&self) {
        let mut state = self.state.write();
        if state.phase == DonationPhase::Connecting {
            state.phase = DonationPhase::Disconnected;
        }
    }

    /// Drop the session and everything derived from it. Valid from any phase.
    pub fn disconnect(&self) {
        let mut state = self.state.write();
        state.clear_flow();
        state.phase = DonationPhase::Disconnected;
    }

    /// Issue a new scan ticket for the current session, superseding older ones.
    pub fn begin_scan(&self) -> Option<(ScanTicket, WalletSession)> {
        let mut state = self.state.write();
        let session = state.session.clone()?;
        state.scan_generation += 1;
        let ticket = ScanTicket {
            generation: state.scan_generation,
            session_id: session.session_id,
        };
        Some((ticket, session))
    }

    /// Replace the balance list if `ticket` is still current. The selection
    /// survives only if the selected token is still present.
    pub fn apply_scan(&self, ticket: ScanTicket, balances: Vec<TokenBalance>) -> bool {
        let mut state = self.state.write();
        let current_session = state.session.as_ref().map(|session| session.session_id);
        if current_session != Some(ticket.session_id) || state.scan_generation != ticket.generation {
            log::debug!(
                "Discarding stale scan result (generation {}, session {})",
                ticket.generation,
                ticket.session_id
            );
            return false;
        }

        state.balances = balances;
        if state.selected_balance().is_none() {
            state.selected = None;
        }
        true
    }

    /// Select a token by key, or clear the selection with `None`.
    pub fn select_token(&self, key: Option<&str>) -> WalletResult<()> {
        let mut state = self.state.write();
        let Some(key) = key else {
            state.selected = None;
            return Ok(());
        };

        let key = key.to_lowercase();
        if !state.balances.iter().any(|balance| balance.key() == key) {
            return Err(WalletError::NotFound(format!("no balance for token {}", key)));
        }
        state.selected = Some(key);
        Ok(())
    }

    pub fn selected_token(&self) -> Option<TokenBalance> {
        self.state.read().selected_balance().cloned()
    }

    pub fn set_amount(&self, amount: &str) {
        self.state.write().amount = amount.trim().to_string();
    }

    /// Fill the amount with the full balance of the selected token.
    pub fn use_max_amount(&self) -> WalletResult<String> {
        let mut state = self.state.write();
        let max = state
            .selected_balance()
            .map(|balance| balance.human_readable_balance.clone())
            .ok_or(WalletError::NoTokenSelected)?;
        state.amount = max.clone();
        Ok(max)
    }

    /// Enter `Submitting` and capture the request to send.
    pub fn begin_submit(&self) -> WalletResult<(WalletSession, TransferRequest)> {
        let mut state = self.state.write();
        if state.phase != DonationPhase::Connected {
            return Err(WalletError::InvalidState(format!(
                "cannot donate while {:?}",
                state.phase
            )));
        }
        let session = state
            .session
            .clone()
            .ok_or_else(|| WalletError::InvalidState("no wallet session".to_string()))?;

        let request = TransferRequest {
            selected_token: state.selected_balance().cloned(),
            amount: state.amount.clone(),
            recipient: session.recipient().map(str::to_string),
        };
        state.phase = DonationPhase::Submitting;
        state.last_outcome = None;
        Ok((session, request))
    }

    /// Record the outcome and return to `Connected`. Ignored if the session
    /// ended while the transfer was pending.
    pub fn finish_submit(&self, session_id: u64, outcome: TransferOutcome) -> bool {
        let mut state = self.state.write();
        let current = state.session.as_ref().map(|session| session.session_id);
        if state.phase != DonationPhase::Submitting || current != Some(session_id) {
            return false;
        }
        state.phase = DonationPhase::Connected;
        state.last_outcome = Some(outcome);
        true
    }

    /// The wallet switched chains. Balances from the old chain are dropped.
    pub fn update_network(&self, chain_id: &str) -> Option<WalletSession> {
        let mut state = self.state.write();
        state.session.as_ref()?;

        let network = state.set_network(chain_id);
        state.balances.clear();
        state.selected = None;
        state.scan_generation += 1;

        let session = state.session.as_mut()?;
        session.network = network;
        Some(session.clone())
    }

    /// The wallet switched accounts. The new account gets a new session identity.
    pub fn update_address(&self, address: &str) -> Option<WalletSession> {
        let mut state = self.state.write();
        let network = state.session.as_ref()?.network;

        let session = WalletSession {
            session_id: state.issue_session_id(),
            address: address.to_string(),
            network,
        };
        state.session = Some(session.clone());
        state.balances.clear();
        state.selected = None;
        state.amount.clear();
        state.last_outcome = None;
        state.scan_generation += 1;
        if state.phase == DonationPhase::Submitting {
            state.phase = DonationPhase::Connected;
        }
        Some(session)
    }

    pub fn snapshot(&self) -> DonationView {
        let state = self.state.read();
        DonationView {
            phase: state.phase,
            session: state.session.clone(),
            balances: state.balances.clone(),
            selected_token: state.selected.clone(),
            amount: state.amount.clone(),
            notice: state.notice.clone(),
            last_outcome: state.last_outcome.clone(),
        }
    }
}
