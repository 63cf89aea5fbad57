mod common;

use std::sync::Arc;

use common::{ScriptedWallet, HOLDER};
use tipjar_wallet_lib::recipient::EVM_DONATION_ADDRESS;
use tipjar_wallet_lib::{
    DonationController, DonationPhase, ErrorKind, FileSessionStore, MemorySessionStore, Notice,
    SessionStore, TransferOutcome, WalletError, WalletResult,
};
use tempfile::TempDir;

const POLYGON_USDT: &str = "0xc2132D05D31c914a87C6611C10748AEb04B58e8F";
const POLYGON_DAI: &str = "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063";
const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

fn polygon_wallet() -> ScriptedWallet {
    ScriptedWallet::new("0x89")
        .fund_native(HOLDER, 2 * ONE_ETHER)
        .fund_token(POLYGON_USDT, HOLDER, 12_500_000)
        .fund_token(POLYGON_DAI, HOLDER, 0)
}

fn balance_of(controller: &DonationController<ScriptedWallet>, symbol: &str) -> Option<String> {
    controller
        .view()
        .balances
        .into_iter()
        .find(|b| b.symbol == symbol)
        .map(|b| b.human_readable_balance)
}

#[tokio::test]
async fn token_donation_end_to_end() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    let session = controller.connect().await?;
    assert_eq!(session.network.map(|n| n.name), Some("Polygon"));

    let symbols: Vec<_> = controller.view().balances.into_iter().map(|b| b.symbol).collect();
    assert_eq!(symbols, vec!["POL", "USDT"]);

    controller.select_token(Some(POLYGON_USDT))?;
    controller.set_amount("5");
    let outcome = controller.donate().await?;
    assert!(outcome.is_submitted());

    let sent = controller.provider().sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, POLYGON_USDT);
    assert_eq!(sent[0].value, None);
    let data = sent[0].data.clone().unwrap();
    assert!(data.starts_with("0xa9059cbb"));
    assert!(data.ends_with("4c4b40"));

    assert_eq!(controller.provider().token_balance(POLYGON_USDT, HOLDER), 7_500_000);
    assert!(controller.refresh_after(async {}).await);
    assert_eq!(balance_of(&controller, "USDT").as_deref(), Some("7.5"));
    assert_eq!(
        controller.view().selected_token,
        Some(POLYGON_USDT.to_lowercase())
    );
    Ok(())
}

#[tokio::test]
async fn native_donation_uses_value_only() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    controller.connect().await?;
    controller.select_token(Some("native"))?;
    controller.set_amount("0.1");

    let outcome = controller.donate().await?;
    assert!(outcome.is_submitted());
    let sent = controller.provider().sent.lock()[0].clone();
    assert_eq!(sent.to, EVM_DONATION_ADDRESS);
    assert_eq!(sent.value.as_deref(), Some("0x16345785d8a0000"));
    assert_eq!(sent.data, None);

    controller.refresh_balances().await;
    assert_eq!(balance_of(&controller, "POL").as_deref(), Some("1.9"));
    Ok(())
}

#[tokio::test]
async fn rejected_donation_changes_nothing() -> WalletResult<()> {
    let wallet = polygon_wallet();
    *wallet.reject_sends.lock() = true;
    let controller = DonationController::new(wallet);
    controller.connect().await?;
    let before = controller.view();

    controller.select_token(Some("native"))?;
    controller.set_amount("1");
    let outcome = controller.donate().await?;
    assert!(matches!(
        outcome,
        TransferOutcome::Failed { error_kind: ErrorKind::UserRejected, .. }
    ));

    let after = controller.view();
    assert_eq!(after.phase, DonationPhase::Connected);
    assert_eq!(after.session, before.session);
    assert_eq!(after.balances, before.balances);
    Ok(())
}

#[tokio::test]
async fn validation_failures_never_reach_the_wallet() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    controller.connect().await?;

    controller.set_amount("abc");
    let outcome = controller.donate().await?;
    assert!(matches!(outcome, TransferOutcome::Failed { error_kind: ErrorKind::InvalidAmount, .. }));

    controller.set_amount("1");
    let outcome = controller.donate().await?;
    assert!(matches!(outcome, TransferOutcome::Failed { error_kind: ErrorKind::NoTokenSelected, .. }));

    controller.select_token(Some(POLYGON_USDT))?;
    controller.set_amount("12.6");
    let outcome = controller.donate().await?;
    assert!(matches!(
        outcome,
        TransferOutcome::Failed { error_kind: ErrorKind::InsufficientBalance, .. }
    ));

    assert!(controller.provider().sent.lock().is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_network_has_no_recipient() -> WalletResult<()> {
    let wallet = ScriptedWallet::new("0x539").fund_native(HOLDER, ONE_ETHER);
    let controller = DonationController::new(wallet);
    controller.connect().await?;

    let view = controller.view();
    assert!(view.balances.is_empty());
    assert_eq!(view.notice, Some(Notice::UnsupportedNetwork { chain_id: "0x539".into() }));

    // Switching to a supported chain clears the notice and scans.
    *controller.provider().chain_id.lock() = "0x1".into();
    controller.handle_chain_changed("0x1").await.unwrap();
    let view = controller.view();
    assert_eq!(view.notice, None);
    assert_eq!(view.balances.len(), 1);
    assert_eq!(view.balances[0].symbol, "ETH");
    Ok(())
}

#[tokio::test]
async fn disconnect_during_scan_discards_result() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    controller.connect().await?;

    let release = controller.provider().gate_next_native_read();
    let (applied, _) = futures::join!(controller.refresh_balances(), async {
        controller.disconnect();
        let _ = release.send(());
    });

    assert!(!applied);
    let view = controller.view();
    assert_eq!(view.phase, DonationPhase::Disconnected);
    assert!(view.session.is_none());
    assert!(view.balances.is_empty());
    Ok(())
}

#[tokio::test]
async fn reconnect_during_scan_keeps_only_new_session_results() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    let first = controller.connect().await?;

    let release = controller.provider().gate_next_native_read();
    let (stale, second) = futures::join!(controller.refresh_balances(), async {
        controller.disconnect();
        controller.provider().set_native(HOLDER, ONE_ETHER);
        let second = controller.connect().await;
        let _ = release.send(());
        second
    });

    let second = second?;
    assert!(!stale);
    assert!(second.session_id > first.session_id);
    assert_eq!(balance_of(&controller, "POL").as_deref(), Some("1"));
    Ok(())
}

#[tokio::test]
async fn last_issued_scan_wins() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    controller.connect().await?;

    let release = controller.provider().gate_next_native_read();
    let (older, newer) = futures::join!(controller.refresh_balances(), async {
        let applied = controller.refresh_balances().await;
        // The older scan now reads a different balance; it must not land.
        controller.provider().set_native(HOLDER, 5 * ONE_ETHER);
        let _ = release.send(());
        applied
    });

    assert!(newer);
    assert!(!older);
    assert_eq!(balance_of(&controller, "POL").as_deref(), Some("2"));
    Ok(())
}

#[tokio::test]
async fn account_revocation_disconnects() -> WalletResult<()> {
    let controller = DonationController::new(polygon_wallet());
    controller.connect().await?;
    assert!(controller.handle_accounts_changed(&[]).await.is_none());
    assert_eq!(controller.view().phase, DonationPhase::Disconnected);
    assert!(matches!(
        controller.donate().await,
        Err(WalletError::InvalidState(_))
    ));
    Ok(())
}

#[tokio::test]
async fn file_backed_session_survives_restart() -> WalletResult<()> {
    let temp = TempDir::new().expect("create temp dir");
    let store = Arc::new(FileSessionStore::new(temp.path().join("session.json")));

    let controller = DonationController::new(polygon_wallet()).with_store(store.clone());
    controller.connect().await?;
    let stored = store.load()?.expect("session stored");
    assert_eq!(stored.address, HOLDER);

    let restarted = DonationController::new(polygon_wallet()).with_store(store.clone());
    let restored = restarted.restore().await?.expect("session restored");
    assert_eq!(restored.address, HOLDER);
    assert_eq!(balance_of(&restarted, "USDT").as_deref(), Some("12.5"));

    restarted.disconnect();
    assert!(store.load()?.is_none());
    Ok(())
}

#[tokio::test]
async fn restore_forgets_an_account_the_wallet_no_longer_authorizes() -> WalletResult<()> {
    let temp = TempDir::new().expect("create temp dir");
    let store = Arc::new(FileSessionStore::new(temp.path().join("session.json")));

    let controller = DonationController::new(polygon_wallet()).with_store(store.clone());
    controller.connect().await?;
    assert!(store.load()?.is_some());

    let revoked = polygon_wallet();
    *revoked.accounts.lock() = Err(WalletError::from_provider_code(4100, "unauthorized"));
    let restarted = DonationController::new(revoked).with_store(store.clone());
    assert_eq!(restarted.restore().await?, None);
    assert_eq!(restarted.view().phase, DonationPhase::Disconnected);
    assert!(restarted.view().balances.is_empty());
    assert!(store.load()?.is_none());
    Ok(())
}

#[tokio::test]
async fn restore_ignores_a_stored_account_the_wallet_switched_away_from() -> WalletResult<()> {
    let store = Arc::new(MemorySessionStore::new());
    let controller = DonationController::new(polygon_wallet()).with_store(store.clone());
    controller.connect().await?;

    let switched = polygon_wallet();
    *switched.accounts.lock() = Ok(vec!["0x2222222222222222222222222222222222222222".into()]);
    let restarted = DonationController::new(switched).with_store(store.clone());
    assert_eq!(restarted.restore().await?, None);
    assert!(restarted.view().session.is_none());
    assert!(store.load()?.is_none());
    Ok(())
}
