mod common;

use common::*;
use paylink::services::wallet_watcher::WalletSnapshot;
use paylink::{PayLinkError, WalletEvent, WalletInteractor, WalletState, WalletWatcher};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn connect_on_shardeum_reads_balance() {
    let provider = ScriptedProvider::new();
    let services = container(provider.clone());

    let state = services.wallet().connect().await.unwrap();

    assert!(state.is_connected);
    assert_eq!(state.address.as_deref(), Some(SENDER));
    assert_eq!(state.balance, 1_000.0);
    assert!(services.wallet().is_on_shardeum(&state));
    assert!(provider.calls("wallet_switchEthereumChain").is_empty());
}

#[tokio::test]
async fn connect_on_another_chain_switches_then_adds_the_network() {
    let provider = ScriptedProvider::new();
    provider.respond("eth_chainId", json!("0x1"));
    provider.fail_method("wallet_switchEthereumChain", 4902, "Unrecognized chain ID");
    let services = container(provider.clone());

    let state = services.wallet().connect().await.unwrap();

    assert_eq!(state.chain_id.as_deref(), Some("0x1F90"));
    assert!(services.wallet().is_on_shardeum(&state));

    let methods = provider.methods();
    let switch = methods.iter().position(|m| m == "wallet_switchEthereumChain").unwrap();
    let add = methods.iter().position(|m| m == "wallet_addEthereumChain").unwrap();
    assert!(switch < add);

    let params = &provider.calls("wallet_addEthereumChain")[0][0];
    assert_eq!(params["chainId"], "0x1F90");
    assert_eq!(params["nativeCurrency"]["symbol"], "SHM");
    assert_eq!(params["nativeCurrency"]["decimals"], 18);
}

#[tokio::test]
async fn rejected_connection_is_reported() {
    let provider = ScriptedProvider::new();
    provider.fail_method("eth_requestAccounts", 4001, "User rejected the request.");
    let services = container(provider);

    let err = services.wallet().connect().await.unwrap_err();
    assert!(matches!(domain_error(&err), PayLinkError::UserRejected));
}

#[tokio::test]
async fn check_connection_without_accounts_is_disconnected() {
    let provider = ScriptedProvider::new();
    provider.respond("eth_accounts", json!([]));
    let services = container(provider);

    let state = services.wallet().check_connection().await.unwrap();
    assert_eq!(state, WalletState::default());
}

#[tokio::test]
async fn wallet_events_update_state() {
    let provider = ScriptedProvider::new();
    let services = container(provider.clone());
    let wallet = services.wallet();
    let state = wallet.connect().await.unwrap();

    let switched = wallet
        .apply_event(&state, &WalletEvent::AccountsChanged(vec![ALICE.to_string()]))
        .await
        .unwrap();
    assert_eq!(switched.address.as_deref(), Some(ALICE));
    assert!(switched.is_connected);

    let moved = wallet
        .apply_event(&switched, &WalletEvent::ChainChanged("0x1".to_string()))
        .await
        .unwrap();
    assert!(!wallet.is_on_shardeum(&moved));

    let gone = wallet
        .apply_event(&moved, &WalletEvent::AccountsChanged(Vec::new()))
        .await
        .unwrap();
    assert!(!gone.is_connected);
    assert_eq!(gone.address, None);
}

#[tokio::test]
async fn watcher_reports_changes_after_the_first_read() {
    let provider = ScriptedProvider::new();
    let services = container(provider.clone());
    let client = services.client();
    let mut snapshot = WalletSnapshot::default();

    assert!(WalletWatcher::observe(&client, &mut snapshot).await.is_empty());
    assert!(WalletWatcher::observe(&client, &mut snapshot).await.is_empty());

    provider.respond("eth_accounts", json!([ALICE]));
    provider.respond("eth_chainId", json!("0x1"));
    let events = WalletWatcher::observe(&client, &mut snapshot).await;

    assert_eq!(
        events,
        vec![
            WalletEvent::AccountsChanged(vec![ALICE.to_string()]),
            WalletEvent::ChainChanged("0x1".to_string()),
        ]
    );
}

#[tokio::test]
async fn watcher_with_zero_period_still_emits() {
    let provider = ScriptedProvider::new();
    let services = container(provider.clone());
    let mut watcher = WalletWatcher::new(services.client(), Duration::ZERO);
    let mut events = watcher.subscribe();
    watcher.start().await;

    // Let the first read set the baseline
    tokio::time::sleep(Duration::from_millis(50)).await;
    provider.respond("eth_chainId", json!("0x1"));

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no wallet event before the timeout")
        .unwrap();
    watcher.stop().await;

    assert_eq!(event, WalletEvent::ChainChanged("0x1".to_string()));
}
