//! Behavior-driven tests for failure classification and reporting.
//!
//! These tests verify HOW upstream failures are classified (retryable
//! transport-class versus terminal configuration) and what diagnostic detail
//! reaches the caller.

use std::collections::HashMap;
use std::sync::Arc;

use cryptick_core::{
    AssetSymbol, CascadeError, ChainStrategy, ExchangeTickerAdapter, HistoryRequest,
    PrimaryApiAdapter, ProviderCascade, ProviderId, SnapshotsRequest, Timeframe,
};

use cryptick_tests::{
    cascade_with, ScriptedHttpClient, EXCHANGE_TEST_URL, EXCHANGE_TICKER_BODY, PRIMARY_TEST_URL,
};

#[tokio::test]
async fn upstream_error_messages_are_extracted_from_the_body() {
    // Given: the primary API answers 500 with a JSON error body
    let client = Arc::new(
        ScriptedHttpClient::new()
            .on_status("primary.test", 500, r#"{"message":"maintenance window"}"#),
    );
    let cascade = cascade_with(client);

    // When: snapshots are requested and the whole chain fails
    let request = SnapshotsRequest::new(vec![AssetSymbol::Btc]).expect("valid request");
    let error = cascade
        .fetch_snapshots(&request, ChainStrategy::Cascade)
        .await
        .expect_err("must exhaust");

    // Then: the diagnostic for the primary attempt carries the extracted
    // human-readable message
    let CascadeError::Exhausted(failure) = error else {
        panic!("expected exhaustion");
    };
    let primary_error = failure
        .errors
        .iter()
        .find(|e| e.provider == Some(ProviderId::PrimaryApi))
        .expect("primary diagnostic present");
    assert_eq!(primary_error.code, "provider.transport");
    assert!(primary_error.message.contains("maintenance window"));
    assert!(primary_error.message.contains("status 500"));
    assert_eq!(primary_error.retryable, Some(true));
}

#[tokio::test]
async fn undecodable_bodies_fail_the_attempt_and_advance_the_cascade() {
    // Given: the primary API answers 200 with garbage and the exchange works
    let client = Arc::new(
        ScriptedHttpClient::new()
            .on_success("primary.test", "<html>not json</html>")
            .on_success("exchange.test", EXCHANGE_TICKER_BODY),
    );
    let cascade = cascade_with(client);

    // When: snapshots are requested
    let request = SnapshotsRequest::new(vec![AssetSymbol::Btc]).expect("valid request");
    let result = cascade
        .fetch_snapshots(&request, ChainStrategy::Cascade)
        .await
        .expect("exchange should answer");

    // Then: the decode failure was transport-class and the cascade advanced
    assert_eq!(result.selected_provider, ProviderId::ExchangeTicker);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("failed to decode"));
    assert_eq!(result.errors[0].retryable, Some(true));
}

#[tokio::test]
async fn unsupported_symbols_are_terminal_for_history_too() {
    // Given: an exchange adapter whose pair table only knows BTC
    let client = Arc::new(ScriptedHttpClient::new());
    let mut pairs = HashMap::new();
    pairs.insert(AssetSymbol::Btc, String::from("BTCUSDT"));

    let primary = PrimaryApiAdapter::new(client.clone(), PRIMARY_TEST_URL)
        .with_symbol_table(HashMap::new());
    let exchange =
        ExchangeTickerAdapter::new(client.clone(), EXCHANGE_TEST_URL).with_pair_table(pairs);
    let cascade = ProviderCascade::new(vec![Arc::new(primary), Arc::new(exchange)]);

    // When: history is requested for a symbol the first provider cannot map
    let request = HistoryRequest::new(AssetSymbol::Eth, Timeframe::OneWeek);
    let error = cascade
        .fetch_history(&request, ChainStrategy::Cascade)
        .await
        .expect_err("must short-circuit");

    // Then: the configuration error names the provider and nothing was
    // fetched over the network
    let CascadeError::Configuration { provider, error } = error else {
        panic!("expected configuration error");
    };
    assert_eq!(provider, ProviderId::PrimaryApi);
    assert!(!error.retryable());
    assert!(error.message().contains("ETH"));
    assert_eq!(client.requests().len(), 0);
}

#[tokio::test]
async fn exhaustion_reports_the_operation_in_its_message() {
    // Given: a dead network
    let client = Arc::new(ScriptedHttpClient::new());
    let cascade = cascade_with(client);

    // When: snapshots are requested
    let request = SnapshotsRequest::new(vec![AssetSymbol::Eth]).expect("valid request");
    let error = cascade
        .fetch_snapshots(&request, ChainStrategy::Cascade)
        .await
        .expect_err("must exhaust");

    // Then: the rendered failure is the single terminal condition callers
    // handle, keyed by operation
    assert!(error.to_string().contains("operation 'snapshots'"));
}
