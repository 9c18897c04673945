//! Behavior-driven tests for provider response normalization.
//!
//! These tests verify HOW incompatible upstream schemas (string numerics,
//! positional arrays, nullable fields, single price points) become the one
//! canonical shape callers receive.

use std::sync::Arc;

use cryptick_core::{
    AssetSymbol, ChainStrategy, HistoryRequest, ProviderId, SnapshotsRequest, Timeframe,
};

use cryptick_tests::{
    cascade_with, ScriptedHttpClient, EXCHANGE_KLINES_BODY, EXCHANGE_TICKER_BODY,
    INDEX_CHART_BODY, INDEX_MARKETS_BODY, PRIMARY_MARKETS_BODY,
};

#[tokio::test]
async fn exchange_string_numerics_are_parsed_without_precision_loss() {
    // Given: the exchange provider reports all numerics as decimal strings
    let client = Arc::new(
        ScriptedHttpClient::new().on_success("exchange.test", EXCHANGE_TICKER_BODY),
    );
    let cascade = cascade_with(client);

    // When: snapshots are routed strictly to the exchange provider
    let request =
        SnapshotsRequest::new(vec![AssetSymbol::Btc, AssetSymbol::Xrp]).expect("valid request");
    let result = cascade
        .fetch_snapshots(&request, ChainStrategy::Strict(ProviderId::ExchangeTicker))
        .await
        .expect("exchange should answer");

    // Then: string values arrive as their exact numeric equivalents
    assert_eq!(result.data.len(), 2);
    let btc = &result.data[0];
    assert_eq!(btc.symbol, AssetSymbol::Btc);
    assert_eq!(btc.price_usd, 50000.12);
    assert_eq!(btc.change_24h_pct, 2.5);
    assert_eq!(btc.volume_24h_usd, 28123456789.12);

    // And: the provider reports no capitalization, so it is 0 (unknown),
    // with the display name supplied from the catalog
    assert_eq!(btc.market_cap_usd, 0.0);
    assert_eq!(btc.name, "Bitcoin");

    let xrp = &result.data[1];
    assert_eq!(xrp.symbol, AssetSymbol::Xrp);
    assert_eq!(xrp.price_usd, 0.52);
}

#[tokio::test]
async fn exchange_klines_become_ordered_candles() {
    // Given: klines arrive as fixed-position arrays with string prices
    let client = Arc::new(
        ScriptedHttpClient::new().on_success("/klines", EXCHANGE_KLINES_BODY),
    );
    let cascade = cascade_with(client);

    // When: history is routed strictly to the exchange provider
    let request = HistoryRequest::new(AssetSymbol::Btc, Timeframe::OneDay);
    let result = cascade
        .fetch_history(&request, ChainStrategy::Strict(ProviderId::ExchangeTicker))
        .await
        .expect("exchange should answer");

    // Then: candles carry the parsed values, ascending by timestamp
    let candles = &result.data.candles;
    assert_eq!(candles.len(), 2);
    assert!(candles[0].ts < candles[1].ts);
    assert_eq!(candles[0].open, 100.0);
    assert_eq!(candles[0].high, 101.0);
    assert_eq!(candles[0].low, 99.0);
    assert_eq!(candles[0].close, 100.0);
    assert_eq!(candles[1].close, 110.0);
}

#[tokio::test]
async fn index_history_replicates_single_prices_into_flat_candles() {
    // Given: primary and exchange are unreachable; the index provider only
    // serves [timestamp, price] pairs
    let client = Arc::new(
        ScriptedHttpClient::new()
            .on_failure("primary.test", "connection refused")
            .on_failure("exchange.test", "connection refused")
            .on_success("index.test", INDEX_CHART_BODY),
    );
    let cascade = cascade_with(client);

    // When: ETH/1M history goes through the full cascade
    let request = HistoryRequest::new(AssetSymbol::Eth, Timeframe::OneMonth);
    let result = cascade
        .fetch_history(&request, ChainStrategy::Cascade)
        .await
        .expect("index should answer");

    // Then: the index provider answered after the fallback walk
    assert_eq!(result.selected_provider, ProviderId::AggregatorIndex);
    assert_eq!(result.provider_chain.len(), 3);

    // And: every candle is degenerate (open = high = low = close)
    assert_eq!(result.data.candles.len(), 3);
    for candle in &result.data.candles {
        assert_eq!(candle.open, candle.high);
        assert_eq!(candle.high, candle.low);
        assert_eq!(candle.low, candle.close);
    }
    assert_eq!(result.data.candles[0].close, 2500.5);
}

#[tokio::test]
async fn index_nullable_fields_default_to_zero() {
    // Given: the index provider reports null change and volume for XRP
    let client = Arc::new(
        ScriptedHttpClient::new().on_success("index.test", INDEX_MARKETS_BODY),
    );
    let cascade = cascade_with(client);

    // When: snapshots are routed strictly to the index provider
    let request = SnapshotsRequest::new(vec![AssetSymbol::Xrp]).expect("valid request");
    let result = cascade
        .fetch_snapshots(&request, ChainStrategy::Strict(ProviderId::AggregatorIndex))
        .await
        .expect("index should answer");

    // Then: nullable fields arrive as 0, never as absent values
    let xrp = &result.data[0];
    assert_eq!(xrp.change_24h_pct, 0.0);
    assert_eq!(xrp.volume_24h_usd, 0.0);
    assert_eq!(xrp.market_cap_usd, 28000000000.0);
}

#[tokio::test]
async fn primary_canonical_payloads_pass_through_unchanged() {
    // Given: the primary API already speaks the canonical shape
    let client = Arc::new(
        ScriptedHttpClient::new().on_success("primary.test", PRIMARY_MARKETS_BODY),
    );
    let cascade = cascade_with(client);

    // When: the full catalog is requested
    let request = SnapshotsRequest::all();
    let result = cascade
        .fetch_snapshots(&request, ChainStrategy::Cascade)
        .await
        .expect("primary should answer");

    // Then: values map field-for-field, including capitalization
    assert_eq!(result.data.len(), 3);
    assert_eq!(result.data[0].market_cap_usd, 980000000000.0);
    assert_eq!(result.data[1].name, "Ethereum");
    assert_eq!(result.data[2].price_usd, 0.52);
}
