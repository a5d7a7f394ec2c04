use crate::common::{builder_for, mock_quote_v7, setup_server};
use chrono::NaiveDate;
use holdings_rs::{CacheMode, EnrichBuilder, ManualClock};
use std::sync::Arc;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
}

#[tokio::test]
async fn quotes_are_reused_until_the_day_changes() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "AAA", &[("AAA", Some(10.0), Some(1.0e9))]);

    let clock = Arc::new(ManualClock::new(day(1)));
    let client = builder_for(&server)
        .daily_cache(true)
        .clock(clock.clone())
        .build()
        .unwrap();

    let first = client.enrich(["AAA"]).await;
    mock.assert_calls(1);

    // Same day: served from the cache.
    let second = client.enrich(["AAA"]).await;
    mock.assert_calls(1);
    assert_eq!(first.get("AAA"), second.get("AAA"));

    clock.set(day(2));
    let _ = client.enrich(["AAA"]).await;
    mock.assert_calls(2);
}

#[tokio::test]
async fn refresh_and_bypass_always_hit_the_network() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "AAA", &[("AAA", Some(10.0), None)]);

    let client = builder_for(&server).daily_cache(true).build().unwrap();

    let _ = EnrichBuilder::new(&client)
        .tickers(["AAA"])
        .cache_mode(CacheMode::Bypass)
        .fetch()
        .await;
    mock.assert_calls(1);

    // Bypass did not populate the cache.
    let _ = client.enrich(["AAA"]).await;
    mock.assert_calls(2);

    let _ = EnrichBuilder::new(&client)
        .tickers(["AAA"])
        .cache_mode(CacheMode::Refresh)
        .fetch()
        .await;
    mock.assert_calls(3);

    let _ = client.enrich(["AAA"]).await;
    mock.assert_calls(3);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "ZZZ", &[]);

    let client = builder_for(&server).daily_cache(true).build().unwrap();
    let first = client.enrich(["ZZZ"]).await;
    assert_eq!(first.failures().len(), 1);

    let _ = client.enrich(["ZZZ"]).await;
    mock.assert_calls(2);
}

#[tokio::test]
async fn partial_quotes_are_not_cached() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "AAA", &[("AAA", None, Some(1.0e9))]);

    let client = builder_for(&server).daily_cache(true).build().unwrap();
    let first = client.enrich(["AAA"]).await;
    assert_eq!(first.get("AAA").and_then(|q| q.market_cap), Some(1.0e9));

    let _ = client.enrich(["AAA"]).await;
    mock.assert_calls(2);
}

#[tokio::test]
async fn cache_is_off_unless_enabled() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "AAA", &[("AAA", Some(10.0), None)]);

    let client = builder_for(&server).build().unwrap();
    assert!(!client.cache_enabled());
    let _ = client.enrich(["AAA"]).await;
    let _ = client.enrich(["AAA"]).await;
    mock.assert_calls(2);
}
