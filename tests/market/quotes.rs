use crate::common::{client_for, mock_quote_v7, setup_server};
use chrono::NaiveDate;
use holdings_rs::{LookupStage, PositionRecord, PriceSource, TickerFacts, Warning, process};

#[tokio::test]
async fn batch_maps_provider_symbols_back_to_local_tickers() {
    let server = setup_server();
    let mock = mock_quote_v7(
        &server,
        "AAA,BRK-B",
        &[
            ("AAA", Some(10.0), Some(1.0e9)),
            ("BRK-B", Some(410.5), Some(8.9e11)),
        ],
    );

    let client = client_for(&server);
    let market = client.enrich(["BRK.B", "AAA", "AAA"]).await;
    mock.assert();

    assert_eq!(market.len(), 2);
    let brk = market.get("BRK.B").expect("remapped ticker present");
    assert_eq!(brk.price, Some(410.5));
    assert_eq!(brk.market_cap, Some(8.9e11));
    assert!(market.get("BRK-B").is_none());
    assert!(market.failures().is_empty());
}

#[tokio::test]
async fn missing_symbols_are_reported_not_fatal() {
    let server = setup_server();
    let mock = mock_quote_v7(
        &server,
        "AAA,NOPRICE,ZZZ",
        &[("AAA", Some(10.0), Some(1.0e9)), ("NOPRICE", None, Some(5.0e8))],
    );

    let client = client_for(&server);
    let market = client.enrich(["ZZZ", "AAA", "NOPRICE"]).await;
    mock.assert();

    assert_eq!(market.get("AAA").and_then(|q| q.price), Some(10.0));
    assert!(market.get("ZZZ").is_none());
    let partial = market.get("NOPRICE").expect("cap-only quote kept");
    assert_eq!(partial.price, None);
    assert_eq!(partial.market_cap, Some(5.0e8));
    assert_eq!(market.failed_tickers(LookupStage::Quote), vec!["NOPRICE", "ZZZ"]);
}

#[tokio::test]
async fn cap_only_quote_still_drives_market_cap_impact() {
    let server = setup_server();
    let mock = mock_quote_v7(&server, "ABC", &[("ABC", None, Some(2.0e10))]);

    let client = client_for(&server);
    let market = client.enrich(["ABC"]).await;
    mock.assert();

    let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let positions = vec![PositionRecord::new("ABC", "Vanguard", date, 4.0e6, Some(-1.0e6))];
    // Reference price: 5,000M USD over 50M institutional shares = 100.
    let facts = vec![TickerFacts {
        total_shares_outstanding: Some(100.0),
        total_holdings_value: Some(5_000.0),
        institutional_ownership: Some(0.5),
        ..TickerFacts::new("ABC")
    }];
    let out = process(&positions, &facts, &market).unwrap();
    let row = &out.numeric().rows()[0];

    assert_eq!(row.price_source, PriceSource::Estimated);
    assert_eq!(row.market_cap, Some(2.0e10));
    assert!((row.change_in_value - -100.0).abs() < 1e-9);
    assert!((row.change_pct_of_market_cap - -0.5).abs() < 1e-9);

    let warnings = out.warnings();
    assert!(warnings.contains(&Warning::LookupFailed {
        tickers: vec!["ABC".into()]
    }));
    assert!(!warnings.iter().any(|w| matches!(w, Warning::MissingMarketCap { .. })));
}

#[tokio::test]
async fn tickers_are_split_into_chunks() {
    let server = setup_server();
    let first = mock_quote_v7(
        &server,
        "AAA,BBB",
        &[("AAA", Some(1.0), None), ("BBB", Some(2.0), None)],
    );
    let second = mock_quote_v7(&server, "CCC", &[("CCC", Some(3.0), None)]);

    let client = crate::common::builder_for(&server)
        .chunk_size(2)
        .build()
        .unwrap();
    let market = client.enrich(["CCC", "BBB", "AAA"]).await;

    first.assert();
    second.assert();
    assert_eq!(market.len(), 3);
    assert_eq!(market.get("CCC").and_then(|q| q.market_cap), None);
}

#[tokio::test]
async fn empty_ticker_list_makes_no_requests() {
    let server = setup_server();
    let client = client_for(&server);
    let market = client.enrich(Vec::<String>::new()).await;
    assert!(market.is_empty());
    assert!(market.failures().is_empty());
}
