use crate::common::{builder_for, client_for, mock_quote_v7, setup_server};
use holdings_rs::LookupStage;
use httpmock::Method::GET;
use std::time::Duration;

#[tokio::test]
async fn failed_batch_falls_back_to_single_lookups() {
    let server = setup_server();
    let batch = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", "AAA,ZZZ");
        then.status(500).body("upstream error");
    });
    let aaa = mock_quote_v7(&server, "AAA", &[("AAA", Some(12.0), Some(2.0e9))]);
    let zzz = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", "ZZZ");
        then.status(404);
    });

    let client = client_for(&server);
    let market = client.enrich(["AAA", "ZZZ"]).await;

    batch.assert();
    aaa.assert();
    zzz.assert();
    assert_eq!(market.get("AAA").and_then(|q| q.price), Some(12.0));
    assert_eq!(market.failed_tickers(LookupStage::Quote), vec!["ZZZ"]);
}

#[tokio::test]
async fn slow_lookups_time_out_as_failures() {
    let server = setup_server();
    let _slow = server.mock(|when, then| {
        when.method(GET).path("/v7/finance/quote");
        then.status(200)
            .delay(Duration::from_secs(2))
            .header("content-type", "application/json")
            .body(crate::common::quote_body(&[("SLOW", Some(1.0), None)]));
    });

    let client = builder_for(&server)
        .lookup_timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let market = client.enrich(["SLOW"]).await;

    assert!(market.is_empty());
    let failure = &market.failures()[0];
    assert_eq!(failure.ticker, "SLOW");
    assert_eq!(failure.stage, LookupStage::Quote);
    assert!(failure.reason.contains("timed out"), "reason: {}", failure.reason);
}
