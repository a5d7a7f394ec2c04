use crate::common::{client_for, mock_cookie_crumb, mock_profile, mock_quote_v7, setup_server};
use holdings_rs::LookupStage;
use httpmock::Method::GET;

#[tokio::test]
async fn profiles_fill_sector_and_industry() {
    let server = setup_server();
    let (cookie_mock, crumb_mock) = mock_cookie_crumb(&server);
    let profile = mock_profile(&server, "BRK-B", "Financial Services", "Insurance - Diversified");

    let client = client_for(&server);
    let market = client.profiles(["BRK.B"]).await;

    cookie_mock.assert();
    crumb_mock.assert();
    profile.assert();
    let q = market.get("BRK.B").unwrap();
    assert_eq!(q.sector.as_deref(), Some("Financial Services"));
    assert_eq!(q.industry.as_deref(), Some("Insurance - Diversified"));
    assert_eq!(q.price, None);
}

#[tokio::test]
async fn quotes_and_profiles_merge_per_ticker() {
    let server = setup_server();
    let _ = mock_cookie_crumb(&server);
    let quotes = mock_quote_v7(
        &server,
        "AAA,BBB",
        &[("AAA", Some(10.0), Some(1.0e9)), ("BBB", Some(20.0), Some(2.0e9))],
    );
    let profile = mock_profile(&server, "BBB", "Energy", "Oil & Gas Integrated");
    let broken = server.mock(|when, then| {
        when.method(GET).path("/v10/finance/quoteSummary/AAA");
        then.status(404);
    });

    let client = client_for(&server);
    let market = client.enrich_with_profiles(["AAA", "BBB"], ["AAA", "BBB"]).await;

    quotes.assert();
    profile.assert();
    broken.assert();

    let bbb = market.get("BBB").unwrap();
    assert_eq!(bbb.price, Some(20.0));
    assert_eq!(bbb.sector.as_deref(), Some("Energy"));

    let aaa = market.get("AAA").unwrap();
    assert_eq!(aaa.price, Some(10.0));
    assert_eq!(aaa.sector, None);
    assert_eq!(market.failed_tickers(LookupStage::Profile), vec!["AAA"]);
    assert!(market.failed_tickers(LookupStage::Quote).is_empty());
}
