#![allow(dead_code)]

use httpmock::{Method::GET, Mock, MockServer};
use holdings_rs::{MarketClient, MarketClientBuilder, RetryConfig};
use std::path::{Path, PathBuf};
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A builder pointed at `server` for every endpoint, with retries off.
pub fn builder_for(server: &MockServer) -> MarketClientBuilder {
    MarketClient::builder()
        .base_quote_v7(Url::parse(&format!("{}/v7/finance/quote", server.base_url())).unwrap())
        .base_quote_api(
            Url::parse(&format!("{}/v10/finance/quoteSummary/", server.base_url())).unwrap(),
        )
        .cookie_url(Url::parse(&format!("{}/consent", server.base_url())).unwrap())
        .crumb_url(Url::parse(&format!("{}/v1/test/getcrumb", server.base_url())).unwrap())
        .retry_policy(RetryConfig::disabled())
}

pub fn client_for(server: &MockServer) -> MarketClient {
    builder_for(server).build().unwrap()
}

pub fn mock_cookie_crumb(server: &'_ MockServer) -> (Mock<'_>, Mock<'_>) {
    let cookie_mock = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200).header(
            "set-cookie",
            "A=B; Max-Age=315360000; Domain=.yahoo.com; Path=/; Secure; SameSite=None",
        );
    });
    let crumb_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body("crumb-value");
    });
    (cookie_mock, crumb_mock)
}

/// A v7 quote body with one node per `(symbol, price, market_cap)`.
pub fn quote_body(nodes: &[(&str, Option<f64>, Option<f64>)]) -> String {
    let result: Vec<serde_json::Value> = nodes
        .iter()
        .map(|(sym, price, cap)| {
            let mut node = serde_json::json!({ "symbol": sym, "currency": "USD" });
            if let Some(p) = price {
                node["regularMarketPrice"] = serde_json::json!(p);
            }
            if let Some(c) = cap {
                node["marketCap"] = serde_json::json!(c);
            }
            node
        })
        .collect();
    serde_json::json!({ "quoteResponse": { "result": result, "error": null } }).to_string()
}

/// Mocks one v7 request for exactly `symbols` (comma-joined, as sent).
pub fn mock_quote_v7<'a>(
    server: &'a MockServer,
    symbols: &'a str,
    nodes: &[(&str, Option<f64>, Option<f64>)],
) -> Mock<'a> {
    let body = quote_body(nodes);
    server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", symbols);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

pub fn profile_body(sector: &str, industry: &str) -> String {
    serde_json::json!({
        "quoteSummary": {
            "result": [{ "assetProfile": { "sector": sector, "industry": industry } }],
            "error": null
        }
    })
    .to_string()
}

pub fn mock_profile<'a>(
    server: &'a MockServer,
    symbol: &'a str,
    sector: &str,
    industry: &str,
) -> Mock<'a> {
    let body = profile_body(sector, industry);
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v10/finance/quoteSummary/{symbol}"))
            .query_param("modules", "assetProfile")
            .query_param("crumb", "crumb-value");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}
