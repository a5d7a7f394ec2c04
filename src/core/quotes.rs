// src/core/quotes.rs
use serde::Deserialize;
use url::Url;

use crate::core::{HoldingsError, MarketClient, MarketQuote, client::RetryConfig, net};

// Centralized wire model for the v7 quote API
#[derive(Deserialize)]
pub struct V7Envelope {
    #[serde(rename = "quoteResponse")]
    pub(crate) quote_response: Option<V7QuoteResponse>,
}

#[derive(Deserialize)]
pub struct V7QuoteResponse {
    pub(crate) result: Option<Vec<V7QuoteNode>>,
    #[allow(dead_code)]
    pub(crate) error: Option<serde_json::Value>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct V7QuoteNode {
    #[serde(default)]
    pub(crate) symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub(crate) regular_market_price: Option<f64>,
    #[serde(rename = "marketCap")]
    pub(crate) market_cap: Option<f64>,
    #[allow(dead_code)]
    pub(crate) currency: Option<String>,
}

impl From<V7QuoteNode> for MarketQuote {
    fn from(n: V7QuoteNode) -> Self {
        Self {
            market_cap: n.market_cap.filter(|v| v.is_finite()),
            price: n.regular_market_price.filter(|v| v.is_finite()),
            sector: None,
            industry: None,
        }
    }
}

/// Fetches quotes for one batch of provider symbols from the v7 API.
/// Retries transient failures and falls back to cookie + crumb auth on 401/403.
pub async fn fetch_v7_quotes(
    client: &MarketClient,
    symbols: &[String],
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<V7QuoteNode>, HoldingsError> {
    // One attempt; `crumb` is appended when present.
    async fn attempt_fetch(
        client: &MarketClient,
        symbols: &[String],
        crumb: Option<&str>,
        retry_override: Option<&RetryConfig>,
    ) -> Result<(String, Url, Option<u16>), HoldingsError> {
        let mut url = client.base_quote_v7().clone();
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("symbols", &symbols.join(","));
            if let Some(c) = crumb {
                qp.append_pair("crumb", c);
            }
        }

        tracing::debug!(%url, count = symbols.len(), "requesting quotes");
        let resp = client
            .send_with_retry(
                client
                    .http()
                    .get(url.clone())
                    .header("accept", "application/json"),
                retry_override,
            )
            .await?;

        let fixture_key = match symbols {
            [one] => one.as_str(),
            _ => "MULTI",
        };
        let status = resp.status();
        let body = net::get_text(resp, "quote_v7", fixture_key, "json").await?;

        if status.is_success() {
            Ok((body, url, None))
        } else {
            Ok((body, url, Some(status.as_u16())))
        }
    }

    if symbols.is_empty() {
        return Err(HoldingsError::InvalidParams(
            "quotes: at least one symbol required".into(),
        ));
    }

    let (body, url, maybe_status) = attempt_fetch(client, symbols, None, retry_override).await?;

    let body_to_parse = match maybe_status {
        None => body,
        Some(401 | 403) => {
            client.ensure_credentials().await?;
            let crumb = client.crumb().await.ok_or_else(|| {
                HoldingsError::Auth("Crumb is not set after ensuring credentials".into())
            })?;

            let (body, url, maybe_status) =
                attempt_fetch(client, symbols, Some(&crumb), retry_override).await?;
            if let Some(code) = maybe_status {
                if code == 401 || code == 403 {
                    client.clear_crumb().await;
                }
                return Err(HoldingsError::from_status(code, url));
            }
            body
        }
        Some(code) => return Err(HoldingsError::from_status(code, url)),
    };

    let env: V7Envelope = serde_json::from_str(&body_to_parse)?;

    Ok(env
        .quote_response
        .and_then(|qr| qr.result)
        .unwrap_or_default())
}
