use crate::core::{AssetProfile, HoldingsError, MarketClient, client::RetryConfig, net};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct V10Envelope {
    #[serde(rename = "quoteSummary")]
    pub(crate) quote_summary: Option<V10QuoteSummary>,
}

#[derive(Deserialize)]
pub struct V10QuoteSummary {
    pub(crate) result: Option<Vec<serde_json::Value>>,
    pub(crate) error: Option<V10Error>,
}

#[derive(Deserialize)]
pub struct V10Error {
    pub(crate) description: String,
}

#[derive(Deserialize)]
struct AssetProfileResult {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfileNode>,
}

#[derive(Deserialize)]
struct AssetProfileNode {
    sector: Option<String>,
    industry: Option<String>,
}

/// Fetches `modules` from the quoteSummary API for one provider symbol.
///
/// A response reporting an invalid crumb clears it and retries once with a fresh one.
pub async fn fetch(
    client: &MarketClient,
    symbol: &str,
    modules: &str,
    retry_override: Option<&RetryConfig>,
) -> Result<V10Envelope, HoldingsError> {
    async fn attempt_fetch(
        client: &MarketClient,
        symbol: &str,
        modules: &str,
        retry_override: Option<&RetryConfig>,
    ) -> Result<V10Envelope, HoldingsError> {
        client.ensure_credentials().await?;

        let crumb = client
            .crumb()
            .await
            .ok_or_else(|| HoldingsError::Auth("Crumb is not set".into()))?;

        let mut url = client.base_quote_api().join(symbol)?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("modules", modules);
            qp.append_pair("crumb", &crumb);
        }

        let req = client.http().get(url.clone());
        let resp = client.send_with_retry(req, retry_override).await?;
        let status = resp.status();

        let module_key = modules
            .replace(',', "-")
            .replace(|c: char| !c.is_alphanumeric() && c != '-', "");
        let text =
            net::get_text(resp, &format!("quotesummary_{module_key}"), symbol, "json").await?;

        // quoteSummary reports crumb problems in the body, sometimes alongside a 401.
        if !status.is_success() && !text.contains("quoteSummary") {
            return Err(HoldingsError::from_status(status.as_u16(), url));
        }

        serde_json::from_str(&text)
            .map_err(|e| HoldingsError::Data(format!("quoteSummary json parse: {e}")))
    }

    for attempt in 0..=1 {
        let env = attempt_fetch(client, symbol, modules, retry_override).await?;

        if let Some(error) = env.quote_summary.as_ref().and_then(|qs| qs.error.as_ref()) {
            let desc = error.description.to_ascii_lowercase();
            if desc.contains("invalid crumb") && attempt == 0 {
                tracing::debug!(symbol, "invalid crumb; refreshing and retrying");
                client.clear_crumb().await;
                continue;
            }
            return Err(HoldingsError::Data(format!("yahoo error: {}", error.description)));
        }

        return Ok(env);
    }

    Err(HoldingsError::Data(format!(
        "quoteSummary call for {symbol} failed after retry"
    )))
}

/// Sector and industry for one provider symbol, from the `assetProfile` module.
pub async fn fetch_asset_profile(
    client: &MarketClient,
    symbol: &str,
    retry_override: Option<&RetryConfig>,
) -> Result<AssetProfile, HoldingsError> {
    let env = fetch(client, symbol, "assetProfile", retry_override).await?;

    let result_val = env
        .quote_summary
        .and_then(|qs| qs.result)
        .and_then(|mut v| v.pop())
        .ok_or_else(|| HoldingsError::Data("empty quoteSummary result".into()))?;

    let parsed: AssetProfileResult = serde_json::from_value(result_val)
        .map_err(|e| HoldingsError::Data(format!("quoteSummary result parse: {e}")))?;

    let node = parsed
        .asset_profile
        .ok_or_else(|| HoldingsError::Data(format!("no assetProfile for {symbol}")))?;

    Ok(AssetProfile {
        sector: node.sector.filter(|s| !s.trim().is_empty()),
        industry: node.industry.filter(|s| !s.trim().is_empty()),
    })
}
