#[cfg(feature = "test-mode")]
use std::env;

/// Read the response body as text.
/// In `test-mode`, if `HOLDINGS_RECORD=1`, the body is saved as a fixture under `tests/fixtures`.
pub(crate) async fn get_text(
    resp: reqwest::Response,
    _endpoint: &str,
    _symbol: &str,
    _ext: &str,
) -> Result<String, reqwest::Error> {
    let text = resp.text().await?;

    #[cfg(feature = "test-mode")]
    {
        if env::var("HOLDINGS_RECORD").ok().as_deref() == Some("1")
            && let Err(e) = record_fixture(_endpoint, _symbol, _ext, &text)
        {
            tracing::warn!(
                symbol = _symbol,
                error = %e,
                "HOLDINGS_RECORD: failed to write fixture"
            );
        }
    }

    Ok(text)
}

#[cfg(feature = "test-mode")]
fn record_fixture(endpoint: &str, symbol: &str, ext: &str, body: &str) -> std::io::Result<()> {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    std::fs::create_dir_all(&dir)?;
    let safe_symbol = symbol.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', "_");
    std::fs::write(dir.join(format!("{endpoint}_{safe_symbol}.{ext}")), body)
}
