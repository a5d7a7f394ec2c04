//! Cookie & crumb acquisition for Yahoo endpoints.

use crate::core::error::HoldingsError;
use reqwest::header::SET_COOKIE;

impl super::MarketClient {
    pub(crate) async fn ensure_credentials(&self) -> Result<(), HoldingsError> {
        // Fast path: check if credentials exist with a read lock.
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        // Slow path: only one task fetches credentials.
        let _guard = self.credential_fetch_lock.lock().await;

        // Another task may have finished while this one was waiting.
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        self.get_cookie().await?;
        self.get_crumb_internal().await?;

        Ok(())
    }

    /// Drops the crumb so the next authenticated call fetches a fresh one.
    pub(crate) async fn clear_crumb(&self) {
        let mut state = self.state.write().await;
        state.crumb = None;
    }

    pub(crate) async fn crumb(&self) -> Option<String> {
        let state = self.state.read().await;
        state.crumb.clone()
    }

    async fn get_cookie(&self) -> Result<(), HoldingsError> {
        let req = self.http.get(self.cookie_url.clone());
        let resp = self.send_with_retry(req, None).await?;

        let cookie = resp
            .headers()
            .get(SET_COOKIE)
            .ok_or_else(|| HoldingsError::Auth("No cookie received from consent endpoint".into()))?
            .to_str()
            .map_err(|_| HoldingsError::Auth("Invalid cookie header format".into()))?
            .to_string();

        self.state.write().await.cookie = Some(cookie);
        Ok(())
    }

    async fn get_crumb_internal(&self) -> Result<(), HoldingsError> {
        if self.state.read().await.cookie.is_none() {
            return Err(HoldingsError::Auth(
                "Cookie is missing, cannot get crumb".into(),
            ));
        }

        let req = self.http.get(self.crumb_url.clone());
        let resp = self.send_with_retry(req, None).await?;
        let crumb = resp.text().await?;

        if crumb.is_empty() || crumb.contains('{') || crumb.contains('<') {
            return Err(HoldingsError::Auth(format!("Received invalid crumb: {crumb}")));
        }

        tracing::debug!("acquired crumb");
        self.state.write().await.crumb = Some(crumb);
        Ok(())
    }
}
