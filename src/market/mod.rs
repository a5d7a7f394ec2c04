//! Market reference enrichment: market cap and price per ticker, optionally
//! sector and industry, looked up in batches with per-ticker failure tolerance.

mod model;

pub use model::{LookupFailure, LookupStage, MarketRef};

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::core::client::{CacheMode, RetryConfig};
use crate::core::{AssetProfile, HoldingsError, MarketClient, MarketQuote, quotes, quotesummary};

/* ---------------- Public API ---------------- */

impl MarketClient {
    /// Quotes for every ticker in `tickers`. Never fails: tickers that could not
    /// be looked up are listed in [`MarketRef::failures`].
    pub async fn enrich<I, S>(&self, tickers: I) -> MarketRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnrichBuilder::new(self).tickers(tickers).fetch().await
    }

    /// Sector and industry for every ticker in `tickers`.
    pub async fn profiles<I, S>(&self, tickers: I) -> MarketRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnrichBuilder::new(self).profiles_for(tickers).fetch().await
    }

    /// Quotes for `tickers` plus profiles for `profile_tickers`, merged per ticker.
    pub async fn enrich_with_profiles<I, S, J, T>(
        &self,
        tickers: I,
        profile_tickers: J,
    ) -> MarketRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        EnrichBuilder::new(self)
            .tickers(tickers)
            .profiles_for(profile_tickers)
            .fetch()
            .await
    }
}

/// Builder for one enrichment pass.
pub struct EnrichBuilder<'a> {
    client: &'a MarketClient,
    tickers: Vec<String>,
    profile_tickers: Vec<String>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl<'a> EnrichBuilder<'a> {
    pub fn new(client: &'a MarketClient) -> Self {
        Self {
            client,
            tickers: Vec::new(),
            profile_tickers: Vec::new(),
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Tickers (local symbols) to fetch quotes for.
    pub fn tickers<I, S>(mut self, syms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers = syms.into_iter().map(Into::into).collect();
        self
    }

    /// Tickers to fetch sector/industry profiles for.
    pub fn profiles_for<I, S>(mut self, syms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile_tickers = syms.into_iter().map(Into::into).collect();
        self
    }

    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Runs the lookups. Partial failures are recorded, never returned as errors.
    #[tracing::instrument(
        skip(self),
        fields(tickers = self.tickers.len(), profiles = self.profile_tickers.len())
    )]
    pub async fn fetch(self) -> MarketRef {
        let mut out = self.fetch_quotes().await;
        if !self.profile_tickers.is_empty() {
            out.merge(self.fetch_profiles().await);
        }
        report_failures(&out);
        out
    }

    /* ---------------- Quotes ---------------- */

    async fn fetch_quotes(&self) -> MarketRef {
        let mut out = MarketRef::new();
        let mut pending = distinct(&self.tickers);
        if pending.is_empty() {
            return out;
        }

        if self.cache_mode == CacheMode::Use {
            let hits = self.client.cached_quotes(&pending).await;
            if !hits.is_empty() {
                tracing::debug!(hits = hits.len(), "quote cache hits");
                pending.retain(|t| !hits.contains_key(t));
                for (t, q) in hits {
                    out.insert(t, q);
                }
            }
        }

        for chunk in pending.chunks(self.client.chunk_size()) {
            match self.batch(chunk).await {
                Ok(mut found) => {
                    for local in chunk {
                        let outcome = Outcome::of(found.remove(local));
                        self.record_quote(&mut out, local.clone(), outcome).await;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        size = chunk.len(),
                        "batch quote failed; looking up tickers one by one"
                    );
                    let results: Vec<(String, Outcome)> =
                        stream::iter(chunk.iter().cloned())
                            .map(|t| async move {
                                let r = self.single(&t).await;
                                (t, r)
                            })
                            .buffer_unordered(self.client.concurrency())
                            .collect()
                            .await;
                    for (t, r) in results {
                        self.record_quote(&mut out, t, r).await;
                    }
                }
            }
        }
        out
    }

    /// One v7 request for `chunk`, keyed back to local symbols.
    async fn batch(&self, chunk: &[String]) -> Result<HashMap<String, MarketQuote>, HoldingsError> {
        let symbols = self.client.symbols();
        let remote_to_local: HashMap<String, &String> = chunk
            .iter()
            .map(|local| (symbols.remote(local).to_ascii_uppercase(), local))
            .collect();
        let remote: Vec<String> = chunk.iter().map(|l| symbols.remote(l)).collect();

        let nodes = bounded(
            self.client,
            quotes::fetch_v7_quotes(self.client, &remote, self.retry_override.as_ref()),
        )
        .await?;

        let mut found = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let Some(sym) = node.symbol.as_deref() else {
                continue;
            };
            if let Some(local) = remote_to_local.get(&sym.to_ascii_uppercase()) {
                found.insert((*local).clone(), MarketQuote::from(node));
            }
        }
        Ok(found)
    }

    async fn single(&self, ticker: &str) -> Outcome {
        let chunk = [ticker.to_string()];
        match self.batch(&chunk).await {
            Ok(mut found) => Outcome::of(found.remove(ticker)),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    /// Only complete quotes are cached; a partial one is kept for this pass
    /// and also recorded as a failure.
    async fn record_quote(&self, out: &mut MarketRef, ticker: String, outcome: Outcome) {
        match outcome {
            Outcome::Found(q) => {
                self.client.cache_quote(&ticker, &q, self.cache_mode).await;
                out.insert(ticker, q);
            }
            Outcome::Partial(q, reason) => {
                out.push_failure(ticker.clone(), LookupStage::Quote, reason);
                out.insert(ticker, q);
            }
            Outcome::Failed(reason) => out.push_failure(ticker, LookupStage::Quote, reason),
        }
    }

    /* ---------------- Profiles ---------------- */

    async fn fetch_profiles(&self) -> MarketRef {
        let results: Vec<(String, Result<AssetProfile, HoldingsError>)> =
            stream::iter(distinct(&self.profile_tickers))
                .map(|t| async move {
                    let r = self.profile(&t).await;
                    (t, r)
                })
                .buffer_unordered(self.client.concurrency())
                .collect()
                .await;

        let mut out = MarketRef::new();
        for (t, r) in results {
            match r {
                Ok(p) => out.set_profile(&t, p.sector, p.industry),
                Err(e) => out.push_failure(t, LookupStage::Profile, e.to_string()),
            }
        }
        out
    }

    async fn profile(&self, ticker: &str) -> Result<AssetProfile, HoldingsError> {
        if self.cache_mode == CacheMode::Use
            && let Some(p) = self.client.cached_profile(ticker).await
        {
            tracing::debug!(ticker, "profile cache hit");
            return Ok(p);
        }

        let remote = self.client.symbols().remote(ticker);
        let p = bounded(
            self.client,
            quotesummary::fetch_asset_profile(self.client, &remote, self.retry_override.as_ref()),
        )
        .await?;
        self.client.cache_profile(ticker, &p, self.cache_mode).await;
        Ok(p)
    }
}

/* ---------------- Internal helpers ---------------- */

/// Runs `fut` under the client's per-lookup time budget.
async fn bounded<T>(
    client: &MarketClient,
    fut: impl Future<Output = Result<T, HoldingsError>>,
) -> Result<T, HoldingsError> {
    let after = client.lookup_timeout();
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| HoldingsError::Timeout { after })?
}

/// What one ticker's quote lookup produced.
#[derive(Debug)]
enum Outcome {
    Found(MarketQuote),
    /// Present in the response without a price; the market cap may still be known.
    Partial(MarketQuote, String),
    Failed(String),
}

impl Outcome {
    fn of(quote: Option<MarketQuote>) -> Self {
        match quote {
            Some(q) if q.price.is_some() => Self::Found(q),
            Some(q) => Self::Partial(q, "no price in response".into()),
            None => Self::Failed("symbol missing from response".into()),
        }
    }
}

fn distinct(tickers: &[String]) -> Vec<String> {
    tickers
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn report_failures(out: &MarketRef) {
    for stage in [LookupStage::Quote, LookupStage::Profile] {
        let failed = out.failed_tickers(stage);
        if !failed.is_empty() {
            tracing::warn!(
                %stage,
                count = failed.len(),
                tickers = %failed.join(", "),
                "market lookups failed"
            );
        }
    }
}
