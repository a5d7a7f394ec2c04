//! Public client surface + builder.
//! Internals are split into `auth` (cookie/crumb), `constants` (UA + defaults) and
//! `retry` (backoff policy and the retrying send loop).

mod auth;
mod constants;
pub mod retry;

pub use retry::{Backoff, CacheMode, RetryConfig};

use crate::core::HoldingsError;
use crate::core::cache::{Clock, DailyCache, SystemClock};
use crate::core::models::{AssetProfile, MarketQuote};
use crate::core::symbols::SymbolMap;
use constants::{
    DEFAULT_BASE_QUOTE_API, DEFAULT_BASE_QUOTE_V7, DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY,
    DEFAULT_COOKIE_URL, DEFAULT_CRUMB_URL, DEFAULT_LOOKUP_TIMEOUT, USER_AGENT,
};
use chrono::NaiveDate;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use url::Url;

#[derive(Debug, Default)]
struct ClientState {
    cookie: Option<String>,
    crumb: Option<String>,
}

#[derive(Debug)]
struct Caches {
    quotes: DailyCache<MarketQuote>,
    profiles: DailyCache<AssetProfile>,
}

/// Client for the market reference service (quotes, market caps, asset profiles).
///
/// Cheap to clone; clones share credentials and the daily cache.
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: Client,
    base_quote_v7: Url,
    base_quote_api: Url,
    cookie_url: Url,
    crumb_url: Url,

    state: Arc<RwLock<ClientState>>,
    credential_fetch_lock: Arc<Mutex<()>>,

    retry: RetryConfig,
    lookup_timeout: Duration,
    chunk_size: usize,
    concurrency: usize,
    symbols: SymbolMap,
    clock: Arc<dyn Clock>,

    cache: Option<Arc<Caches>>,
}

impl Default for MarketClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl MarketClient {
    /// Create a new builder.
    pub fn builder() -> MarketClientBuilder {
        MarketClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_quote_v7(&self) -> &Url {
        &self.base_quote_v7
    }
    pub(crate) fn base_quote_api(&self) -> &Url {
        &self.base_quote_api
    }
    pub(crate) fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }
    pub(crate) fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }
    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }
    pub(crate) fn concurrency(&self) -> usize {
        self.concurrency
    }
    pub(crate) fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }
    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) async fn cached_quotes(
        &self,
        tickers: &[String],
    ) -> std::collections::HashMap<String, MarketQuote> {
        match &self.cache {
            Some(c) => c.quotes.get_many(self.today(), tickers).await,
            None => std::collections::HashMap::new(),
        }
    }

    pub(crate) async fn cache_quote(&self, ticker: &str, quote: &MarketQuote, mode: CacheMode) {
        let Some(c) = &self.cache else { return };
        match mode {
            CacheMode::Use => c.quotes.put(self.today(), ticker, quote.clone()).await,
            CacheMode::Refresh => c.quotes.overwrite(self.today(), ticker, quote.clone()).await,
            CacheMode::Bypass => {}
        }
    }

    pub(crate) async fn cached_profile(&self, ticker: &str) -> Option<AssetProfile> {
        let c = self.cache.as_ref()?;
        c.profiles.get(self.today(), ticker).await
    }

    pub(crate) async fn cache_profile(
        &self,
        ticker: &str,
        profile: &AssetProfile,
        mode: CacheMode,
    ) {
        let Some(c) = &self.cache else { return };
        match mode {
            CacheMode::Use => c.profiles.put(self.today(), ticker, profile.clone()).await,
            CacheMode::Refresh => {
                c.profiles
                    .overwrite(self.today(), ticker, profile.clone())
                    .await;
            }
            CacheMode::Bypass => {}
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct MarketClientBuilder {
    user_agent: Option<String>,
    base_quote_v7: Option<Url>,
    base_quote_api: Option<Url>,
    cookie_url: Option<Url>,
    crumb_url: Option<Url>,

    #[cfg(feature = "test-mode")]
    preauth_cookie: Option<String>,
    #[cfg(feature = "test-mode")]
    preauth_crumb: Option<String>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    lookup_timeout: Option<Duration>,
    chunk_size: Option<usize>,
    concurrency: Option<usize>,
    retry: Option<RetryConfig>,
    symbols: Option<SymbolMap>,
    clock: Option<Arc<dyn Clock>>,
    daily_cache: bool,
}

impl MarketClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the v7 quote API base (e.g., `https://query1.finance.yahoo.com/v7/finance/quote`).
    pub fn base_quote_v7(mut self, url: Url) -> Self {
        self.base_quote_v7 = Some(url);
        self
    }

    /// Override the quoteSummary API base
    /// (e.g., `https://query1.finance.yahoo.com/v10/finance/quoteSummary/`).
    pub fn base_quote_api(mut self, url: Url) -> Self {
        self.base_quote_api = Some(url);
        self
    }

    /// Override the cookie bootstrap URL.
    pub fn cookie_url(mut self, url: Url) -> Self {
        self.cookie_url = Some(url);
        self
    }

    /// Override the crumb URL.
    pub fn crumb_url(mut self, url: Url) -> Self {
        self.crumb_url = Some(url);
        self
    }

    #[cfg(feature = "test-mode")]
    /// Provide pre-auth credentials (bypass cookie/crumb fetch) in tests.
    pub fn preauth(mut self, cookie: impl Into<String>, crumb: impl Into<String>) -> Self {
        self.preauth_cookie = Some(cookie.into());
        self.preauth_crumb = Some(crumb.into());
        self
    }

    /// Set a global HTTP request timeout. Default: none (lookups are still bounded by
    /// [`lookup_timeout`](Self::lookup_timeout)).
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Upper bound for one lookup, including retries. Default: 10 seconds.
    pub fn lookup_timeout(mut self, dur: Duration) -> Self {
        self.lookup_timeout = Some(dur);
        self
    }

    /// Number of symbols per batch quote request. Default: 50.
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n);
        self
    }

    /// Maximum in-flight single-ticker lookups. Default: 4.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = Some(n);
        self
    }

    /// Default retry policy for every request made by this client.
    pub fn retry_policy(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Local → provider symbol conventions. Default: [`SymbolMap::default`].
    pub fn symbol_map(mut self, map: SymbolMap) -> Self {
        self.symbols = Some(map);
        self
    }

    /// Source of the calendar day used by the daily cache. Default: local wall clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Enable the per-ticker cache that is reused until the calendar day changes.
    /// If not set, caching is disabled.
    pub fn daily_cache(mut self, on: bool) -> Self {
        self.daily_cache = on;
        self
    }

    pub fn build(self) -> Result<MarketClient, HoldingsError> {
        let base_quote_v7 = self
            .base_quote_v7
            .unwrap_or(Url::parse(DEFAULT_BASE_QUOTE_V7)?);
        let base_quote_api = self
            .base_quote_api
            .unwrap_or(Url::parse(DEFAULT_BASE_QUOTE_API)?);
        let cookie_url = self.cookie_url.unwrap_or(Url::parse(DEFAULT_COOKIE_URL)?);
        let crumb_url = self.crumb_url.unwrap_or(Url::parse(DEFAULT_CRUMB_URL)?);

        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if chunk_size == 0 || concurrency == 0 {
            return Err(HoldingsError::InvalidParams(
                "chunk size and concurrency must be at least 1".into(),
            ));
        }

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true);

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        let state = ClientState {
            #[cfg(feature = "test-mode")]
            cookie: self.preauth_cookie,
            #[cfg(feature = "test-mode")]
            crumb: self.preauth_crumb,
            ..ClientState::default()
        };

        Ok(MarketClient {
            http,
            base_quote_v7,
            base_quote_api,
            cookie_url,
            crumb_url,
            state: Arc::new(RwLock::new(state)),
            credential_fetch_lock: Arc::new(Mutex::new(())),
            retry: self.retry.unwrap_or_default(),
            lookup_timeout: self.lookup_timeout.unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
            chunk_size,
            concurrency,
            symbols: self.symbols.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cache: self.daily_cache.then(|| {
                Arc::new(Caches {
                    quotes: DailyCache::new(),
                    profiles: DailyCache::new(),
                })
            }),
        })
    }
}
