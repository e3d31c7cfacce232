//! HTTP price-history source: `PriceHistoryHttp`.
//!
//! One method per endpoint, returning wire types. The [`PriceHistorySource`]
//! impl converts to domain types at the boundary.

use crate::domain::ohlc::wire::{OhlcRequest, OhlcResponse};
use crate::domain::ohlc::OhlcDataset;
use crate::domain::pair::SupportedPairSet;
use crate::error::FetchError;
use crate::http::retry::RetryPolicy;
use crate::provider::PriceHistorySource;

use async_lock::RwLock;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Client for the price-history REST API.
#[derive(Clone)]
pub struct PriceHistoryHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    /// Last `tickers_list` answer. The list changes rarely.
    pairs_cache: Arc<RwLock<Option<SupportedPairSet>>>,
}

impl PriceHistoryHttp {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
            pairs_cache: Arc::new(RwLock::new(None)),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the OHLC endpoint for `request`.
    pub fn ohlc_url(&self, request: &OhlcRequest) -> String {
        format!(
            "{}/ohlc/{}-{}",
            self.base_url,
            urlencoding::encode(&request.base_asset),
            urlencoding::encode(&request.quote_asset)
        )
    }

    // ── Endpoints ────────────────────────────────────────────────────────

    pub async fn get_ohlc(&self, request: &OhlcRequest) -> Result<OhlcResponse, FetchError> {
        self.get(&self.ohlc_url(request)).await
    }

    /// Pairs the backend serves. Cached after the first success.
    pub async fn supported_pairs(&self) -> Result<SupportedPairSet, FetchError> {
        if let Some(cached) = self.pairs_cache.read().await.as_ref() {
            return Ok(cached.clone());
        }
        self.refresh_supported_pairs().await
    }

    /// Refetch the pair list, bypassing the cache.
    pub async fn refresh_supported_pairs(&self) -> Result<SupportedPairSet, FetchError> {
        let url = format!("{}/tickers_list", self.base_url);
        let pairs: SupportedPairSet = self.get(&url).await?;
        *self.pairs_cache.write().await = Some(pairs.clone());
        Ok(pairs)
    }

    // ── Internal ─────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let Some(config) = self.retry.config() else {
            return self.do_get(url).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            let err = match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };

            let retryable = match &err {
                FetchError::Server { status, .. } => config.is_retryable_status(*status),
                FetchError::RateLimited { retry_after_ms } => {
                    if let Some(ms) = retry_after_ms {
                        futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                    }
                    config.is_retryable_status(429)
                }
                FetchError::Reqwest(re) => re.is_connect() || re.is_timeout() || re.is_request(),
                _ => false,
            };
            if !retryable {
                return Err(err);
            }

            if attempt < config.max_retries {
                let delay = config.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    max = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "retrying {}",
                    url
                );
                futures_timer::Delay::new(delay).await;
            }
            last_error = Some(err);
        }

        Err(FetchError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();

        if status.is_success() {
            let body = resp.bytes().await?;
            return serde_json::from_slice(&body)
                .map_err(|e| FetchError::Malformed(e.to_string()));
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body = resp.text().await.unwrap_or_default();

        Err(match status.as_u16() {
            404 => FetchError::NotFound(body),
            429 => FetchError::RateLimited { retry_after_ms },
            code => FetchError::Server { status: code, body },
        })
    }
}

#[async_trait]
impl PriceHistorySource for PriceHistoryHttp {
    async fn fetch_ohlc(&self, request: OhlcRequest) -> Result<OhlcDataset, FetchError> {
        let resp = self.get_ohlc(&request).await?;
        OhlcDataset::try_from(resp)
    }
}

impl std::fmt::Debug for PriceHistoryHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceHistoryHttp")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let http = PriceHistoryHttp::new("https://example.com/api/v1/").unwrap();
        assert_eq!(http.base_url(), "https://example.com/api/v1");
    }

    #[test]
    fn test_ohlc_url() {
        let http = PriceHistoryHttp::new("https://example.com/api/v1").unwrap();
        let url = http.ohlc_url(&OhlcRequest::new("KMD", "BTC"));
        assert_eq!(url, "https://example.com/api/v1/ohlc/kmd-btc");
    }

    #[test]
    fn test_ohlc_url_encodes_tickers() {
        let http = PriceHistoryHttp::new("https://example.com").unwrap();
        let url = http.ohlc_url(&OhlcRequest::new("usdc bep20", "btc"));
        assert_eq!(url, "https://example.com/ohlc/usdc%20bep20-btc");
    }

    #[tokio::test]
    #[ignore = "hits the live price API"]
    async fn test_live_fetch() {
        let http = PriceHistoryHttp::new(crate::network::DEFAULT_PRICE_API_URL).unwrap();
        let ds = http.fetch_ohlc(OhlcRequest::new("kmd", "btc")).await.unwrap();
        assert!(!ds.is_empty());
    }
}
