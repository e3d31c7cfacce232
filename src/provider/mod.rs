//! OHLC provider: owns the current pair and dataset, keeps them fresh.
//!
//! The provider listens for `PairChanged` and `SessionStarted` on an
//! [`EventDispatcher`], fetches through a [`PriceHistorySource`], and
//! announces each new dataset with `RefreshReady`.
//!
//! ```rust,ignore
//! let dispatcher = Arc::new(EventDispatcher::new());
//! let provider = OhlcProvider::builder()
//!     .refresh_interval(Duration::from_secs(60))
//!     .build()?;
//! provider.start(&dispatcher);
//!
//! dispatcher.publish(Event::pair_changed("KMD", "BTC"));
//! // ... later
//! provider.shutdown().await;
//! ```

pub mod scheduler;
pub mod source;

pub use scheduler::SchedulerState;
pub use source::{OhlcRequest, PriceHistorySource, SessionFlag, SessionStatus};

use crate::domain::ohlc::{CandleRecord, OhlcDataset};
use crate::domain::pair::{PairSupport, SupportedPairSet};
use crate::error::RefreshError;
use crate::events::{Event, EventDispatcher, EventKind, ListenerId};
use crate::shared::TickerPair;
use scheduler::Engine;

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Default pause between periodic refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Pause between periodic refreshes.
    pub refresh_interval: Duration,
    /// Pairs the price source serves, in canonical `"base-quote"` form.
    pub supported_pairs: SupportedPairSet,
    /// Root of the price-history API, used when no source is supplied.
    pub price_api_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            supported_pairs: SupportedPairSet::builtin(),
            price_api_url: crate::network::DEFAULT_PRICE_API_URL.to_string(),
        }
    }
}

/// The live OHLC refresh engine.
pub struct OhlcProvider {
    engine: Arc<Engine>,
    listener: ListenerId,
}

impl OhlcProvider {
    pub fn builder() -> OhlcProviderBuilder {
        OhlcProviderBuilder::default()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Subscribe to `PairChanged` and `SessionStarted` on `dispatcher`.
    ///
    /// Events published by the provider go to the same dispatcher.
    pub fn start(&self, dispatcher: &Arc<EventDispatcher>) {
        self.engine.attach(Arc::clone(dispatcher));

        let weak = Arc::downgrade(&self.engine);
        dispatcher.subscribe(EventKind::PairChanged, self.listener, move |event| {
            if let (Some(engine), Event::PairChanged { base, rel }) = (weak.upgrade(), event) {
                engine.on_pair_changed(base, rel);
            }
        });

        let weak = Arc::downgrade(&self.engine);
        dispatcher.subscribe(EventKind::SessionStarted, self.listener, move |_| {
            if let Some(engine) = weak.upgrade() {
                engine.start_worker();
            }
        });
    }

    /// Ordered teardown: unsubscribe, stop the worker, drain pending fetches.
    ///
    /// Nothing touches the dataset or publishes once this returns.
    pub async fn shutdown(&self) {
        if let Some(dispatcher) = self.engine.detach() {
            dispatcher.unsubscribe_all(self.listener);
        }
        self.engine.shutdown().await;
    }

    /// Run one periodic iteration now. Returns whether the dataset changed.
    pub async fn refresh_now(&self) -> bool {
        self.engine.tick().await
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn is_ohlc_data_available(&self) -> bool {
        !self.engine.read().dataset.is_empty()
    }

    /// Candles for `range`; empty if the range is absent.
    pub fn get_ohlc_data(&self, range: &str) -> Vec<CandleRecord> {
        let dataset = Arc::clone(&self.engine.read().dataset);
        dataset.get(range).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// Shared snapshot of the whole dataset.
    pub fn get_all_ohlc_data(&self) -> Arc<OhlcDataset> {
        Arc::clone(&self.engine.read().dataset)
    }

    pub fn is_pair_supported(&self, base: &str, rel: &str) -> PairSupport {
        self.engine.config.supported_pairs.is_pair_supported(base, rel)
    }

    pub fn current_pair(&self) -> TickerPair {
        self.engine.read().pair.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.engine.read().phase
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.engine.config
    }

    pub fn session(&self) -> Arc<dyn SessionStatus> {
        Arc::clone(&self.engine.session)
    }

    /// One-shot fetches not yet drained.
    pub fn pending_task_count(&self) -> usize {
        self.engine.pending_count()
    }

    pub fn is_worker_running(&self) -> bool {
        self.engine.is_worker_running()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.engine.is_exiting()
    }
}

impl Drop for OhlcProvider {
    fn drop(&mut self) {
        if self.engine.is_exiting() {
            return;
        }
        tracing::debug!("OHLC provider dropped without shutdown, aborting tasks");
        if let Some(dispatcher) = self.engine.detach() {
            dispatcher.unsubscribe_all(self.listener);
        }
        self.engine.abort_all();
    }
}

impl std::fmt::Debug for OhlcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.engine.read();
        f.debug_struct("OhlcProvider")
            .field("pair", &state.pair)
            .field("phase", &state.phase)
            .field("ranges", &state.dataset.len())
            .field("listener", &self.listener)
            .finish()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct OhlcProviderBuilder {
    config: ProviderConfig,
    source: Option<Arc<dyn PriceHistorySource>>,
    session: Option<Arc<dyn SessionStatus>>,
    runtime: Option<Handle>,
}

impl OhlcProviderBuilder {
    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    pub fn supported_pairs(mut self, pairs: SupportedPairSet) -> Self {
        self.config.supported_pairs = pairs;
        self
    }

    pub fn price_api_url(mut self, url: &str) -> Self {
        self.config.price_api_url = url.to_string();
        self
    }

    /// Upstream OHLC source. Defaults to the HTTP client when the `http`
    /// feature is on.
    pub fn source(mut self, source: Arc<dyn PriceHistorySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Session-liveness predicate. Defaults to always active.
    pub fn session(mut self, session: Arc<dyn SessionStatus>) -> Self {
        self.session = Some(session);
        self
    }

    /// Runtime that runs the worker and fetch tasks. Defaults to the runtime
    /// `build` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<OhlcProvider, RefreshError> {
        if self.config.refresh_interval.is_zero() {
            return Err(RefreshError::Config(
                "refresh interval must be non-zero".to_string(),
            ));
        }

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                RefreshError::Config(format!("no tokio runtime available: {}", e))
            })?,
        };

        let source = match self.source {
            Some(source) => source,
            None => default_source(&self.config)?,
        };

        let session = self
            .session
            .unwrap_or_else(|| Arc::new(SessionFlag::new(true)));

        Ok(OhlcProvider {
            engine: Arc::new(Engine::new(self.config, source, session, runtime)),
            listener: ListenerId::next(),
        })
    }
}

#[cfg(feature = "http")]
fn default_source(config: &ProviderConfig) -> Result<Arc<dyn PriceHistorySource>, RefreshError> {
    Ok(Arc::new(crate::http::PriceHistoryHttp::new(
        &config.price_api_url,
    )?))
}

#[cfg(not(feature = "http"))]
fn default_source(_config: &ProviderConfig) -> Result<Arc<dyn PriceHistorySource>, RefreshError> {
    Err(RefreshError::Config(
        "no price-history source configured".to_string(),
    ))
}
