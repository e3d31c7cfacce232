//! Fetch scheduling: pair switches, the periodic worker, pending one-shot
//! fetches, and ordered teardown.
//!
//! All mutable provider state lives in one [`ProviderState`] behind one
//! `RwLock`. The lock is only ever taken inside synchronous sections; no guard
//! survives an `.await`.

use super::source::{OhlcRequest, PriceHistorySource, SessionStatus};
use super::ProviderConfig;
use crate::domain::ohlc::{transform_dataset, OhlcDataset};
use crate::domain::pair::PairSupport;
use crate::error::{RefreshError, RefreshResult};
use crate::events::{Event, EventDispatcher};
use crate::shared::TickerPair;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Where the provider is in its fetch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No data, or no pair, and nothing in flight.
    #[default]
    Idle,
    /// An upstream call is in flight.
    Fetching,
    /// The dataset holds data for the current pair.
    Ready,
}

/// The single lock-protected record. Replaced field-wise under the write lock;
/// readers always see a pair and dataset that belong together.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProviderState {
    pub(crate) pair: TickerPair,
    pub(crate) dataset: Arc<OhlcDataset>,
    pub(crate) phase: SchedulerState,
    /// Bumped on every pair change. Results carrying an older epoch are dropped.
    pub(crate) epoch: u64,
    /// Sequence number of the fetch whose result is in `dataset`.
    pub(crate) applied_seq: u64,
}

pub(crate) struct Engine {
    pub(crate) config: ProviderConfig,
    source: Arc<dyn PriceHistorySource>,
    pub(crate) session: Arc<dyn SessionStatus>,
    runtime: Handle,
    state: RwLock<ProviderState>,
    pending: Mutex<VecDeque<JoinHandle<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dispatcher: RwLock<Option<Arc<EventDispatcher>>>,
    exiting: AtomicBool,
    shutdown: Notify,
    /// Handed out in fetch start order.
    fetch_seq: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Upstream request for `pair` in the orientation the source serves, and
/// whether the answer must be inverted.
fn request_for(pair: &TickerPair, support: PairSupport) -> RefreshResult<(OhlcRequest, bool)> {
    if !support.is_supported() {
        return Err(RefreshError::UnsupportedPair {
            base: pair.base().to_string(),
            rel: pair.quote().to_string(),
        });
    }
    let inverted = support.needs_inversion();
    let request = if inverted {
        OhlcRequest::new(pair.quote(), pair.base())
    } else {
        OhlcRequest::new(pair.base(), pair.quote())
    };
    Ok((request, inverted))
}

impl Engine {
    pub(crate) fn new(
        config: ProviderConfig,
        source: Arc<dyn PriceHistorySource>,
        session: Arc<dyn SessionStatus>,
        runtime: Handle,
    ) -> Self {
        Self {
            config,
            source,
            session,
            runtime,
            state: RwLock::new(ProviderState::default()),
            pending: Mutex::new(VecDeque::new()),
            worker: Mutex::new(None),
            dispatcher: RwLock::new(None),
            exiting: AtomicBool::new(false),
            shutdown: Notify::new(),
            fetch_seq: AtomicU64::new(0),
        }
    }

    // ── State access ─────────────────────────────────────────────────────

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ProviderState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProviderState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` only if no pair change happened since `epoch` and the
    /// provider is not shutting down.
    fn update_if_current(&self, epoch: u64, f: impl FnOnce(&mut ProviderState)) -> bool {
        let mut state = self.write();
        if self.is_exiting() || state.epoch != epoch {
            return false;
        }
        f(&mut state);
        true
    }

    pub(crate) fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }

    pub(crate) fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub(crate) fn is_worker_running(&self) -> bool {
        lock(&self.worker).is_some()
    }

    // ── Dispatcher wiring ────────────────────────────────────────────────

    pub(crate) fn attach(&self, dispatcher: Arc<EventDispatcher>) {
        *self
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(dispatcher);
    }

    pub(crate) fn detach(&self) -> Option<Arc<EventDispatcher>> {
        self.dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn publish(&self, event: Event) {
        let dispatcher = self
            .dispatcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(dispatcher) = dispatcher {
            dispatcher.publish(event);
        }
    }

    // ── Pair switch ──────────────────────────────────────────────────────

    /// Handle a `PairChanged` event.
    ///
    /// A supported pair empties the dataset and queues a one-shot reset fetch.
    /// An unsupported pair empties both pair and dataset and still announces
    /// a reset refresh so consumers clear their charts.
    ///
    /// The pending lock is held from the exiting check to the push. `shutdown`
    /// raises the flag before it takes that lock, so every handle pushed here
    /// is seen by its drain.
    pub(crate) fn on_pair_changed(self: &Arc<Self>, base: &str, rel: &str) {
        let pair = TickerPair::new(base, rel);
        let support = self.config.supported_pairs.resolve(&pair);

        let mut pending = lock(&self.pending);
        if self.is_exiting() {
            return;
        }

        let epoch = {
            let mut state = self.write();
            if self.is_exiting() {
                return;
            }
            state.epoch += 1;
            state.dataset = Arc::new(OhlcDataset::new());
            if support.is_supported() {
                state.pair = pair.clone();
                state.phase = SchedulerState::Fetching;
            } else {
                state.pair = TickerPair::empty();
                state.phase = SchedulerState::Idle;
            }
            state.epoch
        };

        if !support.is_supported() {
            drop(pending);
            tracing::warn!(%pair, "pair not served by the price source, clearing OHLC data");
            self.publish(Event::RefreshReady { is_reset: true });
            return;
        }

        tracing::debug!(%pair, inverted = support.needs_inversion(), "new pair for OHLC provider");
        let engine = Arc::clone(self);
        let handle = self.runtime.spawn(async move {
            engine.fetch(pair, support, true, epoch).await;
        });

        pending.retain(|h| !h.is_finished());
        pending.push_back(handle);
    }

    // ── Fetch ────────────────────────────────────────────────────────────

    /// One upstream round trip: announce, query, transform, swap, announce.
    ///
    /// Returns whether the dataset was replaced. A result is applied only if
    /// its pair is still current and no later-started fetch has landed first.
    pub(crate) async fn fetch(
        self: &Arc<Self>,
        pair: TickerPair,
        support: PairSupport,
        is_reset: bool,
        epoch: u64,
    ) -> bool {
        let (request, inverted) = match request_for(&pair, support) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "skipping OHLC fetch");
                return false;
            }
        };
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;

        self.publish(Event::FetchStarted { is_reset });
        self.update_if_current(epoch, |state| state.phase = SchedulerState::Fetching);
        tracing::info!(%pair, inverted, seq, "fetching OHLC data");

        match self.load(request, inverted).await {
            Ok(dataset) => {
                let applied = self.apply(epoch, seq, Arc::new(dataset));
                if applied {
                    self.publish(Event::RefreshReady { is_reset });
                } else {
                    tracing::debug!(%pair, seq, "discarding superseded OHLC result");
                }
                applied
            }
            Err(e) => {
                tracing::error!(%pair, error = %e, "OHLC refresh failed");
                self.update_if_current(epoch, |state| {
                    state.phase = if state.dataset.is_empty() {
                        SchedulerState::Idle
                    } else {
                        SchedulerState::Ready
                    };
                });
                false
            }
        }
    }

    async fn load(&self, request: OhlcRequest, inverted: bool) -> RefreshResult<OhlcDataset> {
        let raw = self.source.fetch_ohlc(request).await?;
        Ok(transform_dataset(raw, inverted)?)
    }

    /// Swap in `dataset` if `epoch` is current, `seq` is newer than the
    /// applied result, and shutdown has not begun.
    fn apply(&self, epoch: u64, seq: u64, dataset: Arc<OhlcDataset>) -> bool {
        let mut state = self.write();
        if self.is_exiting() || state.epoch != epoch || seq <= state.applied_seq {
            return false;
        }
        state.dataset = dataset;
        state.phase = SchedulerState::Ready;
        state.applied_seq = seq;
        true
    }

    /// One periodic iteration. No-op without a pair or an active session, or
    /// while a fetch for the current pair is still in flight.
    pub(crate) async fn tick(self: &Arc<Self>) -> bool {
        let (pair, epoch, phase) = {
            let state = self.read();
            (state.pair.clone(), state.epoch, state.phase)
        };

        if self.is_exiting() || pair.is_empty() || !self.session.is_session_active() {
            tracing::debug!("nothing to refresh, sleeping");
            return false;
        }
        if phase == SchedulerState::Fetching {
            tracing::debug!(%pair, "OHLC fetch already in flight, skipping tick");
            return false;
        }

        let support = self.config.supported_pairs.resolve(&pair);
        self.fetch(pair, support, false, epoch).await
    }

    // ── Periodic worker ──────────────────────────────────────────────────

    /// Spawn the periodic worker. Later calls are no-ops.
    pub(crate) fn start_worker(self: &Arc<Self>) {
        // Checked under the worker lock; shutdown raises the flag before taking it.
        let mut worker = lock(&self.worker);
        if self.is_exiting() {
            return;
        }
        if worker.is_some() {
            tracing::debug!("OHLC refresh worker already running");
            return;
        }

        let engine = Arc::clone(self);
        let interval = self.config.refresh_interval;
        *worker = Some(self.runtime.spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "OHLC refresh worker started");
            loop {
                engine.tick().await;
                tokio::select! {
                    _ = engine.shutdown.notified() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::info!("OHLC refresh worker stopped");
        }));
    }

    // ── Teardown ─────────────────────────────────────────────────────────

    /// Stop the worker, then await every pending one-shot fetch in submission
    /// order. In-flight fetches are not cancelled; their results are dropped.
    pub(crate) async fn shutdown(&self) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_one();

        let worker = lock(&self.worker).take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "OHLC refresh worker ended abnormally");
            }
        }

        loop {
            let next = lock(&self.pending).pop_front();
            let Some(handle) = next else { break };
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "pending OHLC fetch ended abnormally");
            }
        }

        tracing::info!("OHLC provider stopped");
    }

    /// Abort everything still running. Used when the provider is dropped
    /// without an awaited shutdown.
    pub(crate) fn abort_all(&self) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_one();
        if let Some(handle) = lock(&self.worker).take() {
            handle.abort();
        }
        for handle in lock(&self.pending).drain(..) {
            handle.abort();
        }
    }
}
