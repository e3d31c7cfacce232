//! Trading page: action queue pipeline and market selection.
//!
//! [`TradingController`] turns `RefreshReady` and `OrderbookProcessed` events
//! into queued actions, and applies them one at a time when the host calls
//! [`TradingController::process_action`]. Views therefore see updates in the
//! exact order the events were published, on the host's own schedule.

pub mod queue;
pub mod selection;
pub mod views;

pub use queue::{ActionQueue, ProcessOutcome, QueuedAction, TradingAction};
pub use selection::{MarketSelection, SelectorSide};
pub use views::{CandlestickView, MarketSelectorView, OrderbookView, TradingViews};

use crate::domain::orderbook::OrderbookSource;
use crate::events::{Event, EventDispatcher, EventKind, ListenerId};
use crate::network::{DEFAULT_BASE_TICKER, DEFAULT_QUOTE_TICKER};
use crate::provider::{OhlcProvider, SessionStatus};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

struct Inner {
    provider: Arc<OhlcProvider>,
    session: Arc<dyn SessionStatus>,
    orderbook: Arc<dyn OrderbookSource>,
    views: TradingViews,
    queue: ActionQueue,
    selection: Mutex<MarketSelection>,
    exiting: AtomicBool,
    dispatcher: RwLock<Option<Arc<EventDispatcher>>>,
}

impl Inner {
    fn enqueue(&self, action: TradingAction, is_reset: bool) {
        if self.exiting.load(Ordering::SeqCst) {
            return;
        }
        self.queue.push(QueuedAction::new(action, is_reset));
    }

    fn selection(&self) -> MutexGuard<'_, MarketSelection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatcher(&self) -> Option<Arc<EventDispatcher>> {
        self.dispatcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Owns the action queue and the left/right market selection.
pub struct TradingController {
    inner: Arc<Inner>,
    listener: ListenerId,
}

impl TradingController {
    /// The session predicate is taken from `provider`.
    pub fn new(
        provider: Arc<OhlcProvider>,
        orderbook: Arc<dyn OrderbookSource>,
        views: TradingViews,
    ) -> Self {
        let session = provider.session();
        Self {
            inner: Arc::new(Inner {
                provider,
                session,
                orderbook,
                views,
                queue: ActionQueue::new(),
                selection: Mutex::new(MarketSelection::default()),
                exiting: AtomicBool::new(false),
                dispatcher: RwLock::new(None),
            }),
            listener: ListenerId::next(),
        }
    }

    // ── Signals ──────────────────────────────────────────────────────────

    /// Subscribe to `RefreshReady`, `OrderbookProcessed` and `FetchStarted`.
    pub fn connect(&self, dispatcher: &Arc<EventDispatcher>) {
        *self
            .inner
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(dispatcher));

        let weak = Arc::downgrade(&self.inner);
        dispatcher.subscribe(EventKind::RefreshReady, self.listener, move |event| {
            if let (Some(inner), Event::RefreshReady { is_reset }) = (weak.upgrade(), event) {
                inner.enqueue(TradingAction::RefreshOhlc, *is_reset);
            }
        });

        let weak = Arc::downgrade(&self.inner);
        dispatcher.subscribe(EventKind::OrderbookProcessed, self.listener, move |event| {
            if let (Some(inner), Event::OrderbookProcessed { is_reset }) = (weak.upgrade(), event) {
                inner.enqueue(TradingAction::PostProcessOrderbookFinished, *is_reset);
            }
        });

        let weak = Arc::downgrade(&self.inner);
        dispatcher.subscribe(EventKind::FetchStarted, self.listener, move |event| {
            if let (Some(inner), Event::FetchStarted { is_reset }) = (weak.upgrade(), event) {
                inner.views.chart.set_is_currently_fetching(*is_reset);
            }
        });
    }

    pub fn disconnect(&self) {
        let dispatcher = self
            .inner
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(dispatcher) = dispatcher {
            dispatcher.unsubscribe_all(self.listener);
        }
    }

    // ── Market selection ─────────────────────────────────────────────────

    /// Select `base`/`rel` and announce the change.
    pub fn set_current_pair(&self, base: &str, rel: &str) {
        let support = self.inner.provider.is_pair_supported(base, rel);
        self.inner
            .views
            .chart
            .set_is_pair_supported(support.is_supported());

        self.inner.selection().set(base, rel);
        self.inner.views.selector.set_left_selected_coin(base);
        self.inner.views.selector.set_right_selected_coin(rel);

        match self.inner.dispatcher() {
            Some(dispatcher) => dispatcher.publish(Event::pair_changed(base, rel)),
            None => tracing::debug!(base, rel, "controller not connected, pair change not published"),
        }
    }

    /// Select the current pair the other way round.
    pub fn swap_market_pair(&self) {
        let swapped = self.inner.selection().swapped();
        self.set_current_pair(swapped.left(), swapped.right());
    }

    /// A coin was disabled. If it is part of the selection fall back to the
    /// default pair, then re-select so the provider and views resync.
    pub fn disable_coin(&self, ticker: &str) {
        let selection = {
            let mut selection = self.inner.selection();
            if let Some(side) = selection.side_of(ticker) {
                tracing::debug!(ticker, ?side, "disabled coin was selected, falling back to default pair");
                selection.set(DEFAULT_BASE_TICKER, DEFAULT_QUOTE_TICKER);
            }
            selection.clone()
        };
        self.set_current_pair(selection.left(), selection.right());
    }

    pub fn selection(&self) -> MarketSelection {
        self.inner.selection().clone()
    }

    pub fn clear_models(&self) {
        self.inner.views.selector.reset();
    }

    // ── Action queue ─────────────────────────────────────────────────────

    /// Apply at most one queued action.
    ///
    /// Does nothing while the host is exiting or the session is down; in the
    /// latter case the head entry stays queued for the next call.
    pub async fn process_action(&self) -> ProcessOutcome {
        let inner = &self.inner;
        if inner.exiting.load(Ordering::SeqCst) {
            return ProcessOutcome::Exiting;
        }
        if inner.queue.is_empty() {
            return ProcessOutcome::Empty;
        }
        if !inner.session.is_session_active() {
            return ProcessOutcome::SessionInactive;
        }

        let Some(entry) = inner.queue.pop() else {
            return ProcessOutcome::Empty;
        };

        match entry.action {
            TradingAction::RefreshOhlc => {
                if entry.is_reset {
                    inner.views.chart.init_data();
                    ProcessOutcome::ChartInitialized
                } else {
                    inner.views.chart.update_data();
                    ProcessOutcome::ChartUpdated
                }
            }
            TradingAction::PostProcessOrderbookFinished => {
                match inner.orderbook.current_orderbook().await {
                    Ok(snapshot) if entry.is_reset => {
                        inner.views.orderbook.reset_orderbook(&snapshot);
                        ProcessOutcome::OrderbookReset
                    }
                    Ok(snapshot) => {
                        inner.views.orderbook.refresh_orderbook(&snapshot);
                        ProcessOutcome::OrderbookRefreshed
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "orderbook query failed, skipping view update");
                        ProcessOutcome::OrderbookFailed(e)
                    }
                }
            }
        }
    }

    /// Call [`process_action`](Self::process_action) until nothing more is
    /// consumed. Returns the outcomes of the consumed entries.
    pub async fn process_pending(&self) -> Vec<ProcessOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.process_action().await;
            if !outcome.consumed() {
                break;
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn pending_actions(&self) -> Vec<QueuedAction> {
        self.inner.queue.snapshot()
    }

    // ── Exit ─────────────────────────────────────────────────────────────

    /// Stop accepting and processing actions.
    pub fn set_exiting(&self) {
        self.inner.exiting.store(true, Ordering::SeqCst);
    }

    pub fn is_exiting(&self) -> bool {
        self.inner.exiting.load(Ordering::SeqCst)
    }

    /// Exit, unsubscribe, and drop whatever is still queued.
    pub fn shutdown(&self) {
        self.set_exiting();
        self.disconnect();
        let dropped = self.inner.queue.drain();
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "dropping queued trading actions");
        }
    }
}

impl Drop for TradingController {
    fn drop(&mut self) {
        self.disconnect();
    }
}
