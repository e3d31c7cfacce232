//! # OHLC refresh engine
//!
//! Live candlestick data for a peer-to-peer trading client, plus the
//! single-consumer action pipeline that feeds it to the UI.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Shared newtypes and domain slices: pair resolution, OHLC
//!    candles and their transformation, orderbook snapshots
//! 2. **Events**: `EventDispatcher`, a synchronous typed pub/sub
//! 3. **HTTP**: `PriceHistoryHttp` with retry policies (feature `http`)
//! 4. **Provider**: `OhlcProvider`: pair switches, periodic refresh,
//!    pending-fetch bookkeeping
//! 5. **Trading**: `TradingController`: action queue and market selection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ohlc_refresh::prelude::*;
//!
//! let dispatcher = Arc::new(EventDispatcher::new());
//! let provider = Arc::new(OhlcProvider::builder().build()?);
//! provider.start(&dispatcher);
//!
//! let controller = TradingController::new(provider.clone(), orderbook, views);
//! controller.connect(&dispatcher);
//!
//! dispatcher.publish(Event::SessionStarted);
//! controller.set_current_pair("KMD", "BTC");
//!
//! // On the UI tick:
//! controller.process_action().await;
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network and market constants.
pub mod network;

// ── Layer 2: Events ──────────────────────────────────────────────────────────

/// Event types and the synchronous dispatcher.
pub mod events;

// ── Layer 3: HTTP ────────────────────────────────────────────────────────────

/// HTTP price-history source with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: Provider ────────────────────────────────────────────────────────

/// `OhlcProvider`: the fetch scheduler.
pub mod provider;

// ── Layer 5: Trading ─────────────────────────────────────────────────────────

/// `TradingController`: action queue pipeline.
pub mod trading;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Interval, RangeLabel, TickerPair};

    // Domain types
    pub use crate::domain::ohlc::{
        annotate_moving_averages, invert_candle, moving_averages, transform_dataset, CandleRecord,
        OhlcDataset,
    };
    pub use crate::domain::orderbook::{OrderbookLevel, OrderbookSnapshot, OrderbookSource};
    pub use crate::domain::pair::{PairSupport, SupportedPairSet};

    // Events
    pub use crate::events::{Event, EventDispatcher, EventKind, ListenerId};

    // Provider
    pub use crate::provider::{
        OhlcProvider, OhlcProviderBuilder, OhlcRequest, PriceHistorySource, ProviderConfig,
        SchedulerState, SessionFlag, SessionStatus,
    };

    // Trading
    pub use crate::trading::{
        CandlestickView, MarketSelection, MarketSelectorView, OrderbookView, ProcessOutcome,
        QueuedAction, TradingAction, TradingController, TradingViews,
    };

    // HTTP
    #[cfg(feature = "http")]
    pub use crate::http::{PriceHistoryHttp, RetryConfig, RetryPolicy};

    // Errors
    pub use crate::error::{FetchError, OrderbookError, RefreshError, RefreshResult, TransformError};
}
