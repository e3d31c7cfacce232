//! Collaborators the provider depends on: the upstream OHLC source and the
//! session-liveness predicate.

use crate::domain::ohlc::OhlcDataset;
use crate::error::FetchError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

pub use crate::domain::ohlc::wire::OhlcRequest;

/// Upstream price-history query.
///
/// The request is already in the orientation the backend serves; inversion
/// happens after the call returns.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn fetch_ohlc(&self, request: OhlcRequest) -> Result<OhlcDataset, FetchError>;
}

/// Whether the trading session is currently running.
///
/// Periodic refresh and action processing are no-ops while this is false.
pub trait SessionStatus: Send + Sync {
    fn is_session_active(&self) -> bool;
}

/// Atomic [`SessionStatus`] the host flips when its session starts or stops.
#[derive(Debug, Default)]
pub struct SessionFlag {
    active: AtomicBool,
}

impl SessionFlag {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl SessionStatus for SessionFlag {
    fn is_session_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
