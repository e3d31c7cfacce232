//! HTTP layer: `PriceHistoryHttp` with retry policies.

pub mod client;
pub mod retry;

pub use client::PriceHistoryHttp;
pub use retry::{RetryConfig, RetryPolicy};
