//! Domain modules organized as vertical slices.
//!
//! A sub-module holds some of:
//! - `mod.rs`: Rich domain types
//! - `wire.rs`: Raw serde structs matching upstream responses
//! - `convert.rs`: `TryFrom`/`From` conversions with validation
//! - `transform.rs`: Pure data transformations

pub mod ohlc;
pub mod orderbook;
pub mod pair;
