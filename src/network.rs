//! Network and market constants.

/// Default base URL of the OHLC price-history API.
pub const DEFAULT_PRICE_API_URL: &str = "https://komodo.live:3333/api/v1";

/// Pairs the price-history API serves when no live list has been fetched.
///
/// Canonical `"base-quote"` form, lower-case.
pub const DEFAULT_SUPPORTED_PAIRS: &[&str] = &[
    "kmd-btc", "kmd-eth", "kmd-usdt", "kmd-usdc", "kmd-busd", "btc-usdt", "btc-usdc",
    "btc-busd", "btc-dai", "eth-btc", "eth-usdt", "eth-usdc", "eth-busd", "eth-dai", "ltc-btc",
    "ltc-usdt", "doge-btc", "doge-usdt", "dash-btc", "dgb-btc", "rvn-btc", "bch-btc", "bch-usdt",
    "zec-btc", "qtum-btc", "bnb-btc", "bnb-usdt", "link-btc", "link-usdt", "bat-btc", "usdc-usdt",
    "busd-usdt", "dai-usdt",
];

/// Pair selected when the current selection becomes unavailable.
pub const DEFAULT_BASE_TICKER: &str = "BTC";
pub const DEFAULT_QUOTE_TICKER: &str = "KMD";
