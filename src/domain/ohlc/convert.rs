//! Wire → domain conversions for OHLC data.

use super::wire::{OhlcResponse, RawCandle};
use super::{CandleRecord, OhlcDataset};
use crate::error::FetchError;

impl From<RawCandle> for CandleRecord {
    fn from(c: RawCandle) -> Self {
        Self {
            timestamp: c.timestamp,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            quote_volume: c.quote_volume,
            ma_20: 0.0,
            ma_50: 0.0,
        }
    }
}

impl TryFrom<OhlcResponse> for OhlcDataset {
    type Error = FetchError;

    fn try_from(resp: OhlcResponse) -> Result<Self, Self::Error> {
        let mut dataset = OhlcDataset::new();
        for (range, candles) in resp.ranges {
            if let Some((idx, _)) = candles.iter().enumerate().find(|(_, c)| !is_finite(c)) {
                return Err(FetchError::Malformed(format!(
                    "non-finite value in range {} at candle {}",
                    range, idx
                )));
            }
            dataset.insert(range, candles.into_iter().map(CandleRecord::from).collect());
        }
        Ok(dataset)
    }
}

fn is_finite(c: &RawCandle) -> bool {
    [c.open, c.high, c.low, c.close, c.volume, c.quote_volume]
        .iter()
        .all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_into_dataset() {
        let body = r#"{
            "60": [
                {"timestamp": 60, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10.0, "quote_volume": 15.0},
                {"timestamp": 120, "open": 1.5, "high": 1.6, "low": 1.4, "close": 1.4, "volume": 3.0}
            ],
            "3600": []
        }"#;
        let resp: OhlcResponse = serde_json::from_str(body).unwrap();
        let ds = OhlcDataset::try_from(resp).unwrap();
        assert_eq!(ds.len(), 2);
        let series = ds.get("60").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].quote_volume, 15.0);
        assert_eq!(series[1].quote_volume, 0.0);
        assert_eq!(series[1].timestamp, 120);
        assert!(ds.get("3600").unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_candle_rejected() {
        let mut resp = OhlcResponse::default();
        resp.ranges.insert(
            "60".into(),
            vec![RawCandle {
                timestamp: 0,
                open: f64::NAN,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0.0,
                quote_volume: 0.0,
            }],
        );
        let err = OhlcDataset::try_from(resp).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
