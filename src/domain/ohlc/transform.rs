//! Candle normalization: inversion and moving averages.
//!
//! Inversion runs exactly once per record, before any average is computed, so
//! the averages always describe the orientation the caller will display.

use super::{CandleRecord, OhlcDataset};
use crate::error::TransformError;

/// Windows annotated on every series.
pub const MA_WINDOWS: [usize; 2] = [20, 50];

/// Quote a candle the other way round.
///
/// Each price becomes its reciprocal and the two volume fields trade places.
/// High and low keep their field names.
pub fn invert_candle(record: &CandleRecord) -> Result<CandleRecord, TransformError> {
    let recip = |value: f64, field: &'static str| {
        if value == 0.0 {
            return Err(TransformError::ZeroPrice { field });
        }
        let inverse = 1.0 / value;
        if inverse.is_finite() {
            Ok(inverse)
        } else {
            Err(TransformError::NonFiniteReciprocal { field, value })
        }
    };

    Ok(CandleRecord {
        timestamp: record.timestamp,
        open: recip(record.open, "open")?,
        high: recip(record.high, "high")?,
        low: recip(record.low, "low")?,
        close: recip(record.close, "close")?,
        volume: record.quote_volume,
        quote_volume: record.volume,
        ma_20: record.ma_20,
        ma_50: record.ma_50,
    })
}

/// Trailing mean of `open` for `window` at every index of `series`.
///
/// At index `i` the mean covers the `min(i + 1, window)` records ending at `i`.
/// A running prefix sum keeps this linear in the series length. A zero window
/// yields each record's own open.
pub fn moving_averages(series: &[CandleRecord], window: usize) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(series.len() + 1);
    prefix.push(0.0_f64);

    series
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let running = prefix[i] + record.open;
            prefix.push(running);

            let count = (i + 1).min(window);
            if count == 0 {
                record.open
            } else {
                (prefix[i + 1] - prefix[i + 1 - count]) / count as f64
            }
        })
        .collect()
}

/// Store [`moving_averages`] for `window` on every record. Only the tracked
/// windows (`ma_20`, `ma_50`) have a field to land in.
pub fn annotate_moving_averages(series: &mut [CandleRecord], window: usize) {
    let values = moving_averages(series, window);
    for (record, value) in series.iter_mut().zip(values) {
        record.set_moving_average(window, value);
    }
}

/// Invert (when the pair is only served the other way round) and annotate
/// every range of `dataset`.
///
/// Ranges are processed independently. Any zero price fails the whole
/// dataset; the caller keeps whatever it had before.
pub fn transform_dataset(
    dataset: OhlcDataset,
    is_inverted: bool,
) -> Result<OhlcDataset, TransformError> {
    let mut out = OhlcDataset::new();

    for (range, series) in dataset {
        let mut series = if is_inverted {
            series
                .iter()
                .enumerate()
                .map(|(index, c)| {
                    invert_candle(c).map_err(|e| TransformError::Candle {
                        range: range.to_string(),
                        index,
                        source: Box::new(e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            series
        };

        for window in MA_WINDOWS {
            annotate_moving_averages(&mut series, window);
        }
        out.insert(range, series);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64) -> CandleRecord {
        CandleRecord {
            timestamp: 0,
            open,
            high: open * 2.0,
            low: open / 2.0,
            close: open,
            volume: 3.0,
            quote_volume: 7.0,
            ma_20: 0.0,
            ma_50: 0.0,
        }
    }

    fn series(opens: &[f64]) -> Vec<CandleRecord> {
        opens.iter().copied().map(candle).collect()
    }

    #[test]
    fn test_moving_average_short_series() {
        let mut s = series(&[10.0, 20.0, 30.0]);
        annotate_moving_averages(&mut s, 20);
        let mas: Vec<f64> = s.iter().map(|c| c.ma_20).collect();
        assert_eq!(mas, vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_moving_average_window_slides() {
        let opens: Vec<f64> = (1..=25).map(f64::from).collect();
        let mut s = series(&opens);
        annotate_moving_averages(&mut s, 20);
        // Index 24 covers opens 6..=25.
        let expected = (6..=25).map(f64::from).sum::<f64>() / 20.0;
        assert!((s[24].ma_20 - expected).abs() < 1e-9);
        // Index 19 is the first full window.
        let expected = (1..=20).map(f64::from).sum::<f64>() / 20.0;
        assert!((s[19].ma_20 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_is_idempotent() {
        let mut s = series(&[4.0, 8.0, 1.0, 9.0, 2.5]);
        annotate_moving_averages(&mut s, 20);
        annotate_moving_averages(&mut s, 50);
        let first = s.clone();
        annotate_moving_averages(&mut s, 20);
        annotate_moving_averages(&mut s, 50);
        assert_eq!(first, s);
    }

    #[test]
    fn test_zero_window_falls_back_to_open() {
        let s = series(&[4.0, 8.0, 1.5]);
        assert_eq!(moving_averages(&s, 0), vec![4.0, 8.0, 1.5]);
    }

    #[test]
    fn test_untracked_window_is_not_stored() {
        let mut s = series(&[4.0, 8.0]);
        annotate_moving_averages(&mut s, 3);
        assert_eq!(s[1].ma_20, 0.0);
        assert_eq!(s[1].ma_50, 0.0);
    }

    #[test]
    fn test_moving_averages_match_annotation() {
        let mut s = series(&[10.0, 20.0, 30.0, 40.0]);
        let expected = moving_averages(&s, 2);
        assert_eq!(expected, vec![10.0, 15.0, 25.0, 35.0]);
        annotate_moving_averages(&mut s, 20);
        let stored: Vec<f64> = s.iter().map(|c| c.ma_20).collect();
        assert_eq!(stored, moving_averages(&s, 20));
    }

    #[test]
    fn test_empty_series() {
        let mut s: Vec<CandleRecord> = Vec::new();
        annotate_moving_averages(&mut s, 20);
        assert!(s.is_empty());
    }

    #[test]
    fn test_invert_candle() {
        let c = candle(4.0);
        let inv = invert_candle(&c).unwrap();
        assert_eq!(inv.open, 0.25);
        assert_eq!(inv.high, 0.125);
        assert_eq!(inv.low, 0.5);
        assert_eq!(inv.close, 0.25);
        assert_eq!(inv.volume, 7.0);
        assert_eq!(inv.quote_volume, 3.0);
    }

    #[test]
    fn test_invert_round_trip() {
        let c = candle(3.0);
        let back = invert_candle(&invert_candle(&c).unwrap()).unwrap();
        assert!((back.open - c.open).abs() < 1e-12);
        assert!((back.high - c.high).abs() < 1e-12);
        assert!((back.low - c.low).abs() < 1e-12);
        assert!((back.close - c.close).abs() < 1e-12);
        assert_eq!(back.volume, c.volume);
        assert_eq!(back.quote_volume, c.quote_volume);
    }

    #[test]
    fn test_invert_subnormal_price_rejected() {
        let mut c = candle(1.0);
        c.open = 1e-310;
        assert_eq!(
            invert_candle(&c).unwrap_err(),
            TransformError::NonFiniteReciprocal { field: "open", value: 1e-310 }
        );

        let mut c = candle(1.0);
        c.close = f64::NAN;
        assert!(matches!(
            invert_candle(&c),
            Err(TransformError::NonFiniteReciprocal { field: "close", .. })
        ));
    }

    #[test]
    fn test_invert_zero_price() {
        let mut c = candle(1.0);
        c.low = 0.0;
        assert_eq!(
            invert_candle(&c).unwrap_err(),
            TransformError::ZeroPrice { field: "low" }
        );
    }

    #[test]
    fn test_transform_dataset_inverts_before_averaging() {
        let mut ds = OhlcDataset::new();
        ds.insert("60", series(&[2.0, 4.0]));
        let out = transform_dataset(ds, true).unwrap();
        let s = out.get("60").unwrap();
        assert_eq!(s[0].open, 0.5);
        assert_eq!(s[1].open, 0.25);
        assert_eq!(s[1].ma_20, 0.375);
        assert_eq!(s[1].ma_50, 0.375);
    }

    #[test]
    fn test_transform_dataset_ranges_are_independent() {
        let mut ds = OhlcDataset::new();
        ds.insert("60", series(&[10.0, 20.0]));
        ds.insert("300", series(&[100.0]));
        let out = transform_dataset(ds, false).unwrap();
        assert_eq!(out.get("60").unwrap()[1].ma_20, 15.0);
        assert_eq!(out.get("300").unwrap()[0].ma_20, 100.0);
    }

    #[test]
    fn test_transform_dataset_zero_price_fails_whole_fetch() {
        let mut ds = OhlcDataset::new();
        ds.insert("60", series(&[1.0, 0.0]));
        let err = transform_dataset(ds, true).unwrap_err();
        match err {
            TransformError::Candle { range, index, source } => {
                assert_eq!(range, "60");
                assert_eq!(index, 1);
                assert_eq!(*source, TransformError::ZeroPrice { field: "open" });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transform_dataset_zero_price_ok_when_direct() {
        let mut ds = OhlcDataset::new();
        ds.insert("60", series(&[0.0, 2.0]));
        let out = transform_dataset(ds, false).unwrap();
        assert_eq!(out.get("60").unwrap()[1].ma_20, 1.0);
    }
}
