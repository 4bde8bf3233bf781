use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Canonical OHLCV bar: one open/high/low/close/volume observation per period.
///
/// `time` is unix seconds. A bar whose four price fields are all zero is a
/// placeholder for a period that has not loaded yet; placeholders are kept in
/// the series so indices stay stable, but are excluded from precision and
/// extrema statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Builds a validated bar from raw floating values.
    ///
    /// Invariants:
    /// - all price values and `time` are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    /// - `volume >= 0`
    pub fn new(
        time: f64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> EngineResult<Self> {
        if !time.is_finite()
            || !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
        {
            return Err(EngineError::InvalidArgument(
                "bar values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(EngineError::InvalidArgument(
                "bar low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(EngineError::InvalidArgument(
                "bar open/close must be within low/high range".to_owned(),
            ));
        }

        if volume < 0 {
            return Err(EngineError::InvalidArgument(
                "bar volume must be >= 0".to_owned(),
            ));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Builds a placeholder bar carrying only a timestamp.
    #[must_use]
    pub fn placeholder(time: f64) -> Self {
        Self {
            time,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0,
        }
    }

    /// Converts strongly-typed temporal/decimal input into a validated bar.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> EngineResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            volume,
        )
    }

    /// Returns `true` for the all-zero "not yet loaded" placeholder.
    #[must_use]
    pub fn is_placeholder(self) -> bool {
        self.open == 0.0 && self.high == 0.0 && self.low == 0.0 && self.close == 0.0
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> EngineResult<f64> {
    value.to_f64().ok_or_else(|| {
        EngineError::InvalidArgument(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

#[must_use]
pub fn unix_seconds_to_datetime(time: f64) -> Option<DateTime<Utc>> {
    if !time.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis((time * 1000.0).round() as i64)
}
