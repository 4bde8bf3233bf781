use std::cmp::Ordering;

use tracing::{trace, warn};

use crate::core::Bar;
use crate::error::{EngineError, EngineResult};

/// Mutation notification produced by realtime series updates.
///
/// Carries the affected index so downstream consumers (extrema, viewport)
/// can react without rescanning the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesChange {
    Appended { index: usize },
    ReplacedLast { index: usize },
}

/// Ordered, timestamp-increasing OHLCV series.
///
/// Append-only except that the last bar may be replaced in place, which is
/// how a live, still-forming period ticks. Timestamps are strictly
/// increasing across distinct bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole series with canonicalized input.
    ///
    /// Non-finite bars are dropped, bars are sorted by time, and equal-time
    /// duplicates collapse last-write-wins.
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        self.bars = canonicalize_bars(bars);
    }

    /// Applies one realtime update:
    /// - appends when `bar.time` is newer than the latest bar
    /// - replaces the latest bar when `bar.time` is equal or the series
    ///   already holds a newer-or-equal forming bar at the tail
    /// - rejects out-of-order updates (`bar.time` older than latest time)
    pub fn apply(&mut self, bar: Bar) -> EngineResult<SeriesChange> {
        if !bar.time.is_finite() {
            return Err(EngineError::InvalidArgument(
                "bar time must be finite".to_owned(),
            ));
        }

        let change = match self
            .bars
            .last()
            .map_or(Ordering::Greater, |last| bar.time.total_cmp(&last.time))
        {
            Ordering::Less => {
                return Err(EngineError::InvalidArgument(
                    "bar update time must be >= latest bar time".to_owned(),
                ));
            }
            Ordering::Equal => {
                let index = self.bars.len() - 1;
                self.bars[index] = bar;
                SeriesChange::ReplacedLast { index }
            }
            Ordering::Greater => {
                self.bars.push(bar);
                SeriesChange::Appended {
                    index: self.bars.len() - 1,
                }
            }
        };

        trace!(count = self.bars.len(), ?change, "apply bar");
        Ok(change)
    }

    /// Replaces the last bar even when the replacement carries a newer
    /// timestamp, the "forming period rolled its close time" case.
    pub fn replace_last(&mut self, bar: Bar) -> EngineResult<SeriesChange> {
        let Some(last) = self.bars.last() else {
            return Err(EngineError::InvalidArgument(
                "cannot replace last bar of an empty series".to_owned(),
            ));
        };
        if !bar.time.is_finite() || bar.time.total_cmp(&last.time) == Ordering::Less {
            return Err(EngineError::InvalidArgument(
                "replacement bar time must be finite and >= latest bar time".to_owned(),
            ));
        }

        let index = self.bars.len() - 1;
        self.bars[index] = bar;
        trace!(index, "replace last bar");
        Ok(SeriesChange::ReplacedLast { index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Bar> {
        self.bars.get(index).copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Bar> {
        self.bars.last().copied()
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

fn canonicalize_bars(mut bars: Vec<Bar>) -> Vec<Bar> {
    let original_len = bars.len();
    bars.retain(|bar| {
        bar.time.is_finite()
            && bar.open.is_finite()
            && bar.high.is_finite()
            && bar.low.is_finite()
            && bar.close.is_finite()
    });
    bars.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    let mut duplicate_count = 0_usize;
    for bar in bars {
        if let Some(last) = deduped.last_mut() {
            if bar.time.total_cmp(&last.time) == Ordering::Equal {
                *last = bar;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(bar);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized bars on set_bars"
        );
    }
    deduped
}
