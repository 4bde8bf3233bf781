use serde::{Deserialize, Serialize};

use crate::core::{Bar, BarSeries, VisibleRange};

/// Price/volume bounds over the visible window, used to scale the plot area.
///
/// The degenerate all-zero value stands for "no valid bar in the window";
/// downstream rendering guards its own divide-by-range-width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extremums {
    pub price_low: f64,
    pub price_high: f64,
    pub volume_low: f64,
    pub volume_high: f64,
}

impl Extremums {
    #[must_use]
    pub fn price_span(self) -> f64 {
        self.price_high - self.price_low
    }

    #[must_use]
    pub fn volume_span(self) -> f64 {
        self.volume_high - self.volume_low
    }
}

/// Linear scan over the window, skipping placeholder bars.
///
/// O(count), bounded by the visible window rather than the series length.
#[must_use]
pub fn recompute_full(series: &BarSeries, range: VisibleRange) -> Extremums {
    let end = range.end().min(series.len());
    let start = range.start.min(end);

    let mut price_low = f64::INFINITY;
    let mut price_high = f64::NEG_INFINITY;
    let mut volume_low = f64::INFINITY;
    let mut volume_high = f64::NEG_INFINITY;
    let mut any_valid = false;

    for bar in &series.bars()[start..end] {
        if bar.is_placeholder() {
            continue;
        }
        any_valid = true;
        price_low = price_low.min(bar.low);
        price_high = price_high.max(bar.high);
        let volume = bar.volume as f64;
        volume_low = volume_low.min(volume);
        volume_high = volume_high.max(volume);
    }

    if !any_valid {
        return Extremums::default();
    }

    Extremums {
        price_low,
        price_high,
        volume_low,
        volume_high,
    }
}

/// Widen-only merge of a changed in-window bar into existing bounds.
///
/// When the bar that previously set an extreme is replaced by a less extreme
/// one, the old bound is retained until the next full recompute. That keeps
/// the common live-tick path O(1); the stale bound is resolved on the next
/// range change.
#[must_use]
pub fn widen_with_bar(current: Extremums, bar: Bar) -> Extremums {
    if bar.is_placeholder() {
        return current;
    }

    let volume = bar.volume as f64;
    Extremums {
        price_low: current.price_low.min(bar.low),
        price_high: current.price_high.max(bar.high),
        volume_low: current.volume_low.min(volume),
        volume_high: current.volume_high.max(volume),
    }
}

#[cfg(test)]
mod tests {
    use super::{recompute_full, widen_with_bar};
    use crate::core::{Bar, BarSeries, VisibleRange};

    fn bar(time: f64, low: f64, high: f64, volume: i64) -> Bar {
        Bar::new(time, low, high, low, high, volume).expect("valid bar")
    }

    #[test]
    fn full_recompute_skips_placeholder_bars() {
        let mut series = BarSeries::new();
        series.set_bars(vec![
            bar(1.0, 10.0, 12.0, 100),
            Bar::placeholder(2.0),
            bar(3.0, 8.0, 15.0, 50),
        ]);

        let extremums = recompute_full(&series, VisibleRange::new(0, 3));
        assert_eq!(extremums.price_low, 8.0);
        assert_eq!(extremums.price_high, 15.0);
        assert_eq!(extremums.volume_low, 50.0);
        assert_eq!(extremums.volume_high, 100.0);
    }

    #[test]
    fn all_placeholder_window_degenerates_to_zero() {
        let mut series = BarSeries::new();
        series.set_bars(vec![Bar::placeholder(1.0), Bar::placeholder(2.0)]);

        let extremums = recompute_full(&series, VisibleRange::new(0, 2));
        assert_eq!(extremums.price_span(), 0.0);
        assert_eq!(extremums.volume_span(), 0.0);
    }

    #[test]
    fn widen_ignores_placeholder_bars() {
        let mut series = BarSeries::new();
        series.set_bars(vec![bar(1.0, 10.0, 12.0, 100)]);
        let extremums = recompute_full(&series, VisibleRange::new(0, 1));

        let widened = widen_with_bar(extremums, Bar::placeholder(2.0));
        assert_eq!(widened, extremums);
    }
}
