use crate::core::BarSeries;

/// Returns the index of the bar whose time most closely brackets `time`.
///
/// Contract over a series sorted by ascending time:
/// - `None` when the series is empty
/// - `0` when `time` precedes the first bar
/// - `len - 1` when `time` follows the last bar
/// - the exact index on an equal timestamp hit
/// - otherwise the upper neighbor after the search interval narrows to two
///   adjacent bars
///
/// O(log n) comparisons, no allocation.
#[must_use]
pub fn locate(series: &BarSeries, time: f64) -> Option<usize> {
    let len = series.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        return Some(0);
    }

    let bars = series.bars();
    if time <= bars[0].time {
        return Some(0);
    }
    if time >= bars[len - 1].time {
        return Some(len - 1);
    }

    let mut lo = 0_usize;
    let mut hi = len - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        let mid_time = bars[mid].time;
        if mid_time == time {
            return Some(mid);
        }
        if mid_time < time {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some(hi)
}

#[cfg(test)]
mod tests {
    use super::locate;
    use crate::core::{Bar, BarSeries};

    fn series_of(times: &[f64]) -> BarSeries {
        let mut series = BarSeries::new();
        series.set_bars(
            times
                .iter()
                .map(|&t| Bar::new(t, 1.0, 2.0, 0.5, 1.5, 1).expect("valid bar"))
                .collect(),
        );
        series
    }

    #[test]
    fn empty_series_yields_none() {
        assert_eq!(locate(&BarSeries::new(), 10.0), None);
    }

    #[test]
    fn single_bar_always_resolves_to_zero() {
        let series = series_of(&[50.0]);
        assert_eq!(locate(&series, 0.0), Some(0));
        assert_eq!(locate(&series, 50.0), Some(0));
        assert_eq!(locate(&series, 99.0), Some(0));
    }

    #[test]
    fn out_of_range_times_snap_to_edges() {
        let series = series_of(&[10.0, 20.0, 30.0]);
        assert_eq!(locate(&series, 5.0), Some(0));
        assert_eq!(locate(&series, 35.0), Some(2));
    }

    #[test]
    fn exact_hit_returns_matching_index() {
        let series = series_of(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(locate(&series, 30.0), Some(2));
    }

    #[test]
    fn interior_miss_returns_upper_bracket() {
        let series = series_of(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(locate(&series, 21.0), Some(2));
        assert_eq!(locate(&series, 39.9), Some(3));
    }
}
