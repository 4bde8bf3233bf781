use chrono::{DateTime, Datelike, Timelike, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BarGeometry, BarSeries, VisibleRange, bar::unix_seconds_to_datetime};

/// One axis tick: a raw value and the pixel position its label anchors to.
///
/// `major` marks calendar escalation boundaries on the time axis (day
/// boundaries between hour ticks, month boundaries between day ticks) so
/// collision thinning can prefer them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub pixel: f64,
    pub major: bool,
}

/// Render-pass-scoped tick collection; regenerated every pass, never persisted.
pub type TickSet = SmallVec<[Tick; 16]>;

/// Calendar granularity selected for time-axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeTickUnit {
    /// Hour ticks with day-boundary majors.
    Hour,
    /// Day ticks with month-boundary majors.
    Day,
    /// Month ticks with year-boundary majors.
    Month,
}

/// Time-axis plan: the granularity plus the ticks themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTickPlan {
    pub unit: TimeTickUnit,
    pub ticks: TickSet,
}

// Fixed ladder of magnitudes for "nice" steps. Values outside it fall back
// to scientific-notation display, which is a formatting concern, not a
// placement one.
const LADDER_MIN_EXPONENT: i32 = -7;
const LADDER_MAX_EXPONENT: i32 = 6;

// Hard ceiling on ticks per axis. No real plot area holds more labels.
const MAX_TICKS_PER_AXIS: usize = 512;

/// Plans round ticks for a numeric (price or volume) axis.
///
/// The step is the raw label-driven step rounded up to a ceiling multiple of
/// the largest `{1,2,5}x10^k` unit not exceeding it; the anchor is the most
/// round value inside the range; ticks walk outward from the anchor in both
/// directions. A zero-width range emits exactly one tick.
#[must_use]
pub fn plan_value_ticks(
    range_low: f64,
    range_high: f64,
    axis_span_px: f64,
    label_extent_px: f64,
    label_gap_px: f64,
) -> TickSet {
    let mut ticks = TickSet::new();
    if !range_low.is_finite()
        || !range_high.is_finite()
        || !axis_span_px.is_finite()
        || axis_span_px <= 0.0
        || !label_extent_px.is_finite()
        || label_extent_px <= 0.0
        || !label_gap_px.is_finite()
        || label_gap_px < 0.0
    {
        return ticks;
    }

    let (low, high) = if range_low <= range_high {
        (range_low, range_high)
    } else {
        (range_high, range_low)
    };

    let span = high - low;
    if span == 0.0 {
        ticks.push(Tick {
            value: low,
            pixel: axis_span_px / 2.0,
            major: false,
        });
        return ticks;
    }

    let value_per_px = span / axis_span_px;
    let raw_step = (label_extent_px + label_gap_px) * value_per_px;
    let unit = nice_unit_at_most(raw_step);
    let step = (raw_step / unit).ceil() * unit;
    if !step.is_finite() || step <= 0.0 {
        return ticks;
    }

    let anchor = most_round_value_within(low, high);
    let tolerance = step * 1e-9;

    // Walk by index, not by accumulating `step` into the value: at large
    // magnitudes a step below the ULP would leave `value` unchanged and
    // never terminate.
    let mut index = 0_u32;
    loop {
        let value = anchor + f64::from(index) * step;
        if value > high + tolerance || ticks.len() >= MAX_TICKS_PER_AXIS {
            break;
        }
        ticks.push(tick_at(value, low, span, axis_span_px));
        index += 1;
    }
    let mut index = 1_u32;
    loop {
        let value = anchor - f64::from(index) * step;
        if value < low - tolerance || ticks.len() >= MAX_TICKS_PER_AXIS {
            break;
        }
        ticks.push(tick_at(value, low, span, axis_span_px));
        index += 1;
    }

    ticks.sort_by_key(|tick| OrderedFloat(tick.pixel));
    // Offsets that round to the same representable value collapse to one tick.
    ticks.dedup_by(|a, b| a.value == b.value);
    ticks
}

fn tick_at(value: f64, low: f64, span: f64, axis_span_px: f64) -> Tick {
    Tick {
        value,
        pixel: (value - low) / span * axis_span_px,
        major: false,
    }
}

/// Largest `{1,2,5}x10^k` ladder value not exceeding `raw_step`, clamped to
/// the ladder ends.
#[must_use]
pub fn nice_unit_at_most(raw_step: f64) -> f64 {
    let floor = 10_f64.powi(LADDER_MIN_EXPONENT);
    if !raw_step.is_finite() || raw_step <= floor {
        return floor;
    }

    let mut best = floor;
    for exponent in LADDER_MIN_EXPONENT..=LADDER_MAX_EXPONENT {
        let decade = 10_f64.powi(exponent);
        for multiplier in [1.0, 2.0, 5.0] {
            let candidate = decade * multiplier;
            if candidate <= raw_step {
                best = best.max(candidate);
            }
        }
    }
    best
}

/// The most round value inside `[low, high]`: the lower bound ceiled to the
/// coarsest power of ten whose ceiling still fits under the upper bound.
#[must_use]
pub fn most_round_value_within(low: f64, high: f64) -> f64 {
    let mut anchor = low;
    for exponent in LADDER_MIN_EXPONENT..=LADDER_MAX_EXPONENT {
        let power = 10_f64.powi(exponent);
        let candidate = (low / power).ceil() * power;
        if candidate <= high {
            anchor = candidate;
        } else {
            break;
        }
    }
    anchor
}

/// Plans calendar-boundary ticks for the time axis over the visible window.
///
/// The granularity escalates with the pixel width a label needs at the
/// current bar geometry: sub-day label spans get hour ticks, sub-month spans
/// get day ticks, anything coarser gets month ticks. Boundary candidates are
/// thinned to the label spacing, preferring majors on collision.
#[must_use]
pub fn plan_time_ticks(
    series: &BarSeries,
    range: VisibleRange,
    geometry: BarGeometry,
    label_extent_px: f64,
    label_gap_px: f64,
) -> TimeTickPlan {
    let mut plan = TimeTickPlan {
        unit: TimeTickUnit::Hour,
        ticks: TickSet::new(),
    };

    let end = range.end().min(series.len());
    let start = range.start.min(end);
    let count = end - start;
    if count == 0 || !label_extent_px.is_finite() || label_extent_px <= 0.0 {
        return plan;
    }

    let slot = geometry.slot_width();
    if !slot.is_finite() || slot <= 0.0 {
        return plan;
    }

    let min_spacing_px = label_extent_px + label_gap_px.max(0.0);
    let bars_per_label = (min_spacing_px / slot).ceil().max(1.0);

    let bars = series.bars();
    let bar_interval = if count > 1 {
        (bars[end - 1].time - bars[start].time) / (count - 1) as f64
    } else {
        0.0
    };
    let seconds_per_label = bars_per_label * bar_interval;

    plan.unit = if seconds_per_label < 86_400.0 {
        TimeTickUnit::Hour
    } else if seconds_per_label < 28.0 * 86_400.0 {
        TimeTickUnit::Day
    } else {
        TimeTickUnit::Month
    };

    let mut previous: Option<DateTime<Utc>> = if start > 0 {
        unix_seconds_to_datetime(bars[start - 1].time)
    } else {
        None
    };

    let mut candidates = TickSet::new();
    for (offset, bar) in bars[start..end].iter().enumerate() {
        let Some(moment) = unix_seconds_to_datetime(bar.time) else {
            continue;
        };
        let crossing = match previous {
            Some(prev) => boundary_kind(plan.unit, prev, moment),
            // A window-leading bar with no predecessor anchors the axis.
            None => Some(false),
        };
        previous = Some(moment);

        if let Some(major) = crossing {
            candidates.push(Tick {
                value: bar.time,
                pixel: offset as f64 * slot + geometry.bar_width / 2.0,
                major,
            });
        }
    }

    plan.ticks = thin_with_min_spacing(candidates, min_spacing_px);
    plan
}

/// Detects a boundary crossing of `unit` between two consecutive bars.
///
/// Returns `None` when no boundary was crossed, `Some(major)` otherwise,
/// where `major` marks the next-coarser unit also changing.
fn boundary_kind(unit: TimeTickUnit, prev: DateTime<Utc>, next: DateTime<Utc>) -> Option<bool> {
    match unit {
        TimeTickUnit::Hour => {
            if prev.date_naive() != next.date_naive() {
                Some(true)
            } else if prev.hour() != next.hour() {
                Some(false)
            } else {
                None
            }
        }
        TimeTickUnit::Day => {
            if (prev.year(), prev.month()) != (next.year(), next.month()) {
                Some(true)
            } else if prev.date_naive() != next.date_naive() {
                Some(false)
            } else {
                None
            }
        }
        TimeTickUnit::Month => {
            if prev.year() != next.year() {
                Some(true)
            } else if prev.month() != next.month() {
                Some(false)
            } else {
                None
            }
        }
    }
}

/// Keeps ticks at least `min_spacing_px` apart, preferring majors when
/// candidates collide.
fn thin_with_min_spacing(mut candidates: TickSet, min_spacing_px: f64) -> TickSet {
    if candidates.len() <= 1 || !min_spacing_px.is_finite() || min_spacing_px <= 0.0 {
        return candidates;
    }

    candidates.sort_by_key(|tick| OrderedFloat(tick.pixel));

    let mut selected = TickSet::new();
    selected.push(candidates[0]);
    for tick in candidates.iter().copied().skip(1) {
        let last = selected[selected.len() - 1];
        if tick.pixel - last.pixel >= min_spacing_px {
            selected.push(tick);
            continue;
        }
        // On collision a major may replace a minor, provided the spacing to
        // the tick before it still holds.
        if tick.major && !last.major {
            let fits_before = selected.len() < 2
                || tick.pixel - selected[selected.len() - 2].pixel >= min_spacing_px;
            if fits_before {
                let last_index = selected.len() - 1;
                selected[last_index] = tick;
            }
        }
    }

    selected
}
