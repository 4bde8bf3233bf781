use candleview::core::ticks::{
    most_round_value_within, nice_unit_at_most, plan_time_ticks, plan_value_ticks,
};
use candleview::core::{Bar, BarGeometry, BarSeries, TimeTickUnit, VisibleRange};
use chrono::{TimeZone, Utc};

#[test]
fn zero_width_range_emits_a_single_tick_at_the_value() {
    let ticks = plan_value_ticks(100.0, 100.0, 600.0, 14.0, 8.0);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].value, 100.0);
    assert_eq!(ticks[0].pixel, 300.0);
}

#[test]
fn value_ticks_are_evenly_stepped_on_a_nice_unit() {
    let ticks = plan_value_ticks(0.0, 100.0, 600.0, 14.0, 8.0);
    assert!(ticks.len() >= 2);

    let step = ticks[1].value - ticks[0].value;
    for pair in ticks.windows(2) {
        assert!((pair[1].value - pair[0].value - step).abs() < 1e-9);
    }

    // The step itself must be a ceiling multiple of a {1,2,5}x10^k unit.
    let unit = nice_unit_at_most(step);
    let multiple = step / unit;
    assert!((multiple - multiple.round()).abs() < 1e-9);
}

#[test]
fn value_ticks_never_collide_given_the_label_extent() {
    let ticks = plan_value_ticks(97.31, 104.17, 400.0, 14.0, 8.0);
    for pair in ticks.windows(2) {
        assert!(pair[1].pixel - pair[0].pixel >= 22.0 - 1e-6);
    }
}

#[test]
fn anchor_sits_on_the_most_round_value_in_range() {
    assert_eq!(most_round_value_within(97.3, 104.1), 100.0);
    assert!((most_round_value_within(0.0123, 0.0187) - 0.013).abs() < 1e-12);
    assert_eq!(most_round_value_within(-4.2, 7.9), 0.0);
    // Powers coarser than the ladder top are never proposed.
    assert_eq!(most_round_value_within(1.0e7, 9.0e7), 1.0e7);
}

#[test]
fn huge_magnitude_with_tiny_span_terminates_with_bounded_ticks() {
    // Near 1e16 the f64 spacing (2.0) exceeds the nice step (0.4); the walk
    // must still terminate, collapsing offsets that round to the same value.
    let ticks = plan_value_ticks(1.0e16, 1.0e16 + 8.0, 600.0, 14.0, 8.0);
    assert!(!ticks.is_empty());
    assert!(ticks.len() <= 21);
    for pair in ticks.windows(2) {
        assert!(pair[1].value > pair[0].value);
    }
    for tick in ticks.iter() {
        assert!(tick.value >= 1.0e16 - 1.0);
        assert!(tick.value <= 1.0e16 + 9.0);
    }
}

#[test]
fn degenerate_inputs_produce_no_ticks() {
    assert!(plan_value_ticks(f64::NAN, 1.0, 600.0, 14.0, 8.0).is_empty());
    assert!(plan_value_ticks(0.0, 1.0, 0.0, 14.0, 8.0).is_empty());
    assert!(plan_value_ticks(0.0, 1.0, 600.0, 0.0, 8.0).is_empty());
}

fn minute_series(start_minute: i64, count: usize, step_minutes: i64) -> BarSeries {
    let mut series = BarSeries::new();
    series.set_bars(
        (0..count)
            .map(|i| {
                let time = Utc
                    .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
                    .single()
                    .expect("valid date")
                    .timestamp() as f64
                    + (start_minute + i as i64 * step_minutes) as f64 * 60.0;
                Bar::new(time, 10.0, 11.0, 9.0, 10.5, 100).expect("valid bar")
            })
            .collect(),
    );
    series
}

#[test]
fn minute_bars_get_hour_ticks() {
    // 480 one-minute bars: a label spans well under a day of data.
    let series = minute_series(0, 480, 1);
    let geometry = BarGeometry {
        bar_width: 5.0,
        bar_gap: 1.0,
    };
    let plan = plan_time_ticks(
        &series,
        VisibleRange::new(0, series.len()),
        geometry,
        64.0,
        8.0,
    );

    assert_eq!(plan.unit, TimeTickUnit::Hour);
    assert!(!plan.ticks.is_empty());
    // Interior hour boundaries all land on minute zero.
    for tick in plan.ticks.iter().skip(1) {
        assert_eq!((tick.value as i64) % 3_600, 0);
    }
}

#[test]
fn daily_bars_escalate_to_day_ticks_with_month_majors() {
    // 90 daily bars spanning three months.
    let series = minute_series(0, 90, 24 * 60);
    let geometry = BarGeometry {
        bar_width: 5.0,
        bar_gap: 1.0,
    };
    let plan = plan_time_ticks(
        &series,
        VisibleRange::new(0, series.len()),
        geometry,
        64.0,
        8.0,
    );

    assert_eq!(plan.unit, TimeTickUnit::Day);
    assert!(plan.ticks.iter().any(|tick| tick.major));
}

#[test]
fn time_ticks_respect_the_label_spacing() {
    let series = minute_series(0, 480, 1);
    let geometry = BarGeometry {
        bar_width: 5.0,
        bar_gap: 1.0,
    };
    let plan = plan_time_ticks(
        &series,
        VisibleRange::new(0, series.len()),
        geometry,
        64.0,
        8.0,
    );

    for pair in plan.ticks.windows(2) {
        assert!(pair[1].pixel - pair[0].pixel >= 72.0 - 1e-6);
    }
}

#[test]
fn empty_window_produces_no_time_ticks() {
    let series = BarSeries::new();
    let geometry = BarGeometry {
        bar_width: 5.0,
        bar_gap: 1.0,
    };
    let plan = plan_time_ticks(&series, VisibleRange::new(0, 0), geometry, 64.0, 8.0);
    assert!(plan.ticks.is_empty());
}
