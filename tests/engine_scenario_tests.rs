use approx::assert_relative_eq;
use candleview::core::{Bar, RangeRequest, SeriesChange, VisibleRange};
use candleview::engine::{ChartEngine, EngineConfig};
use chrono::{Duration, TimeZone, Utc};

/// Deterministic sine-plus-trend reference series: 500 bars, five minutes
/// apart, starting 2010-10-07T10:00Z.
fn reference_bars() -> Vec<Bar> {
    let start = Utc
        .with_ymd_and_hms(2010, 10, 7, 10, 0, 0)
        .single()
        .expect("valid start");

    (0..500)
        .map(|i| {
            let time = start + Duration::minutes(5 * i as i64);
            let phase = i as f64 * 0.07;
            let base = 100.0 + i as f64 * 0.05 + 10.0 * phase.sin();
            let open = base;
            let close = base + 2.0 * (phase * 3.0).sin();
            let high = open.max(close) + 1.5;
            let low = open.min(close) - 1.5;
            let volume = 1_000 + (i as i64 % 37) * 10;
            Bar::new(
                time.timestamp() as f64,
                open,
                high,
                low,
                close,
                volume,
            )
            .expect("valid generated bar")
        })
        .collect()
}

fn engine_800px() -> ChartEngine {
    let config = EngineConfig::new(800.0, 600.0).with_bar_geometry(5.0, 1.0);
    ChartEngine::new(config).expect("engine init")
}

#[test]
fn reference_series_resolves_the_expected_trailing_window() {
    let mut engine = engine_800px();
    engine.set_bars(reference_bars());

    let range = engine.visible_range().expect("window defined");
    assert_eq!(range.count, 133); // floor(800 / (5 + 1))
    assert_eq!(range, VisibleRange::new(367, 133));
}

#[test]
fn reference_series_extremums_match_a_direct_scan_of_the_window() {
    let bars = reference_bars();
    let mut engine = engine_800px();
    engine.set_bars(bars.clone());

    let mut expected_low = f64::INFINITY;
    let mut expected_high = f64::NEG_INFINITY;
    for bar in &bars[367..500] {
        expected_low = expected_low.min(bar.low);
        expected_high = expected_high.max(bar.high);
    }

    let extremums = engine.extremums().expect("extremums defined");
    assert_eq!(extremums.price_low, expected_low);
    assert_eq!(extremums.price_high, expected_high);
}

#[test]
fn tail_append_auto_follows_without_changing_count() {
    let bars = reference_bars();
    let last_time = bars.last().expect("bars").time;
    let mut engine = engine_800px();
    engine.set_bars(bars);

    let before = engine.visible_range().expect("window defined");
    assert_eq!(before.end(), 500);

    let appended = Bar::new(last_time + 300.0, 120.0, 121.0, 119.0, 120.5, 900)
        .expect("valid bar");
    let change = engine.apply_bar(appended).expect("apply");
    assert_eq!(change, SeriesChange::Appended { index: 500 });

    let after = engine.visible_range().expect("window defined");
    assert_eq!(after.start, before.start + 1);
    assert_eq!(after.count, before.count);
}

#[test]
fn live_replacement_widens_extrema_until_the_next_range_change() {
    let bars = reference_bars();
    let last_time = bars.last().expect("bars").time;
    let mut engine = engine_800px();
    engine.set_bars(bars);

    let before = engine.extremums().expect("extremums defined");
    let spike = Bar::new(
        last_time,
        before.price_high + 5.0,
        before.price_high + 8.0,
        before.price_low,
        before.price_high + 6.0,
        50,
    )
    .expect("valid bar");
    let change = engine.apply_bar(spike).expect("apply");
    assert_eq!(change, SeriesChange::ReplacedLast { index: 499 });

    let widened = engine.extremums().expect("extremums defined");
    assert_eq!(widened.price_high, before.price_high + 8.0);

    // Replacing the spike with a calm bar keeps the widened bound stale.
    let calm = Bar::new(last_time, 120.0, 121.0, 119.0, 120.5, 50).expect("valid bar");
    engine.apply_bar(calm).expect("apply");
    let stale = engine.extremums().expect("extremums defined");
    assert_eq!(stale.price_high, before.price_high + 8.0);

    // A range change forces the full recompute that resolves the bound.
    engine.apply_range_request(RangeRequest::full(367, 133));
    let recomputed = engine.extremums().expect("extremums defined");
    assert!(recomputed.price_high < stale.price_high);
}

#[test]
fn render_frame_is_none_before_any_data() {
    let engine = engine_800px();
    assert!(engine.render_frame().is_none());
}

#[test]
fn render_frame_carries_labels_for_all_three_axes() {
    let mut engine = engine_800px();
    engine.set_bars(reference_bars());

    let frame = engine.render_frame().expect("frame");
    assert_eq!(frame.visible_range.count, 133);
    assert!(!frame.price_labels.is_empty());
    assert!(!frame.volume_labels.is_empty());
    assert!(!frame.time_labels.is_empty());

    // Price labels carry the estimated digit count behind the separator.
    for label in &frame.price_labels {
        assert!(!label.text.is_empty());
    }
}

#[test]
fn resize_recomputes_window_and_geometry() {
    let mut engine = engine_800px();
    engine.set_bars(reference_bars());

    engine.resize(300.0, 400.0).expect("resize");
    let range = engine.visible_range().expect("window defined");
    assert_eq!(range.count, 50); // floor(300 / 6)
    assert_eq!(range.end(), 500); // trailing edge preserved

    // Bar geometry was refit to fill the new width.
    let geometry = engine.geometry();
    let total = (geometry.bar_width + geometry.bar_gap) * range.count as f64;
    assert_relative_eq!(total, 300.0, epsilon = 1e-9);
}

#[test]
fn center_and_bounds_navigation_define_consistent_windows() {
    let bars = reference_bars();
    let mid_time = bars[250].time;
    let mut engine = engine_800px();
    engine.set_bars(bars.clone());

    let centered = engine.center_on_time(mid_time).expect("centered");
    assert!(centered.contains(250));

    let bounded = engine
        .set_visible_time_bounds(bars[300].time, bars[200].time)
        .expect("bounded");
    assert_eq!(bounded, VisibleRange::new(200, 101));
}
