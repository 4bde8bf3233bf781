use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::{
    Bar, BarGeometry, BarSeries, Extremums, PrecisionEstimator, RangeRequest, SeriesChange,
    TimeTickPlan, ViewportRangeManager, VisibleRange, extrema, ticks,
};
use crate::engine::format::{format_price, format_time, format_volume};
use crate::engine::{EngineConfig, EngineSnapshot};
use crate::error::EngineResult;

/// One positioned, pre-formatted axis label.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub value: f64,
    pub pixel: f64,
    pub text: String,
}

/// Everything the renderer needs for one pass: the window, the axis bounds,
/// the bar geometry, and the tick labels. Rebuilt fresh per pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub visible_range: VisibleRange,
    pub extremums: Extremums,
    pub geometry: BarGeometry,
    pub price_fraction_digits: usize,
    pub price_labels: Vec<AxisLabel>,
    pub volume_labels: Vec<AxisLabel>,
    pub time_labels: Vec<AxisLabel>,
}

/// Facade wiring the series, the viewport manager, the extrema tracker and
/// the precision estimator together.
///
/// All mutation happens through `&mut self` on the owning thread; background
/// feeds must marshal bars here before touching the series.
#[derive(Debug, Clone)]
pub struct ChartEngine {
    config: EngineConfig,
    series: BarSeries,
    manager: ViewportRangeManager,
    precision: PrecisionEstimator,
    extremums: Option<Extremums>,
    metadata: IndexMap<String, String>,
}

impl ChartEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let manager = ViewportRangeManager::new(
            config.pixel_width,
            BarGeometry {
                bar_width: config.bar_width,
                bar_gap: config.bar_gap,
            },
            config.min_bar_width,
        )?;
        let precision = PrecisionEstimator::new(
            config.precision_digit_domain,
            config.precision_probability,
            config.precision_observation_cap,
        )?;

        Ok(Self {
            config,
            series: BarSeries::new(),
            manager,
            precision,
            extremums: None,
            metadata: IndexMap::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    #[must_use]
    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.manager.range()
    }

    #[must_use]
    pub fn extremums(&self) -> Option<Extremums> {
        self.extremums
    }

    #[must_use]
    pub fn geometry(&self) -> BarGeometry {
        self.manager.geometry()
    }

    #[must_use]
    pub fn price_fraction_digits(&self) -> usize {
        self.precision.fraction_digits()
    }

    /// Attaches a metadata entry carried through snapshots.
    pub fn set_series_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_owned(), value.to_owned());
    }

    /// Replaces the data source: canonicalizes the bars, re-seeds the
    /// precision estimator, and defines a trailing window for the current
    /// pixel width.
    pub fn set_bars(&mut self, bars: Vec<Bar>) {
        let original_count = bars.len();
        self.series.set_bars(bars);
        debug!(
            original_count,
            canonical_count = self.series.len(),
            "set bars"
        );

        self.precision.reseed(&self.series);
        self.manager.reset();
        if let Err(err) = self
            .manager
            .recalc_for_pixel_width(self.config.pixel_width, self.series.len())
        {
            warn!(error = %err, "skipping window definition after set_bars");
        }
        self.recompute_extrema();
    }

    /// Applies one realtime bar with append/replace-last semantics.
    ///
    /// Appends auto-follow the window when its tail tracked the latest bar;
    /// replacements inside the window widen the extrema without a rescan.
    pub fn apply_bar(&mut self, bar: Bar) -> EngineResult<SeriesChange> {
        let change = self.series.apply(bar)?;
        self.precision.observe_bar(bar);

        match change {
            SeriesChange::Appended { index } => {
                let previous = self.manager.range();
                let followed = self.manager.follow_append(self.series.len());
                if self.manager.range().is_none() {
                    self.manager
                        .apply_request(RangeRequest::default(), self.series.len());
                }
                if followed != previous || previous.is_none() {
                    self.recompute_extrema();
                } else if previous.is_some_and(|range| range.contains(index)) {
                    self.widen_extrema(bar);
                }
            }
            SeriesChange::ReplacedLast { index } => {
                if self
                    .manager
                    .range()
                    .is_some_and(|range| range.contains(index))
                {
                    self.widen_extrema(bar);
                }
            }
        }

        trace!(count = self.series.len(), ?change, "applied bar");
        Ok(change)
    }

    /// Reacts to a plot-area resize: re-derives the window for the new width
    /// and refits bar geometry to the resolved bar count.
    pub fn resize(&mut self, pixel_width: f64, pixel_height: f64) -> EngineResult<()> {
        let resolved = self
            .manager
            .recalc_for_pixel_width(pixel_width, self.series.len())?;
        self.config.pixel_width = pixel_width;
        self.config.pixel_height = pixel_height;

        if let Some(range) = resolved {
            if !self.manager.fit_bar_width_and_gap(range.count, pixel_width) {
                warn!(
                    count = range.count,
                    pixel_width, "keeping previous bar geometry: count does not fit"
                );
            }
        }
        self.recompute_extrema();
        debug!(pixel_width, pixel_height, "resized plot area");
        Ok(())
    }

    /// Resolves an explicit navigation request (scroll, zoom, jump).
    pub fn apply_range_request(&mut self, request: RangeRequest) -> Option<VisibleRange> {
        let resolved = self.manager.apply_request(request, self.series.len());
        self.recompute_extrema();
        resolved
    }

    /// Centers the window on the bar nearest `time`.
    pub fn center_on_time(&mut self, time: f64) -> Option<VisibleRange> {
        let resolved = self.manager.center_on(&self.series, time);
        self.recompute_extrema();
        resolved
    }

    /// Shows exactly the bars whose timestamps bracket the given bounds.
    pub fn set_visible_time_bounds(
        &mut self,
        lower_bound_time: f64,
        upper_bound_time: f64,
    ) -> Option<VisibleRange> {
        let resolved = self
            .manager
            .bounds_to_range(&self.series, lower_bound_time, upper_bound_time);
        self.recompute_extrema();
        resolved
    }

    /// Builds the per-pass render numbers, or `None` before any window is
    /// defined. Never fails: degenerate windows produce degenerate frames.
    #[must_use]
    pub fn render_frame(&self) -> Option<RenderFrame> {
        let visible_range = self.manager.range()?;
        let extremums = self.extremums.unwrap_or_default();
        let geometry = self.manager.geometry();
        let digits = self.precision.fraction_digits();
        let locale = self.config.locale;

        let price_labels = ticks::plan_value_ticks(
            extremums.price_low,
            extremums.price_high,
            self.config.pixel_height,
            self.config.price_label_height_px,
            self.config.min_label_gap_px,
        )
        .into_iter()
        .map(|tick| AxisLabel {
            value: tick.value,
            pixel: tick.pixel,
            text: format_price(tick.value, digits, locale),
        })
        .collect();

        let volume_labels = ticks::plan_value_ticks(
            extremums.volume_low,
            extremums.volume_high,
            self.config.pixel_height,
            self.config.price_label_height_px,
            self.config.min_label_gap_px,
        )
        .into_iter()
        .map(|tick| AxisLabel {
            value: tick.value,
            pixel: tick.pixel,
            text: format_volume(tick.value, locale),
        })
        .collect();

        let TimeTickPlan { unit, ticks } = ticks::plan_time_ticks(
            &self.series,
            visible_range,
            geometry,
            self.config.time_label_width_px,
            self.config.min_label_gap_px,
        );
        let time_labels = ticks
            .into_iter()
            .map(|tick| AxisLabel {
                value: tick.value,
                pixel: tick.pixel,
                text: format_time(tick.value, unit, tick.major),
            })
            .collect();

        Some(RenderFrame {
            visible_range,
            extremums,
            geometry,
            price_fraction_digits: digits,
            price_labels,
            volume_labels,
            time_labels,
        })
    }

    /// Deterministic serializable state for regression tests and tooling.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            pixel_width: self.config.pixel_width,
            pixel_height: self.config.pixel_height,
            bar_count: self.series.len(),
            visible_range: self.manager.range(),
            extremums: self.extremums,
            geometry: self.manager.geometry(),
            price_fraction_digits: self.precision.fraction_digits(),
            precision_frozen: self.precision.is_frozen(),
            series_metadata: self.metadata.clone(),
        }
    }

    pub fn snapshot_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    fn recompute_extrema(&mut self) {
        self.extremums = self
            .manager
            .range()
            .map(|range| extrema::recompute_full(&self.series, range));
    }

    fn widen_extrema(&mut self, bar: Bar) {
        if let Some(current) = self.extremums {
            self.extremums = Some(extrema::widen_with_bar(current, bar));
        }
    }
}
