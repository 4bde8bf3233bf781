use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{BarSeries, timestamp_index};
use crate::error::{EngineError, EngineResult};

/// Half-open index window `[start, start + count)` into a series.
///
/// The "not yet computed" state is represented by `Option<VisibleRange>`
/// at the call sites, never by sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: usize,
    pub count: usize,
}

impl VisibleRange {
    #[must_use]
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// Exclusive end index.
    #[must_use]
    pub fn end(self) -> usize {
        self.start + self.count
    }

    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }
}

/// Navigation request with per-field "unspecified" expressed as `None`.
///
/// Three shapes arrive in practice: both fields (normal navigation), only
/// `start` (a scrollbar drag supplies a position), only `count` (the pixel
/// width changed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start: Option<usize>,
    pub count: Option<usize>,
}

impl RangeRequest {
    #[must_use]
    pub fn full(start: usize, count: usize) -> Self {
        Self {
            start: Some(start),
            count: Some(count),
        }
    }

    #[must_use]
    pub fn start_only(start: usize) -> Self {
        Self {
            start: Some(start),
            count: None,
        }
    }

    #[must_use]
    pub fn count_only(count: usize) -> Self {
        Self {
            start: None,
            count: Some(count),
        }
    }
}

/// Per-bar rendering geometry in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub bar_width: f64,
    pub bar_gap: f64,
}

impl BarGeometry {
    /// Horizontal pixels consumed by one bar slot.
    #[must_use]
    pub fn slot_width(self) -> f64 {
        self.bar_width + self.bar_gap
    }
}

/// Owns the visible index window and the policies that move it.
///
/// All operations are synchronous and clamp rather than fail: the resolved
/// window always satisfies `start + count <= series_len` and `count >= 1`
/// for a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportRangeManager {
    range: Option<VisibleRange>,
    pixel_width: f64,
    geometry: BarGeometry,
    min_bar_width: f64,
    width_step: f64,
}

impl ViewportRangeManager {
    pub fn new(
        pixel_width: f64,
        geometry: BarGeometry,
        min_bar_width: f64,
    ) -> EngineResult<Self> {
        if !pixel_width.is_finite() || pixel_width <= 0.0 {
            return Err(EngineError::InvalidArgument(
                "pixel width must be finite and > 0".to_owned(),
            ));
        }
        if !geometry.bar_width.is_finite()
            || !geometry.bar_gap.is_finite()
            || geometry.bar_width <= 0.0
            || geometry.bar_gap < 0.0
        {
            return Err(EngineError::InvalidArgument(
                "bar geometry must be finite with width > 0 and gap >= 0".to_owned(),
            ));
        }
        if !min_bar_width.is_finite() || min_bar_width <= 0.0 {
            return Err(EngineError::InvalidArgument(
                "minimum bar width must be finite and > 0".to_owned(),
            ));
        }

        Ok(Self {
            range: None,
            pixel_width,
            geometry,
            min_bar_width,
            width_step: 1.0,
        })
    }

    #[must_use]
    pub fn range(&self) -> Option<VisibleRange> {
        self.range
    }

    #[must_use]
    pub fn geometry(&self) -> BarGeometry {
        self.geometry
    }

    #[must_use]
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// Upper bound on visible bars: half the pixel width in whole-bar units,
    /// so bars never degenerate below two pixels.
    #[must_use]
    pub fn max_visible_count(&self) -> usize {
        ((self.pixel_width / 2.0).floor() as usize).max(1)
    }

    /// Forgets the current window. The next navigation redefines it.
    pub fn reset(&mut self) {
        self.range = None;
    }

    /// Resolves a navigation request against the current window.
    ///
    /// Missing fields inherit from the current window; with no window yet,
    /// the count defaults to the whole series and the start to the trailing
    /// position. The result is clamped into the series and stored.
    pub fn apply_request(&mut self, request: RangeRequest, series_len: usize) -> Option<VisibleRange> {
        if series_len == 0 {
            trace!("range request ignored: empty series");
            return None;
        }

        let inherited_count = request
            .count
            .or(self.range.map(|range| range.count))
            .unwrap_or(series_len);
        let count = inherited_count
            .clamp(1, self.max_visible_count())
            .min(series_len);

        let inherited_start = request
            .start
            .or(self.range.map(|range| range.start))
            .unwrap_or_else(|| series_len - count);
        let mut start = inherited_start.min(series_len - 1);
        if start + count > series_len {
            start = series_len - count;
        }

        let resolved = VisibleRange::new(start, count);
        trace!(?request, ?resolved, series_len, "applied range request");
        self.range = Some(resolved);
        Some(resolved)
    }

    /// Re-derives the window after the available pixel width changed.
    ///
    /// Keeps the same last visible bar where possible; shows the whole
    /// series when it fits.
    pub fn recalc_for_pixel_width(
        &mut self,
        pixel_width: f64,
        series_len: usize,
    ) -> EngineResult<Option<VisibleRange>> {
        if !pixel_width.is_finite() || pixel_width <= 0.0 {
            return Err(EngineError::InvalidArgument(
                "pixel width must be finite and > 0".to_owned(),
            ));
        }
        self.pixel_width = pixel_width;

        if series_len == 0 {
            return Ok(None);
        }

        let count = (pixel_width / self.geometry.slot_width()).floor() as usize;
        let count = count.clamp(1, self.max_visible_count());
        let resolved = if count >= series_len {
            VisibleRange::new(0, series_len)
        } else {
            let last = self
                .range
                .map(|range| range.end().saturating_sub(1))
                .unwrap_or(series_len - 1)
                .min(series_len - 1);
            let start = (last + 1).saturating_sub(count);
            VisibleRange::new(start, count)
        };

        debug!(pixel_width, ?resolved, "recalculated window for pixel width");
        self.range = Some(resolved);
        Ok(Some(resolved))
    }

    /// Centers the current-width window on the bar nearest `time`.
    ///
    /// Targets too close to either edge snap to the leading/trailing window
    /// instead of centering past it. No-op without a defined window.
    pub fn center_on(&mut self, series: &BarSeries, time: f64) -> Option<VisibleRange> {
        let current = self.range?;
        let target = timestamp_index::locate(series, time)?;
        let series_len = series.len();
        let count = current.count.min(series_len).max(1);

        let mut start = target.saturating_sub(count / 2);
        if start + count > series_len {
            start = series_len - count;
        }

        let resolved = VisibleRange::new(start, count);
        debug!(time, target, ?resolved, "centered window on timestamp");
        self.range = Some(resolved);
        Some(resolved)
    }

    /// Resolves a window whose first/last bars bracket the given time bounds,
    /// then refits bar width and gap to that exact bar count.
    ///
    /// Reversed bounds are swapped. Returns `None` for an empty series or
    /// when the bound count cannot be drawn at the minimum bar width.
    pub fn bounds_to_range(
        &mut self,
        series: &BarSeries,
        lower_bound_time: f64,
        upper_bound_time: f64,
    ) -> Option<VisibleRange> {
        let (lower, upper) = if lower_bound_time <= upper_bound_time {
            (lower_bound_time, upper_bound_time)
        } else {
            (upper_bound_time, lower_bound_time)
        };

        let first = timestamp_index::locate(series, lower)?;
        let last = timestamp_index::locate(series, upper)?;
        let (first, last) = (first.min(last), first.max(last));
        let count = last - first + 1;

        if !self.fit_bar_width_and_gap(count, self.pixel_width) {
            debug!(count, "bounds window rejected: cannot fit bars at minimum width");
            return None;
        }

        let resolved = VisibleRange::new(first, count);
        debug!(lower, upper, ?resolved, "resolved window from time bounds");
        self.range = Some(resolved);
        Some(resolved)
    }

    /// Auto-follow policy for a tail append.
    ///
    /// When the previous window ended at the previous last bar, the window
    /// advances by one so the new bar scrolls into view; when the window
    /// already covered the whole series it grows instead of shifting.
    pub fn follow_append(&mut self, new_series_len: usize) -> Option<VisibleRange> {
        let current = self.range?;
        let previous_len = new_series_len.checked_sub(1)?;

        if current.end() != previous_len {
            return Some(current);
        }

        let resolved = if current.start == 0 && current.count == previous_len {
            VisibleRange::new(0, current.count + 1)
        } else {
            VisibleRange::new(current.start + 1, current.count)
        };

        trace!(?resolved, new_series_len, "window followed tail append");
        self.range = Some(resolved);
        Some(resolved)
    }

    /// Fits bar width and gap for `visible_count` bars into `available_px`.
    ///
    /// Starts from the current bar width, shrinks in fixed steps while bars
    /// do not fit (down to the minimum width), then grows while slack
    /// remains. The gap becomes the exact leftover divided evenly. Returns
    /// `false` when the count cannot be shown even at the minimum width,
    /// leaving the current geometry untouched.
    pub fn fit_bar_width_and_gap(&mut self, visible_count: usize, available_px: f64) -> bool {
        if visible_count == 0 || !available_px.is_finite() || available_px <= 0.0 {
            return false;
        }

        let count = visible_count as f64;
        let mut width = self.geometry.bar_width.max(self.min_bar_width);

        while width * count > available_px && width - self.width_step >= self.min_bar_width {
            width -= self.width_step;
        }
        if width * count > available_px {
            return false;
        }

        while (width + self.width_step) * count <= available_px {
            width += self.width_step;
        }

        let gap = (available_px - width * count) / count;
        self.geometry = BarGeometry {
            bar_width: width,
            bar_gap: gap,
        };
        trace!(visible_count, available_px, width, gap, "fitted bar geometry");
        true
    }
}
