use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Explicit formatting locale passed into label rendering.
///
/// No ambient/global culture state is consulted anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelLocale {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
}

impl Default for LabelLocale {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousands_separator: None,
        }
    }
}

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Plot area width in pixels; drives the visible bar count.
    pub pixel_width: f64,
    /// Plot area height in pixels; drives price-axis tick spacing.
    pub pixel_height: f64,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default = "default_bar_gap")]
    pub bar_gap: f64,
    #[serde(default = "default_min_bar_width")]
    pub min_bar_width: f64,
    #[serde(default = "default_price_label_height_px")]
    pub price_label_height_px: f64,
    #[serde(default = "default_time_label_width_px")]
    pub time_label_width_px: f64,
    #[serde(default = "default_min_label_gap_px")]
    pub min_label_gap_px: f64,
    #[serde(default = "default_precision_probability")]
    pub precision_probability: f64,
    #[serde(default = "default_precision_observation_cap")]
    pub precision_observation_cap: u64,
    #[serde(default = "default_precision_digit_domain")]
    pub precision_digit_domain: usize,
    #[serde(default)]
    pub locale: LabelLocale,
}

impl EngineConfig {
    /// Creates a config with default tuning for the given plot area.
    #[must_use]
    pub fn new(pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            bar_width: default_bar_width(),
            bar_gap: default_bar_gap(),
            min_bar_width: default_min_bar_width(),
            price_label_height_px: default_price_label_height_px(),
            time_label_width_px: default_time_label_width_px(),
            min_label_gap_px: default_min_label_gap_px(),
            precision_probability: default_precision_probability(),
            precision_observation_cap: default_precision_observation_cap(),
            precision_digit_domain: default_precision_digit_domain(),
            locale: LabelLocale::default(),
        }
    }

    /// Sets initial bar width and gap.
    #[must_use]
    pub fn with_bar_geometry(mut self, bar_width: f64, bar_gap: f64) -> Self {
        self.bar_width = bar_width;
        self.bar_gap = bar_gap;
        self
    }

    /// Sets the probability mass the precision estimate must cover.
    #[must_use]
    pub fn with_precision_probability(mut self, probability: f64) -> Self {
        self.precision_probability = probability;
        self
    }

    /// Sets the observation count after which the precision estimate freezes.
    #[must_use]
    pub fn with_precision_observation_cap(mut self, cap: u64) -> Self {
        self.precision_observation_cap = cap;
        self
    }

    /// Sets the label formatting locale.
    #[must_use]
    pub fn with_locale(mut self, locale: LabelLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.pixel_width.is_finite()
            || self.pixel_width <= 0.0
            || !self.pixel_height.is_finite()
            || self.pixel_height <= 0.0
        {
            return Err(EngineError::InvalidArgument(
                "plot area dimensions must be finite and > 0".to_owned(),
            ));
        }
        if !self.bar_width.is_finite()
            || self.bar_width <= 0.0
            || !self.bar_gap.is_finite()
            || self.bar_gap < 0.0
        {
            return Err(EngineError::InvalidArgument(
                "bar geometry must be finite with width > 0 and gap >= 0".to_owned(),
            ));
        }
        if !self.min_bar_width.is_finite()
            || self.min_bar_width <= 0.0
            || self.bar_width < self.min_bar_width
        {
            return Err(EngineError::InvalidArgument(
                "minimum bar width must be finite, > 0 and <= bar width".to_owned(),
            ));
        }
        if !self.price_label_height_px.is_finite()
            || self.price_label_height_px <= 0.0
            || !self.time_label_width_px.is_finite()
            || self.time_label_width_px <= 0.0
        {
            return Err(EngineError::InvalidArgument(
                "label extents must be finite and > 0".to_owned(),
            ));
        }
        if !self.min_label_gap_px.is_finite() || self.min_label_gap_px < 0.0 {
            return Err(EngineError::InvalidArgument(
                "label gap must be finite and >= 0".to_owned(),
            ));
        }
        if !self.precision_probability.is_finite()
            || !(0.0..=1.0).contains(&self.precision_probability)
        {
            return Err(EngineError::InvalidProbability(self.precision_probability));
        }
        if self.precision_digit_domain == 0 {
            return Err(EngineError::InvalidArgument(
                "precision digit domain must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_bar_width() -> f64 {
    5.0
}

fn default_bar_gap() -> f64 {
    1.0
}

fn default_min_bar_width() -> f64 {
    3.0
}

fn default_price_label_height_px() -> f64 {
    14.0
}

fn default_time_label_width_px() -> f64 {
    64.0
}

fn default_min_label_gap_px() -> f64 {
    8.0
}

fn default_precision_probability() -> f64 {
    0.93
}

fn default_precision_observation_cap() -> u64 {
    500
}

fn default_precision_digit_domain() -> usize {
    15
}
