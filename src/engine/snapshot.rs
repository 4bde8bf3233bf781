use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{BarGeometry, Extremums, VisibleRange};

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub bar_count: usize,
    pub visible_range: Option<VisibleRange>,
    pub extremums: Option<Extremums>,
    pub geometry: BarGeometry,
    pub price_fraction_digits: usize,
    pub precision_frozen: bool,
    pub series_metadata: IndexMap<String, String>,
}
