pub mod bar;
pub mod extrema;
pub mod precision;
pub mod series;
pub mod ticks;
pub mod timestamp_index;
pub mod viewport;

pub use bar::Bar;
pub use extrema::Extremums;
pub use precision::{FrequencyRank, PrecisionEstimator};
pub use series::{BarSeries, SeriesChange};
pub use ticks::{Tick, TickSet, TimeTickPlan, TimeTickUnit};
pub use viewport::{BarGeometry, RangeRequest, ViewportRangeManager, VisibleRange};
