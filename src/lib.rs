//! candleview: viewport and series-statistics engine for candlestick charts.
//!
//! This crate owns the numbers behind a candlestick chart, not the drawing:
//! which bars are visible, the price/volume extremes the axes must cover,
//! how many fractional digits price labels need, and where round axis ticks
//! land. All operations are synchronous and bounded (O(1) or O(log n) per
//! incoming bar, O(visible window) on range changes).

pub mod core;
pub mod engine;
pub mod error;
pub mod telemetry;

pub use engine::{ChartEngine, EngineConfig, RenderFrame};
pub use error::{EngineError, EngineResult};
