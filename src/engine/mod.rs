pub mod config;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod format;
pub mod snapshot;

pub use config::{EngineConfig, LabelLocale};
pub use engine::{AxisLabel, ChartEngine, RenderFrame};
pub use snapshot::EngineSnapshot;
