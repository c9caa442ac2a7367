// Library exports for the CLI and tests
pub mod activity;
pub mod cache;
pub mod classify;
pub mod config;
pub mod date_index;
pub mod engine;
pub mod error;
pub mod logging;
pub mod months;
pub mod renderer;
pub mod stats;
pub mod timefmt;
pub mod weeks;
pub mod window;

pub use activity::{ActivityPayload, Category, DayRecord, MonthLabel, RawDay};
pub use config::EngineConfig;
pub use engine::{HeatmapEngine, HeatmapView};
pub use error::{HeatmapError, Result};
