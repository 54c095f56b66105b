//! Services for data aggregation and processing

pub mod aggregator;
pub mod calendar;
pub mod export_link;

pub use aggregator::{top_models, Aggregator, DEFAULT_TOP_MODELS};
pub use calendar::{CalendarCell, CalendarGrid, HeatmapIntensity, MonthLabel};
pub use export_link::export_url;
