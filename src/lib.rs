//! Fertilizer program KPI report: goal/achieved arithmetic, national totals,
//! state ranking and locale-independent formatting, plus the loaders and
//! renderers around them.
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use config::DashboardConfig;
pub use error::{ReportError, Result};
pub use metrics::{aggregate_regions, compute_metric, rank_by_completion};
pub use types::{Category, MetricRecord, MetricValue, NationalTotal, RegionRow};
pub use util::format_number;
