pub mod metrics;
pub mod monitor;

pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use monitor::SessionMonitor;
