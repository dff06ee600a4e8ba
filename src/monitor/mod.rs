//! Operator-facing observability: recent errors and per-service metrics.

pub mod errors;
pub mod performance;

pub use errors::{context, user_message, ErrorLog, ErrorRecord};
pub use performance::{Metric, PerformanceMonitor, ServiceMetrics};
