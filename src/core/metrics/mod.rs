pub mod analysis;
pub mod collector;
pub mod convergence;
pub mod report;

// Re-export commonly used types
pub use analysis::{FlowEvent, FlowPoint, HistogramBin, LittlesLaw, Milestone};
pub use collector::{CompletionRecord, MetricSample, MetricsCollector};
pub use convergence::{ConvergenceDetector, ConvergenceStatus};
pub use report::{BufferLogEntry, MetricsLogEntry, StationLogEntry};
