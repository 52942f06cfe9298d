pub mod core;

// Re-export commonly used types
pub use crate::core::errors::{ConfigError, ConfigWarning, ScenarioError};
pub use crate::core::execution::{
    ConcurrencyMode, ExecutionConfig, LineConfig, LineEngine, LineSnapshot, Preset,
    ScenarioOutcome, ScenarioRunner, SimulationEngine, StationConfig, StepResult,
};
pub use crate::core::line::{Distribution, DistributionKind, DistributionParams, MachineStatus};
pub use crate::core::metrics::{CompletionRecord, ConvergenceStatus};
pub use crate::core::types::{PieceId, PieceLocation, StationId, Tick};
