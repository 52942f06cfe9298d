pub mod config;
pub mod line_config;
pub mod line_engine;
pub mod scenario;
pub mod simulation_engine;
pub mod snapshot;

// Re-export commonly used types
pub use config::{ConcurrencyMode, ExecutionConfig};
pub use line_config::{LineConfig, Preset, StationConfig};
pub use line_engine::LineEngine;
pub use scenario::{ScenarioOutcome, ScenarioRunner};
pub use simulation_engine::SimulationEngine;
pub use snapshot::{
    BufferSnapshot, LineSnapshot, MachineSnapshot, MetricsSnapshot, PieceSnapshot, StationSnapshot,
    StepResult,
};
