//! Error and warning types for line construction and scenario runs.
//!
//! Only configuration can be rejected. Once an engine exists every tick is
//! infallible: a full buffer or a closed CONWIP gate is backpressure, not an
//! error.

use super::types::StationId;

/// A malformed line configuration, rejected before any tick runs
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The line has no stations
    EmptyLine,
    /// Batch size must be at least 1
    InvalidBatchSize { station: StationId, batch_size: i64 },
    /// Parallel machine count must be at least 1
    InvalidMachineCount { station: StationId, machines: i64 },
    /// OEE must be a finite value in (0, 1]
    InvalidOee { station: StationId, oee: f64 },
    /// Buffer capacity must be non-negative
    InvalidCapacity { buffer: usize, capacity: i64 },
    /// There must be exactly one buffer between each pair of adjacent stations
    BufferCountMismatch { stations: usize, buffers: usize },
    /// A zero-capacity buffer hands batches over directly, so both sides must agree on the batch size
    HandOffBatchMismatch {
        buffer: usize,
        upstream: i64,
        downstream: i64,
    },
    /// Pushes of the upstream batch and pops of the downstream batch can
    /// leave a remainder this buffer cannot grow past, stalling the line forever
    BufferTooSmall {
        buffer: usize,
        capacity: i64,
        required: i64,
    },
    /// The CONWIP cap never lets enough pieces in to assemble some batch
    WipTooSmall { wip: usize, required: usize },
    /// Distribution parameters are out of range for the chosen kind
    InvalidDistribution { station: StationId, reason: String },
    /// The metrics sampling period must be at least one tick
    InvalidLogStep,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyLine => write!(f, "line must contain at least one station"),
            ConfigError::InvalidBatchSize { station, batch_size } => write!(
                f,
                "station {}: batch size must be at least 1, got {}",
                station, batch_size
            ),
            ConfigError::InvalidMachineCount { station, machines } => write!(
                f,
                "station {}: parallel machines must be at least 1, got {}",
                station, machines
            ),
            ConfigError::InvalidOee { station, oee } => {
                write!(f, "station {}: OEE must be in (0, 1], got {}", station, oee)
            }
            ConfigError::InvalidCapacity { buffer, capacity } => write!(
                f,
                "buffer {}: capacity must be non-negative, got {}",
                buffer, capacity
            ),
            ConfigError::BufferCountMismatch { stations, buffers } => write!(
                f,
                "{} stations need {} buffers, got {}",
                stations,
                stations.saturating_sub(1),
                buffers
            ),
            ConfigError::HandOffBatchMismatch {
                buffer,
                upstream,
                downstream,
            } => write!(
                f,
                "buffer {} has zero capacity but batch sizes differ ({} upstream, {} downstream)",
                buffer, upstream, downstream
            ),
            ConfigError::BufferTooSmall {
                buffer,
                capacity,
                required,
            } => write!(
                f,
                "buffer {}: capacity {} can deadlock, at least {} is needed",
                buffer, capacity, required
            ),
            ConfigError::WipTooSmall { wip, required } => write!(
                f,
                "WIP cap {} can never fill every batch, at least {} is needed",
                wip, required
            ),
            ConfigError::InvalidDistribution { station, reason } => {
                write!(f, "station {}: invalid distribution: {}", station, reason)
            }
            ConfigError::InvalidLogStep => write!(f, "log step must be at least 1 tick"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A configuration that is accepted but adjusted at run time
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// OEE below the floor is clamped when sampling processing times
    OeeClamped {
        station: StationId,
        configured: f64,
        applied: f64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::OeeClamped {
                station,
                configured,
                applied,
            } => write!(
                f,
                "station {}: OEE {} is below the floor, sampling with {}",
                station, configured, applied
            ),
        }
    }
}

/// Failure to set up a batch of scenario runs
#[derive(Debug)]
pub enum ScenarioError {
    /// One of the scenarios has an invalid line configuration
    Config { scenario: String, source: ConfigError },
    /// The dedicated rayon pool could not be created
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Config { scenario, source } => {
                write!(f, "scenario '{}': {}", scenario, source)
            }
            ScenarioError::ThreadPool(e) => write!(f, "failed to build thread pool: {}", e),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Config { source, .. } => Some(source),
            ScenarioError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ScenarioError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        ScenarioError::ThreadPool(e)
    }
}
