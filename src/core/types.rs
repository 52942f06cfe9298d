use serde::{Deserialize, Serialize};

/// Simulation time in whole ticks
pub type Tick = u64;

/// Opaque identifier of a single piece of work, minted from the engine's piece counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub(crate) u64);

impl PieceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw counter value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Identifier of a station as given in the line configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(pub(crate) String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a live piece currently sits inside the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceLocation {
    /// Held by machine `machine` of the station at index `station`
    Machine { station: usize, machine: usize },
    /// Queued in the buffer at index `buffer` (between station `buffer` and `buffer + 1`)
    Buffer { buffer: usize },
}
