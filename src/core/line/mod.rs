pub mod buffer;
pub mod distribution;
pub mod machine;
pub mod piece;
pub mod station;

// Re-export commonly used types
pub use buffer::Buffer;
pub use distribution::{Distribution, DistributionKind, DistributionParams};
pub use machine::{Machine, MachineStatus};
pub use piece::{Piece, PieceTracker};
pub use station::Station;
