use crate::core::types::{PieceId, PieceLocation, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A unit of work moving through the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub created_at: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPiece {
    pub created_at: Tick,
    pub location: PieceLocation,
}

/// Registry of every piece currently inside the line.
///
/// Entries are keyed by id so iteration (and therefore snapshots) follows
/// creation order.
#[derive(Debug, Clone, Default)]
pub struct PieceTracker {
    counter: u64,
    live: BTreeMap<PieceId, TrackedPiece>,
}

impl PieceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new piece at `now`, placed at `location`
    pub fn mint(&mut self, now: Tick, location: PieceLocation) -> Piece {
        self.counter += 1;
        let id = PieceId(self.counter);
        self.live.insert(id, TrackedPiece {
            created_at: now,
            location,
        });
        Piece { id, created_at: now }
    }

    pub fn relocate(&mut self, pieces: &[Piece], location: PieceLocation) {
        for piece in pieces {
            if let Some(entry) = self.live.get_mut(&piece.id) {
                entry.location = location;
            }
        }
    }

    /// Stop tracking a piece that left the line, returning its creation time
    pub fn retire(&mut self, id: PieceId) -> Option<Tick> {
        self.live.remove(&id).map(|entry| entry.created_at)
    }

    pub fn get(&self, id: PieceId) -> Option<&TrackedPiece> {
        self.live.get(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of pieces ever minted
    pub fn minted(&self) -> u64 {
        self.counter
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PieceId, &TrackedPiece)> {
        self.live.iter()
    }

    pub fn clear(&mut self) {
        self.counter = 0;
        self.live.clear();
    }
}
