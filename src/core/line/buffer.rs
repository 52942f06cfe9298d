use super::piece::Piece;
use std::collections::VecDeque;

/// Bounded FIFO store between two adjacent stations.
///
/// A capacity of zero means there is no storage at all: the downstream
/// station takes batches straight out of a blocked upstream machine.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub index: usize,
    pub capacity: usize,
    pieces: VecDeque<Piece>,
    cumulative_fill: u64,
}

impl Buffer {
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            index,
            capacity,
            pieces: VecDeque::with_capacity(capacity),
            cumulative_fill: 0,
        }
    }

    pub fn current_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn available_space(&self) -> usize {
        self.capacity - self.current_count()
    }

    pub fn is_bufferless(&self) -> bool {
        self.capacity == 0
    }

    /// Append a whole batch, or nothing at all if it does not fit
    pub fn try_push(&mut self, batch: &[Piece]) -> bool {
        if self.is_bufferless() || self.current_count() + batch.len() > self.capacity {
            return false;
        }
        self.pieces.extend(batch.iter().copied());
        true
    }

    /// Take exactly `n` pieces from the front, or nothing if fewer are queued
    pub fn try_pop(&mut self, n: usize) -> Option<Vec<Piece>> {
        if self.current_count() < n {
            return None;
        }
        Some(self.pieces.drain(..n).collect())
    }

    /// Queued pieces, oldest first
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Add the current occupancy to the running fill total; called once per tick
    pub fn accumulate_fill(&mut self) {
        self.cumulative_fill += self.current_count() as u64;
    }

    pub fn cumulative_fill(&self) -> u64 {
        self.cumulative_fill
    }

    /// Mean occupancy over `elapsed` ticks as a fraction of capacity
    pub fn average_utilization(&self, elapsed: u64) -> f64 {
        if self.is_bufferless() || elapsed == 0 {
            return 0.0;
        }
        self.cumulative_fill as f64 / elapsed as f64 / self.capacity as f64
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
        self.cumulative_fill = 0;
    }
}
