//! Configuration for running several line scenarios
//!
//! Each scenario owns its engine and random source, so the concurrency mode
//! only changes scheduling, never results.

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Scenarios run one after another on the calling thread
    #[default]
    Sequential,
    /// Scenarios run in parallel on a Rayon thread pool
    Rayon,
}

/// Configuration for running a batch of scenarios
///
/// Controls whether scenarios share the calling thread or are spread over a
/// dedicated Rayon pool, and how large that pool is.
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// Worker threads for Rayon mode; Rayon's default when `None`
    pub thread_pool_size: Option<usize>,
}

impl ExecutionConfig {
    /// Create a new execution configuration with default values
    ///
    /// Default configuration uses Sequential mode with no thread pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode for scenario execution
    ///
    /// # Arguments
    /// * `mode` - The concurrency mode to use
    ///
    /// # Returns
    /// A new configuration with the specified concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Arguments
    /// * `size` - The number of threads to use in the thread pool
    ///
    /// # Returns
    /// A new configuration with the specified thread pool size
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}
