use crate::core::errors::ConfigError;
use crate::core::execution::line_config::LineConfig;
use crate::core::execution::line_engine::LineEngine;
use crate::core::execution::snapshot::StepResult;
use crate::core::types::Tick;

/// Drives a `LineEngine` up to an optional tick horizon
pub struct SimulationEngine {
    line: LineEngine,
    max_ticks: Option<u64>,
}

impl SimulationEngine {
    /// Build a line from `config` and wrap it in a driver
    ///
    /// # Arguments
    /// * `config` - The line to simulate
    /// * `max_ticks` - Horizon for `run`, or `None` to run without end
    ///
    /// # Returns
    /// The driver, or the configuration error that prevented building the line
    pub fn new(config: LineConfig, max_ticks: Option<u64>) -> Result<Self, ConfigError> {
        Ok(Self::from_engine(LineEngine::new(config)?, max_ticks))
    }

    /// Wrap an engine that already exists, keeping its clock and state
    pub fn from_engine(line: LineEngine, max_ticks: Option<u64>) -> Self {
        Self { line, max_ticks }
    }

    /// Run until the horizon. Without a horizon this never returns.
    ///
    /// # Returns
    /// The tick count reached
    pub fn run(&mut self) -> u64 {
        while self
            .max_ticks
            .map_or(true, |max| self.current_tick() < max)
        {
            self.line.advance();
        }
        self.current_tick()
    }

    /// Run a single tick
    ///
    /// # Returns
    /// The pieces completed during the tick and the resulting line state
    pub fn step(&mut self) -> StepResult {
        self.line.step()
    }

    /// Run `ticks` more ticks, ignoring the horizon
    ///
    /// # Returns
    /// The number of pieces completed meanwhile
    pub fn run_for(&mut self, ticks: u64) -> usize {
        self.line.run_for(ticks)
    }

    /// Advance until `done` holds or `limit` ticks have run.
    ///
    /// # Arguments
    /// * `done` - Checked before every tick and once more at the end
    /// * `limit` - The most ticks to run
    ///
    /// # Returns
    /// Whether the predicate was met
    pub fn run_until<F>(&mut self, mut done: F, limit: u64) -> bool
    where
        F: FnMut(&LineEngine) -> bool,
    {
        for _ in 0..limit {
            if done(&self.line) {
                return true;
            }
            self.line.advance();
        }
        done(&self.line)
    }

    /// Advance until the throughput reaches steady state or `limit` ticks have run
    pub fn run_until_converged(&mut self, limit: u64) -> bool {
        self.run_until(|line| line.convergence().is_converged(), limit)
    }

    pub fn line(&self) -> &LineEngine {
        &self.line
    }

    pub fn line_mut(&mut self) -> &mut LineEngine {
        &mut self.line
    }

    pub fn into_line(self) -> LineEngine {
        self.line
    }

    pub fn current_tick(&self) -> Tick {
        self.line.current_time()
    }

    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }
}
