use crate::core::errors::ScenarioError;
use crate::core::execution::config::{ConcurrencyMode, ExecutionConfig};
use crate::core::execution::line_config::{LineConfig, Preset};
use crate::core::execution::line_engine::LineEngine;
use crate::core::metrics::{ConvergenceStatus, LittlesLaw};
use crate::core::types::Tick;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary of one scenario after its horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub ticks: Tick,
    pub completed: u64,
    pub throughput: f64,
    pub average_lead_time: f64,
    pub final_wip: usize,
    pub convergence: ConvergenceStatus,
    pub littles_law: Option<LittlesLaw>,
}

/// Runs independent line configurations side by side for comparison
pub struct ScenarioRunner {
    scenarios: Vec<(String, LineConfig)>,
    horizon: Tick,
    execution: ExecutionConfig,
}

impl ScenarioRunner {
    pub fn new(horizon: Tick) -> Self {
        Self {
            scenarios: Vec::new(),
            horizon,
            execution: ExecutionConfig::default(),
        }
    }

    /// One scenario per built-in preset
    pub fn presets(horizon: Tick) -> Self {
        Preset::ALL
            .iter()
            .fold(Self::new(horizon), |runner, &preset| {
                runner.with_scenario(preset.name(), LineConfig::preset(preset))
            })
    }

    pub fn with_scenario(mut self, name: impl Into<String>, config: LineConfig) -> Self {
        self.scenarios.push((name.into(), config));
        self
    }

    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Build every engine, then run them all to the horizon.
    ///
    /// Nothing runs if any configuration is invalid. Outcomes follow the
    /// order in which scenarios were added.
    pub fn run(&self) -> Result<Vec<ScenarioOutcome>, ScenarioError> {
        let engines = self
            .scenarios
            .iter()
            .map(|(name, config)| {
                LineEngine::new(config.clone())
                    .map(|engine| (name.clone(), engine))
                    .map_err(|source| ScenarioError::Config {
                        scenario: name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let horizon = self.horizon;
        let outcomes: Vec<ScenarioOutcome> = match self.execution.concurrency_mode {
            ConcurrencyMode::Sequential => engines
                .into_iter()
                .map(|(name, engine)| run_scenario(name, engine, horizon))
                .collect(),
            ConcurrencyMode::Rayon => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(threads) = self.execution.thread_pool_size {
                    builder = builder.num_threads(threads);
                }
                let pool = builder.build()?;
                pool.install(|| {
                    engines
                        .into_par_iter()
                        .map(|(name, engine)| run_scenario(name, engine, horizon))
                        .collect()
                })
            }
        };
        Ok(outcomes)
    }
}

fn run_scenario(name: String, mut engine: LineEngine, horizon: Tick) -> ScenarioOutcome {
    engine.run_for(horizon);
    info!(
        "[Scenario:{}] {} pieces in {} ticks, {:.1}/h",
        name,
        engine.completed_count(),
        engine.current_time(),
        engine.throughput()
    );
    ScenarioOutcome {
        ticks: engine.current_time(),
        completed: engine.completed_count(),
        throughput: engine.throughput(),
        average_lead_time: engine.average_lead_time(),
        final_wip: engine.total_wip(),
        convergence: engine.convergence(),
        littles_law: engine.littles_law(),
        name,
    }
}
