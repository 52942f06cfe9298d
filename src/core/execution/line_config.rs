use crate::core::errors::{ConfigError, ConfigWarning};
use crate::core::line::distribution::{self, Distribution, DistributionKind, DistributionParams};
use crate::core::line::{Buffer, Station};
use crate::core::types::StationId;
use serde::{Deserialize, Serialize};

/// Configuration of one station. Counts are signed so out-of-range input
/// survives deserialization and is reported by `validate` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: String,
    pub distribution: Distribution,
    pub oee: f64,
    pub batch_size: i64,
    pub parallel_machines: i64,
}

impl StationConfig {
    pub fn new(id: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            id: id.into(),
            distribution,
            oee: 1.0,
            batch_size: 1,
            parallel_machines: 1,
        }
    }

    pub fn with_oee(mut self, oee: f64) -> Self {
        self.oee = oee;
        self
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel_machines(mut self, machines: i64) -> Self {
        self.parallel_machines = machines;
        self
    }
}

/// Named starting points for common line setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Balanced,
    Bottleneck,
    HighVolatility,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Balanced, Preset::Bottleneck, Preset::HighVolatility];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Balanced => "Balanced Line",
            Preset::Bottleneck => "Bottleneck (S3)",
            Preset::HighVolatility => "High Volatility",
        }
    }
}

/// Everything needed to build a line: stations in flow order, the buffer
/// capacities between them, and the CONWIP cap at the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    pub stations: Vec<StationConfig>,
    /// Capacity of the buffer after each station except the last
    pub buffer_capacities: Vec<i64>,
    /// CONWIP cap: most pieces allowed inside the line at once
    pub wip: usize,
    /// Ticks before completions count toward reported metrics
    pub warmup_period: u64,
    /// Metrics are sampled every `log_step` ticks
    pub log_step: u64,
    pub random_seed: Option<u64>,
}

impl Default for LineConfig {
    fn default() -> Self {
        let station = |id: &str, mean: f64, min: f64, max: f64| {
            StationConfig::new(id, Distribution::with_kind(
                DistributionKind::Deterministic,
                DistributionParams {
                    mean,
                    variance: 1.0,
                    min,
                    max,
                    mode: mean,
                },
            ))
        };

        Self {
            stations: vec![
                station("S1", 5.0, 2.0, 8.0),
                station("S2", 4.0, 2.0, 6.0),
                station("S3", 6.0, 3.0, 9.0),
                station("S4", 3.0, 1.0, 5.0),
                station("S5", 5.0, 2.0, 8.0),
            ],
            buffer_capacities: vec![2, 2, 2, 2],
            wip: 9,
            warmup_period: 0,
            log_step: 5,
            random_seed: Some(42),
        }
    }
}

/// Validated runtime objects built from a `LineConfig`
#[derive(Debug, Clone)]
pub(crate) struct LineLayout {
    pub stations: Vec<Station>,
    pub buffers: Vec<Buffer>,
    pub warnings: Vec<ConfigWarning>,
}

impl LineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty line to be filled with `with_station`
    pub fn empty() -> Self {
        Self {
            stations: Vec::new(),
            buffer_capacities: Vec::new(),
            ..Self::default()
        }
    }

    pub fn preset(preset: Preset) -> Self {
        let row = |id: &str,
                   kind: DistributionKind,
                   oee: f64,
                   mean: f64,
                   batch_size: i64,
                   variance: f64,
                   min: f64,
                   max: f64,
                   mode: f64| {
            StationConfig::new(id, Distribution::with_kind(kind, DistributionParams {
                mean,
                variance,
                min,
                max,
                mode,
            }))
            .with_oee(oee)
            .with_batch_size(batch_size)
        };
        use DistributionKind::*;

        let (wip, buffers, stations) = match preset {
            Preset::Balanced => (9, vec![2, 2, 2, 2], vec![
                row("S1", Deterministic, 1.0, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
                row("S2", Deterministic, 1.0, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
                row("S3", Deterministic, 1.0, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
                row("S4", Deterministic, 1.0, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
                row("S5", Deterministic, 1.0, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
            ]),
            Preset::Bottleneck => (10, vec![3, 1, 3, 3], vec![
                row("S1", Uniform, 0.95, 4.0, 1, 1.0, 3.0, 5.0, 4.0),
                row("S2", Normal, 0.9, 4.0, 1, 2.0, 2.0, 6.0, 4.0),
                row("S3", Deterministic, 0.8, 8.0, 1, 1.0, 6.0, 10.0, 8.0),
                row("S4", Uniform, 0.95, 4.0, 1, 1.0, 3.0, 5.0, 4.0),
                row("S5", Normal, 0.9, 4.0, 1, 2.0, 2.0, 6.0, 4.0),
            ]),
            Preset::HighVolatility => (8, vec![1, 2, 2, 1], vec![
                row("S1", Exponential, 0.85, 6.0, 1, 1.0, 1.0, 15.0, 6.0),
                row("S2", Triangular, 0.90, 5.0, 1, 1.0, 1.0, 10.0, 3.0),
                row("S3", Exponential, 0.75, 7.0, 2, 1.0, 1.0, 20.0, 7.0),
                row("S4", Normal, 0.88, 4.0, 1, 3.0, 1.0, 10.0, 4.0),
                row("S5", Triangular, 0.92, 5.0, 1, 1.0, 2.0, 8.0, 5.0),
            ]),
        };

        Self {
            stations,
            buffer_capacities: buffers,
            wip,
            ..Self::default()
        }
    }

    /// Append a station; every station after the first adds a buffer of `upstream_capacity`
    pub fn with_station(mut self, station: StationConfig, upstream_capacity: i64) -> Self {
        if !self.stations.is_empty() {
            self.buffer_capacities.push(upstream_capacity);
        }
        self.stations.push(station);
        self
    }

    pub fn with_wip(mut self, wip: usize) -> Self {
        self.wip = wip;
        self
    }

    pub fn with_warmup_period(mut self, ticks: u64) -> Self {
        self.warmup_period = ticks;
        self
    }

    pub fn with_log_step(mut self, ticks: u64) -> Self {
        self.log_step = ticks;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set every buffer to the same capacity
    pub fn with_buffer_capacities(mut self, capacity: i64) -> Self {
        for c in &mut self.buffer_capacities {
            *c = capacity;
        }
        self
    }

    /// Check the configuration. Accepted configurations may still carry warnings.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.layout().map(|layout| layout.warnings)
    }

    pub(crate) fn layout(&self) -> Result<LineLayout, ConfigError> {
        if self.log_step == 0 {
            return Err(ConfigError::InvalidLogStep);
        }
        if self.stations.is_empty() {
            return Err(ConfigError::EmptyLine);
        }
        if self.buffer_capacities.len() != self.stations.len() - 1 {
            return Err(ConfigError::BufferCountMismatch {
                stations: self.stations.len(),
                buffers: self.buffer_capacities.len(),
            });
        }

        let mut warnings = Vec::new();
        let mut stations = Vec::with_capacity(self.stations.len());
        for (index, config) in self.stations.iter().enumerate() {
            let id = StationId::new(config.id.clone());

            let batch_size = usize::try_from(config.batch_size)
                .ok()
                .filter(|&b| b >= 1)
                .ok_or_else(|| ConfigError::InvalidBatchSize {
                    station: id.clone(),
                    batch_size: config.batch_size,
                })?;
            let machines = usize::try_from(config.parallel_machines)
                .ok()
                .filter(|&m| m >= 1)
                .ok_or_else(|| ConfigError::InvalidMachineCount {
                    station: id.clone(),
                    machines: config.parallel_machines,
                })?;

            if !config.oee.is_finite() || config.oee <= 0.0 || config.oee > 1.0 {
                return Err(ConfigError::InvalidOee {
                    station: id,
                    oee: config.oee,
                });
            }
            if config.oee < distribution::OEE_FLOOR {
                warnings.push(ConfigWarning::OeeClamped {
                    station: id.clone(),
                    configured: config.oee,
                    applied: distribution::effective_oee(config.oee),
                });
            }

            config
                .distribution
                .validate()
                .map_err(|reason| ConfigError::InvalidDistribution {
                    station: id.clone(),
                    reason,
                })?;

            stations.push(Station::new(
                id,
                index,
                batch_size,
                machines,
                config.oee,
                config.distribution,
            ));
        }

        let mut buffers = Vec::with_capacity(self.buffer_capacities.len());
        for (index, &capacity) in self.buffer_capacities.iter().enumerate() {
            let upstream = self.stations[index].batch_size;
            let downstream = self.stations[index + 1].batch_size;

            let cap = usize::try_from(capacity)
                .map_err(|_| ConfigError::InvalidCapacity { buffer: index, capacity })?;

            if cap == 0 && upstream != downstream {
                return Err(ConfigError::HandOffBatchMismatch {
                    buffer: index,
                    upstream,
                    downstream,
                });
            }
            let required = transfer_bound(upstream, downstream);
            if cap > 0 && capacity < required {
                return Err(ConfigError::BufferTooSmall {
                    buffer: index,
                    capacity,
                    required,
                });
            }

            buffers.push(Buffer::new(index, cap));
        }

        // the same remainder argument applies to the pieces the cap lets in
        let required = self
            .stations
            .windows(2)
            .map(|pair| transfer_bound(pair[0].batch_size, pair[1].batch_size))
            .chain(std::iter::once(self.stations[0].batch_size))
            .max()
            .unwrap_or(1) as usize;
        if self.wip < required {
            return Err(ConfigError::WipTooSmall {
                wip: self.wip,
                required,
            });
        }

        Ok(LineLayout {
            stations,
            buffers,
            warnings,
        })
    }
}

/// Smallest store that never deadlocks between batches of `upstream` and
/// `downstream`. Contents move in steps of `+upstream` and `-downstream`, so
/// the remainder left after a pop can reach `downstream - gcd`, and one more
/// upstream batch must still fit on top of it.
fn transfer_bound(upstream: i64, downstream: i64) -> i64 {
    upstream + downstream - gcd(upstream, downstream)
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
