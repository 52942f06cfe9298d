use rand::Rng;
use rand_distr::OpenClosed01;
use serde::{Deserialize, Serialize};

/// Lowest OEE used when inflating processing times
pub const OEE_FLOOR: f64 = 0.01;

/// Shape of a station's processing-time distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionKind {
    Deterministic,
    Uniform,
    Normal,
    Exponential,
    Triangular,
}

impl Default for DistributionKind {
    fn default() -> Self {
        DistributionKind::Deterministic
    }
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DistributionKind::Deterministic => "deterministic",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Normal => "normal",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Triangular => "triangular",
        };
        write!(f, "{}", name)
    }
}

/// Full parameter set. Every kind reads only the fields it needs, the rest are kept
/// so a station can switch kinds without losing its other settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionParams {
    pub mean: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub mode: f64,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            mean: 5.0,
            variance: 1.0,
            min: 2.0,
            max: 8.0,
            mode: 5.0,
        }
    }
}

/// Processing-time distribution of a station, in ticks before OEE inflation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub kind: DistributionKind,
    pub params: DistributionParams,
}

impl Distribution {
    pub fn deterministic(mean: f64) -> Self {
        Self::with_kind(DistributionKind::Deterministic, DistributionParams {
            mean,
            ..Default::default()
        })
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        Self::with_kind(DistributionKind::Uniform, DistributionParams {
            min,
            max,
            mean: (min + max) / 2.0,
            ..Default::default()
        })
    }

    pub fn normal(mean: f64, variance: f64) -> Self {
        Self::with_kind(DistributionKind::Normal, DistributionParams {
            mean,
            variance,
            ..Default::default()
        })
    }

    pub fn exponential(mean: f64) -> Self {
        Self::with_kind(DistributionKind::Exponential, DistributionParams {
            mean,
            ..Default::default()
        })
    }

    pub fn triangular(min: f64, mode: f64, max: f64) -> Self {
        Self::with_kind(DistributionKind::Triangular, DistributionParams {
            min,
            mode,
            max,
            mean: (min + mode + max) / 3.0,
            ..Default::default()
        })
    }

    pub fn with_kind(kind: DistributionKind, params: DistributionParams) -> Self {
        Self { kind, params }
    }

    /// Check the parameters the configured kind actually reads
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.params;
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{} must be finite, got {}", name, v))
            }
        };

        match self.kind {
            DistributionKind::Deterministic | DistributionKind::Exponential => {
                finite("mean", p.mean)?;
                if p.mean < 0.0 {
                    return Err(format!("mean must be non-negative, got {}", p.mean));
                }
            }
            DistributionKind::Normal => {
                finite("mean", p.mean)?;
                finite("variance", p.variance)?;
                if p.variance < 0.0 {
                    return Err(format!("variance must be non-negative, got {}", p.variance));
                }
            }
            DistributionKind::Uniform => {
                finite("min", p.min)?;
                finite("max", p.max)?;
                if p.min > p.max {
                    return Err(format!("min {} exceeds max {}", p.min, p.max));
                }
            }
            DistributionKind::Triangular => {
                finite("min", p.min)?;
                finite("mode", p.mode)?;
                finite("max", p.max)?;
                if !(p.min <= p.mode && p.mode <= p.max) {
                    return Err(format!(
                        "expected min <= mode <= max, got {} / {} / {}",
                        p.min, p.mode, p.max
                    ));
                }
            }
        }
        Ok(())
    }

    /// Draw a raw processing time, before OEE inflation and rounding.
    ///
    /// Consumes no random draws for deterministic, two for normal, one otherwise.
    pub fn sample_base<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let p = &self.params;
        match self.kind {
            DistributionKind::Deterministic => p.mean,
            DistributionKind::Uniform => {
                let u: f64 = rng.gen();
                p.min + u * (p.max - p.min)
            }
            DistributionKind::Normal => {
                // Box-Muller; both draws lie in (0, 1] so ln(u) is finite
                let u: f64 = rng.sample(OpenClosed01);
                let v: f64 = rng.sample(OpenClosed01);
                let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
                p.mean + z * p.variance.sqrt()
            }
            DistributionKind::Exponential => {
                let u: f64 = rng.gen();
                -p.mean * (1.0 - u).ln()
            }
            DistributionKind::Triangular => {
                let u: f64 = rng.gen();
                let range = p.max - p.min;
                if range <= 0.0 {
                    return p.min;
                }
                let f = (p.mode - p.min) / range;
                if u < f {
                    p.min + (u * range * (p.mode - p.min)).sqrt()
                } else {
                    p.max - ((1.0 - u) * range * (p.max - p.mode)).sqrt()
                }
            }
        }
    }
}

/// OEE actually applied by the sampler
pub fn effective_oee(oee: f64) -> f64 {
    oee.max(OEE_FLOOR)
}

/// Sample a processing duration in whole ticks: the raw draw inflated by OEE,
/// rounded, and never shorter than one tick.
pub fn sample<R: Rng + ?Sized>(distribution: &Distribution, oee: f64, rng: &mut R) -> u64 {
    let base = distribution.sample_base(rng);
    let effective = (base / effective_oee(oee)).round();
    // f64::max drops NaN in favour of the floor
    effective.max(1.0) as u64
}
