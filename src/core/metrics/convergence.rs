//! Steady-state detection over periodically sampled throughput.
//!
//! This is a heuristic: a low coefficient of variation over a recent window
//! suggests the line has settled, it does not prove stationarity. A slowly
//! drifting line can pass the test and a periodic one can fail it.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW: usize = 50;
pub const DEFAULT_CV_THRESHOLD: f64 = 0.05;

/// Advisory state of the steady-state detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The clock has not yet passed the warm-up period
    WarmingUp { current: u64, warmup: u64 },
    /// Fewer samples than the detector window
    CollectingData { samples: usize, window: usize },
    /// Throughput has averaged zero over the window
    WaitingForFlow,
    Unstable { cv: f64 },
    SteadyState { cv: f64 },
}

impl ConvergenceStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceStatus::SteadyState { .. })
    }
}

impl std::fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvergenceStatus::WarmingUp { current, warmup } => {
                write!(f, "Warm-up period: {} / {} ticks", current, warmup)
            }
            ConvergenceStatus::CollectingData { samples, window } => {
                write!(f, "Collecting data ({}/{} samples)", samples, window)
            }
            ConvergenceStatus::WaitingForFlow => write!(f, "Waiting for stabilization"),
            ConvergenceStatus::Unstable { cv } => {
                write!(f, "Not stable (CV: {:.3}), continuing", cv)
            }
            ConvergenceStatus::SteadyState { cv } => {
                write!(f, "Steady state reached (throughput CV: {:.3})", cv)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceDetector {
    pub window: usize,
    pub cv_threshold: f64,
}

impl Default for ConvergenceDetector {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            cv_threshold: DEFAULT_CV_THRESHOLD,
        }
    }
}

impl ConvergenceDetector {
    pub fn new(window: usize, cv_threshold: f64) -> Self {
        Self {
            window: window.max(1),
            cv_threshold,
        }
    }

    /// Evaluate the most recent `window` throughput samples.
    ///
    /// Callers only pass samples taken after the warm-up period.
    pub fn evaluate(&self, throughput_samples: &[f64]) -> ConvergenceStatus {
        if throughput_samples.len() < self.window {
            return ConvergenceStatus::CollectingData {
                samples: throughput_samples.len(),
                window: self.window,
            };
        }

        let recent = &throughput_samples[throughput_samples.len() - self.window..];
        let n = recent.len() as f64;
        let mean = recent.iter().sum::<f64>() / n;
        if mean <= 0.0 {
            return ConvergenceStatus::WaitingForFlow;
        }

        let variance = recent.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let cv = variance.sqrt() / mean;
        if cv < self.cv_threshold {
            ConvergenceStatus::SteadyState { cv }
        } else {
            ConvergenceStatus::Unstable { cv }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_full_window() {
        let detector = ConvergenceDetector::default();
        let samples = vec![720.0; 49];
        assert_eq!(
            detector.evaluate(&samples),
            ConvergenceStatus::CollectingData {
                samples: 49,
                window: 50
            }
        );
    }

    #[test]
    fn test_flat_series_converges() {
        let detector = ConvergenceDetector::default();
        let samples = vec![720.0; 60];
        let status = detector.evaluate(&samples);
        assert!(status.is_converged());
        assert!(status.to_string().contains("0.000"));
    }

    #[test]
    fn test_zero_mean_waits() {
        let detector = ConvergenceDetector::new(5, 0.05);
        assert_eq!(detector.evaluate(&[0.0; 5]), ConvergenceStatus::WaitingForFlow);
    }

    #[test]
    fn test_noisy_series_is_unstable() {
        let detector = ConvergenceDetector::new(4, 0.05);
        let status = detector.evaluate(&[100.0, 200.0, 100.0, 200.0]);
        match status {
            ConvergenceStatus::Unstable { cv } => assert!((cv - 1.0 / 3.0).abs() < 1e-9),
            other => panic!("expected unstable, got {:?}", other),
        }
    }

    #[test]
    fn test_only_recent_window_counts() {
        let detector = ConvergenceDetector::new(3, 0.05);
        // early transient is outside the window
        let status = detector.evaluate(&[0.0, 10.0, 500.0, 100.0, 100.0, 100.0]);
        assert!(status.is_converged());
    }
}
