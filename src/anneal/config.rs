//! Annealing configuration.

use crate::error::{Result, SolverError};

/// Iteration scalars chosen from the previous round's uphill-acceptance
/// rate: the further the rate sits from the productive middle band, the
/// shorter the next round before re-evaluating.
const SCALAR_OUTER: usize = 4;
const SCALAR_MID: usize = 8;
const SCALAR_INNER: usize = 32;

/// Configuration for one partition's annealing run.
///
/// # Examples
///
/// ```
/// use strata_anneal::anneal::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_cooling_factor(0.98)
///     .with_calibration_samples(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AnnealConfig {
    /// Geometric cooling factor applied every iteration.
    pub cooling_factor: f64,

    /// Starting temperature override. When unset, the runner derives it
    /// by sampling uphill cost deltas (calibration).
    pub initial_temperature: Option<f64>,

    /// Uphill samples to collect during calibration.
    pub calibration_samples: usize,

    /// Sample quantile pinned to the target acceptance probability.
    pub calibration_quantile: f64,

    /// Acceptance probability the quantile delta should get at `T0`.
    pub calibration_acceptance: f64,

    /// Hard cap on calibration iterations. Hitting it without filling
    /// the sample buffer is fatal: cost variance is too low to anneal.
    pub calibration_cap: usize,

    /// Temperature below which the search is considered frozen.
    pub frozen_temperature: f64,

    /// Sliding-window length for per-round uphill-acceptance rates.
    pub uphill_window: usize,

    /// Window-average rate below which the search stops: it can no
    /// longer escape local optima.
    pub uphill_threshold: f64,

    /// Iteration scalar for the first round (iterations = scalar × N).
    pub initial_scalar: usize,

    /// Maximum rounds. 0 = no limit.
    pub max_rounds: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            cooling_factor: 0.98,
            initial_temperature: None,
            calibration_samples: 200,
            calibration_quantile: 0.9,
            calibration_acceptance: 0.7,
            calibration_cap: 50_000,
            frozen_temperature: 1e-50,
            uphill_window: 8,
            uphill_threshold: 0.0025,
            initial_scalar: SCALAR_MID,
            max_rounds: 0,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = factor;
        self
    }

    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.initial_temperature = Some(t0);
        self
    }

    pub fn with_calibration_samples(mut self, samples: usize) -> Self {
        self.calibration_samples = samples;
        self
    }

    pub fn with_calibration_cap(mut self, cap: usize) -> Self {
        self.calibration_cap = cap;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Scalar for the round following one with the given uphill rate.
    pub(crate) fn scalar_for(&self, rate: f64) -> usize {
        if !(0.2..=0.7).contains(&rate) {
            SCALAR_OUTER
        } else if !(0.3..=0.6).contains(&rate) {
            SCALAR_MID
        } else {
            SCALAR_INNER
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cooling_factor <= 0.0 || self.cooling_factor >= 1.0 {
            return Err(SolverError::InvalidConfig(format!(
                "cooling_factor must be in (0, 1), got {}",
                self.cooling_factor
            )));
        }
        if let Some(t0) = self.initial_temperature {
            if t0 <= 0.0 {
                return Err(SolverError::InvalidConfig(
                    "initial_temperature must be positive".into(),
                ));
            }
        }
        if self.calibration_samples == 0 {
            return Err(SolverError::InvalidConfig(
                "calibration_samples must be positive".into(),
            ));
        }
        if self.calibration_cap < self.calibration_samples {
            return Err(SolverError::InvalidConfig(
                "calibration_cap must be at least calibration_samples".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.calibration_quantile) {
            return Err(SolverError::InvalidConfig(
                "calibration_quantile must be in [0, 1]".into(),
            ));
        }
        if self.calibration_acceptance <= 0.0 || self.calibration_acceptance >= 1.0 {
            return Err(SolverError::InvalidConfig(
                "calibration_acceptance must be in (0, 1)".into(),
            ));
        }
        if self.uphill_window == 0 || self.initial_scalar == 0 {
            return Err(SolverError::InvalidConfig(
                "uphill_window and initial_scalar must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(AnnealConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_cooling_factor() {
        assert!(AnnealConfig::default()
            .with_cooling_factor(1.0)
            .validate()
            .is_err());
        assert!(AnnealConfig::default()
            .with_cooling_factor(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_cap_below_samples() {
        let config = AnnealConfig::default()
            .with_calibration_samples(100)
            .with_calibration_cap(50);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scalar_table() {
        let config = AnnealConfig::default();
        // Outside the wide band: short rounds.
        assert_eq!(config.scalar_for(1.0), 4);
        assert_eq!(config.scalar_for(0.1), 4);
        // Between the bands: medium rounds.
        assert_eq!(config.scalar_for(0.25), 8);
        assert_eq!(config.scalar_for(0.65), 8);
        // In the productive middle: long rounds.
        assert_eq!(config.scalar_for(0.45), 32);
        assert_eq!(config.scalar_for(0.3), 32);
        assert_eq!(config.scalar_for(0.6), 32);
    }
}
