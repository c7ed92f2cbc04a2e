// src/mc/ensemble.rs
use crate::error::{validation::*, SdeError, SdeResult};
use crate::mc::batch::{run_indexed, BatchReport, CancellationToken, Executor};
use crate::models::ou_process::{self, OuParams};
use crate::path::SamplePath;
use crate::rng::RngFactory;
use ndarray::{Array2, Axis};
use statrs::statistics::Statistics;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct EnsembleConfig {
    pub replicates: usize,
    pub num_steps: usize,
    pub params: OuParams,
    pub seed: u64,
    pub executor: Executor,
}

impl EnsembleConfig {
    /// Validate the ensemble configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_replicates(self.replicates)?;
        self.params.validate()?;
        self.executor.validate()?;
        Ok(())
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            replicates: 1_000,
            num_steps: 100,
            params: OuParams::default(),
            seed: 12345,
            executor: Executor::Rayon,
        }
    }
}

/// Simulate an ensemble of independent OU replicates
///
/// # Algorithm
///
/// For each replicate `i` in parallel:
/// 1. Seed a generator from `seed + i` and draw `num_steps` normals
/// 2. Evaluate the OU recurrence on those draws
///
/// Replicate `i` depends only on `(seed, i)`, so the ensemble is identical
/// for every executor and thread count.
///
/// # Errors
///
/// Returns `SdeError` for an invalid configuration or the first replicate
/// failure.
pub fn simulate_ensemble(cfg: &EnsembleConfig) -> SdeResult<Ensemble> {
    let report = simulate_ensemble_with_cancel(cfg, &CancellationToken::new())?;
    let paths = report.into_paths()?;
    Ensemble::from_paths(paths, cfg.params)
}

/// Like [`simulate_ensemble`], but stops starting new replicates once
/// `cancel` is set and returns whatever completed.
pub fn simulate_ensemble_with_cancel(
    cfg: &EnsembleConfig,
    cancel: &CancellationToken,
) -> SdeResult<BatchReport> {
    cfg.validate()?;
    debug!(
        replicates = cfg.replicates,
        num_steps = cfg.num_steps,
        seed = cfg.seed,
        params = ?cfg.params,
        "simulating OU ensemble"
    );

    let factory = RngFactory::new(cfg.seed);
    let replicate_ids: Vec<u64> = (0..cfg.replicates as u64).collect();

    run_indexed(&replicate_ids, &cfg.executor, cancel, |_, &replicate| {
        let noise = factory.replicate_noise(replicate, cfg.num_steps);
        (
            cfg.params,
            ou_process::evaluate(cfg.num_steps, &noise, &cfg.params),
        )
    })
}

/// A set of equal-length sample paths sharing one parameter set.
#[derive(Clone, Debug)]
pub struct Ensemble {
    paths: Vec<SamplePath>,
    params: OuParams,
}

impl Ensemble {
    /// Group paths into an ensemble; every path must have the same length.
    pub fn from_paths(paths: Vec<SamplePath>, params: OuParams) -> SdeResult<Self> {
        if let Some(first) = paths.first() {
            let len = first.len();
            if let Some(bad) = paths.iter().position(|p| p.len() != len) {
                return Err(SdeError::InvalidConfiguration {
                    field: "paths".to_string(),
                    reason: format!(
                        "path {} has {} points, expected {}",
                        bad,
                        paths[bad].len(),
                        len
                    ),
                });
            }
        }
        Ok(Ensemble { paths, params })
    }

    /// Collect the successful paths of a (possibly partial) batch.
    pub fn from_report(report: &BatchReport, params: OuParams) -> SdeResult<Self> {
        let paths = report.successes().map(|(_, p)| p.clone()).collect();
        Self::from_paths(paths, params)
    }

    pub fn paths(&self) -> &[SamplePath] {
        &self.paths
    }

    pub fn params(&self) -> &OuParams {
        &self.params
    }

    pub fn replicates(&self) -> usize {
        self.paths.len()
    }

    /// Number of time points per path
    pub fn time_points(&self) -> usize {
        self.paths.first().map_or(0, |p| p.len())
    }

    pub fn times(&self) -> Vec<f64> {
        (0..self.time_points())
            .map(|i| i as f64 * self.params.dt)
            .collect()
    }

    /// Replicates × time points matrix.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.replicates(), self.time_points()), |(i, j)| {
            self.paths[i][j]
        })
    }

    pub fn terminal_values(&self) -> Vec<f64> {
        self.paths.iter().map(|p| p.terminal()).collect()
    }

    /// Cross-replicate mean at every time point.
    pub fn mean_path(&self) -> Vec<f64> {
        self.to_array()
            .axis_iter(Axis(1))
            .map(|column| column.iter().mean())
            .collect()
    }

    /// Cross-replicate unbiased variance at every time point (NaN with
    /// fewer than two replicates).
    pub fn variance_path(&self) -> Vec<f64> {
        self.to_array()
            .axis_iter(Axis(1))
            .map(|column| column.iter().variance())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EnsembleConfig {
        EnsembleConfig {
            replicates: 32,
            num_steps: 20,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_ensemble_shape() {
        let ensemble = simulate_ensemble(&small_config()).unwrap();
        assert_eq!(ensemble.replicates(), 32);
        assert_eq!(ensemble.time_points(), 21);
        assert_eq!(ensemble.to_array().dim(), (32, 21));
        assert_eq!(ensemble.times().len(), 21);
        assert_eq!(ensemble.mean_path().len(), 21);
        assert!(ensemble.paths().iter().all(|p| p.initial() == 0.0));
    }

    #[test]
    fn test_executor_independent() {
        let sequential = simulate_ensemble(&EnsembleConfig {
            executor: Executor::Sequential,
            ..small_config()
        })
        .unwrap();
        let pooled = simulate_ensemble(&EnsembleConfig {
            executor: Executor::ThreadPool { threads: 2 },
            ..small_config()
        })
        .unwrap();
        assert_eq!(sequential.paths(), pooled.paths());
    }

    #[test]
    fn test_replicate_matches_direct_evaluation() {
        let cfg = small_config();
        let ensemble = simulate_ensemble(&cfg).unwrap();

        let noise = RngFactory::new(cfg.seed).replicate_noise(5, cfg.num_steps);
        let direct = ou_process::evaluate(cfg.num_steps, &noise, &cfg.params).unwrap();
        assert_eq!(ensemble.paths()[5], direct);
    }

    #[test]
    fn test_invalid_config() {
        let zero = EnsembleConfig {
            replicates: 0,
            ..Default::default()
        };
        assert!(simulate_ensemble(&zero).is_err());

        let bad_tau = EnsembleConfig {
            params: OuParams {
                tau: 0.0,
                ..OuParams::default()
            },
            ..Default::default()
        };
        assert!(simulate_ensemble(&bad_tau).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_mismatched_paths_rejected() {
        let a = ou_process::evaluate(2, &[0.0, 0.0], &OuParams::default()).unwrap();
        let b = ou_process::evaluate(3, &[0.0, 0.0, 0.0], &OuParams::default()).unwrap();
        assert!(Ensemble::from_paths(vec![a, b], OuParams::default()).is_err());
    }

    #[test]
    fn test_cancelled_ensemble_is_partial() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = simulate_ensemble_with_cancel(&small_config(), &cancel).unwrap();
        assert!(report.cancelled);

        let ensemble = Ensemble::from_report(&report, small_config().params).unwrap();
        assert_eq!(ensemble.replicates(), 0);
        assert_eq!(ensemble.time_points(), 0);
    }
}
