// src/mc/batch.rs
//! Replicate Batches
//!
//! Runs many independent OU evaluations through a caller-chosen executor.
//! Every result stays paired with the index of the job that produced it and
//! results come back in job order whatever executor ran them.
//!
//! # Failures
//!
//! A failing replicate does not abort the batch. Its outcome holds
//! [`SdeError::ReplicateFailed`] with the replicate index and parameters, and
//! the caller decides whether to keep the remaining paths.
//!
//! # Cancellation
//!
//! Cancellation is cooperative. Jobs check the [`CancellationToken`] before
//! starting; jobs that see it set are skipped, jobs already running finish
//! normally. Completed outcomes are always returned intact.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::ou_process::{self, OuParams};
use crate::path::SamplePath;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where replicate evaluations run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Executor {
    /// On the calling thread, in order
    Sequential,
    /// On rayon's global pool
    #[default]
    Rayon,
    /// On a dedicated rayon pool with a fixed number of workers
    ThreadPool { threads: usize },
}

impl Executor {
    /// Dedicated pool sized to the machine's logical CPUs
    pub fn available_parallelism() -> Self {
        Executor::ThreadPool {
            threads: num_cpus::get(),
        }
    }

    pub fn validate(&self) -> SdeResult<()> {
        match self {
            Executor::ThreadPool { threads } => validate_threads(*threads),
            _ => Ok(()),
        }
    }

    /// Apply `f` to every input and return the results in input order.
    pub fn map<T, R, F>(&self, inputs: &[T], f: F) -> SdeResult<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
    {
        self.validate()?;
        let results: Vec<R> = match self {
            Executor::Sequential => inputs.iter().enumerate().map(|(i, x)| f(i, x)).collect(),
            Executor::Rayon => inputs
                .par_iter()
                .enumerate()
                .map(|(i, x)| f(i, x))
                .collect(),
            Executor::ThreadPool { threads } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build()
                    .map_err(|e| SdeError::ThreadPool {
                        reason: e.to_string(),
                    })?;
                pool.install(|| {
                    inputs
                        .par_iter()
                        .enumerate()
                        .map(|(i, x)| f(i, x))
                        .collect()
                })
            }
        };
        Ok(results)
    }
}

/// Shared flag for cooperative batch cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// One replicate: its noise and the parameters to evaluate it with.
#[derive(Clone, Debug)]
pub struct ReplicateJob {
    pub num_steps: usize,
    pub noise: Vec<f64>,
    pub params: OuParams,
}

impl ReplicateJob {
    pub fn new(num_steps: usize, noise: Vec<f64>, params: OuParams) -> Self {
        ReplicateJob {
            num_steps,
            noise,
            params,
        }
    }
}

/// Result of a single replicate, tagged with its job index.
#[derive(Clone, Debug)]
pub struct ReplicateOutcome {
    pub index: usize,
    pub result: SdeResult<SamplePath>,
}

/// Outcomes of a batch, in job order.
///
/// Skipped jobs of a cancelled batch have no outcome, so `outcomes` may be
/// shorter than `requested`; indices are still ascending.
#[derive(Clone, Debug)]
pub struct BatchReport {
    pub outcomes: Vec<ReplicateOutcome>,
    pub requested: usize,
    pub cancelled: bool,
}

impl BatchReport {
    /// Number of replicates that ran, successfully or not
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    /// True when every requested replicate ran and succeeded
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.outcomes.len() == self.requested
            && self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &SdeError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.index, e)))
    }

    pub fn successes(&self) -> impl Iterator<Item = (usize, &SamplePath)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|p| (o.index, p)))
    }

    /// All paths in job order, or the first failure.
    ///
    /// A cancelled batch yields [`SdeError::Cancelled`] even if everything
    /// that ran succeeded; use [`BatchReport::successes`] to keep partial
    /// results.
    pub fn into_paths(self) -> SdeResult<Vec<SamplePath>> {
        if self.cancelled || self.outcomes.len() < self.requested {
            return Err(SdeError::Cancelled {
                completed: self.outcomes.len(),
                requested: self.requested,
            });
        }
        self.outcomes.into_iter().map(|o| o.result).collect()
    }
}

/// Evaluate each job independently on `executor`.
pub fn run_replicates(
    jobs: &[ReplicateJob],
    executor: &Executor,
    cancel: &CancellationToken,
) -> SdeResult<BatchReport> {
    run_indexed(jobs, executor, cancel, |_, job| {
        (
            job.params,
            ou_process::evaluate(job.num_steps, &job.noise, &job.params),
        )
    })
}

/// Shared driver: `eval` returns the parameters it used alongside the
/// result so failures can be reported with context.
pub(crate) fn run_indexed<T, F>(
    inputs: &[T],
    executor: &Executor,
    cancel: &CancellationToken,
    eval: F,
) -> SdeResult<BatchReport>
where
    T: Sync,
    F: Fn(usize, &T) -> (OuParams, SdeResult<SamplePath>) + Sync,
{
    let requested = inputs.len();
    debug!(requested, ?executor, "starting replicate batch");

    let slots = executor.map(inputs, |index, input| {
        if cancel.is_cancelled() {
            return None;
        }
        let (params, result) = eval(index, input);
        let result = result.map_err(|source| {
            warn!(index, error = %source, "replicate failed");
            SdeError::ReplicateFailed {
                index,
                params,
                source: Box::new(source),
            }
        });
        Some(ReplicateOutcome { index, result })
    })?;

    let outcomes: Vec<ReplicateOutcome> = slots.into_iter().flatten().collect();
    let cancelled = cancel.is_cancelled() && outcomes.len() < requested;
    if cancelled {
        info!(
            completed = outcomes.len(),
            requested, "replicate batch cancelled"
        );
    }

    let report = BatchReport {
        outcomes,
        requested,
        cancelled,
    };
    debug!(
        completed = report.completed(),
        failed = report.failures().count(),
        "replicate batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(n: usize) -> Vec<ReplicateJob> {
        (0..n)
            .map(|i| {
                ReplicateJob::new(
                    3,
                    vec![0.0; 3],
                    OuParams {
                        x0: i as f64,
                        ..OuParams::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_order_preserved_for_every_executor() {
        let jobs = jobs(64);
        for executor in [
            Executor::Sequential,
            Executor::Rayon,
            Executor::ThreadPool { threads: 3 },
        ] {
            let report = run_replicates(&jobs, &executor, &CancellationToken::new()).unwrap();
            assert!(report.is_complete());
            for (i, (index, path)) in report.successes().enumerate() {
                assert_eq!(index, i);
                assert_eq!(path.initial(), i as f64);
            }
        }
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let mut jobs = jobs(5);
        jobs[2].noise.truncate(1);

        let report = run_replicates(&jobs, &Executor::Rayon, &CancellationToken::new()).unwrap();
        assert_eq!(report.completed(), 5);
        assert!(!report.is_complete());
        assert_eq!(report.successes().count(), 4);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        let (index, error) = failures[0];
        assert_eq!(index, 2);
        match error {
            SdeError::ReplicateFailed { index, params, .. } => {
                assert_eq!(*index, 2);
                assert_eq!(params.x0, 2.0);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(error.is_invalid_argument());
        assert!(report.into_paths().is_err());
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run_replicates(&jobs(10), &Executor::Sequential, &cancel).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.completed(), 0);
        assert!(matches!(
            report.into_paths(),
            Err(SdeError::Cancelled {
                completed: 0,
                requested: 10
            })
        ));
    }

    #[test]
    fn test_cancel_midway_keeps_completed_results() {
        let cancel = CancellationToken::new();
        let inputs: Vec<usize> = (0..10).collect();

        let report = run_indexed(&inputs, &Executor::Sequential, &cancel, |i, _| {
            if i == 3 {
                cancel.cancel();
            }
            let params = OuParams::default();
            (params, ou_process::evaluate(1, &[1.0], &params))
        })
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.completed(), 4);
        let indices: Vec<usize> = report.successes().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parallel_cancel_keeps_completed_results_paired() {
        let inputs: Vec<usize> = (0..10_000).collect();

        for executor in [Executor::Rayon, Executor::ThreadPool { threads: 3 }] {
            let cancel = CancellationToken::new();
            let report = run_indexed(&inputs, &executor, &cancel, |i, &input| {
                if i == 0 {
                    cancel.cancel();
                }
                let params = OuParams {
                    x0: input as f64,
                    ..OuParams::default()
                };
                (params, ou_process::evaluate(2, &[0.5, -0.5], &params))
            })
            .unwrap();

            assert!(report.cancelled, "{:?}: batch not flagged cancelled", executor);
            assert!(report.completed() < report.requested);
            assert_eq!(report.requested, 10_000);

            let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
            assert_eq!(indices.first(), Some(&0));
            assert!(indices.windows(2).all(|w| w[0] < w[1]));

            for (index, path) in report.successes() {
                assert_eq!(path.initial(), index as f64);
                assert_eq!(path.len(), 3);
            }
            assert_eq!(report.failures().count(), 0);
        }
    }

    #[test]
    fn test_default_executor_is_rayon() {
        assert_eq!(Executor::default(), Executor::Rayon);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = run_replicates(
            &jobs(2),
            &Executor::ThreadPool { threads: 0 },
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SdeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_batch() {
        let report = run_replicates(&[], &Executor::Rayon, &CancellationToken::new()).unwrap();
        assert!(report.is_complete());
        assert!(report.into_paths().unwrap().is_empty());
    }
}
