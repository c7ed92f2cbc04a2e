// src/error.rs
use crate::models::ou_process::OuParams;
use thiserror::Error;

/// Error types for the ou-sde library
#[derive(Error, Debug, Clone)]
pub enum SdeError {
    /// A caller-supplied argument violates a precondition
    #[error("Invalid argument '{parameter}': {reason}")]
    InvalidArgument { parameter: String, reason: String },

    /// Invalid ensemble or batch configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// One replicate of a batch failed to evaluate
    #[error("Replicate {index} failed (dt={}, x0={}, tau={}, sigma={}): {source}", .params.dt, .params.x0, .params.tau, .params.sigma)]
    ReplicateFailed {
        index: usize,
        params: OuParams,
        #[source]
        source: Box<SdeError>,
    },

    /// Batch was cancelled before every replicate completed
    #[error("Batch cancelled after {completed} of {requested} replicates")]
    Cancelled { completed: usize, requested: usize },

    /// Dedicated worker pool could not be built
    #[error("Failed to build worker pool: {reason}")]
    ThreadPool { reason: String },

    /// Numerical instability in a derived quantity
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

impl SdeError {
    /// True for precondition violations, including ones wrapped by a failed replicate.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            SdeError::InvalidArgument { .. } => true,
            SdeError::ReplicateFailed { source, .. } => source.is_invalid_argument(),
            _ => false,
        }
    }
}

/// Result type alias for ou-sde operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    fn invalid(name: &str, reason: String) -> SdeError {
        SdeError::InvalidArgument {
            parameter: name.to_string(),
            reason,
        }
    }

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        if !(value.is_finite() && value > 0.0) {
            Err(invalid(name, format!("must be positive and finite (> 0), got {}", value)))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        if !(value.is_finite() && value >= 0.0) {
            Err(invalid(name, format!("must be non-negative and finite (≥ 0), got {}", value)))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(invalid(name, format!("must be finite (not NaN or infinite), got {}", value)))
        } else {
            Ok(())
        }
    }

    /// Validate that enough noise draws were supplied for `num_steps`
    pub fn validate_noise_len(noise_len: usize, num_steps: usize) -> SdeResult<()> {
        if noise_len < num_steps {
            Err(invalid(
                "noise",
                format!("needs at least {} draws, got {}", num_steps, noise_len),
            ))
        } else {
            Ok(())
        }
    }

    /// Validate replicate count
    pub fn validate_replicates(replicates: usize) -> SdeResult<()> {
        if replicates == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "replicates".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if replicates > 100_000_000 {
            Err(SdeError::InvalidConfiguration {
                field: "replicates".to_string(),
                reason: "exceeds maximum allowed (100 million)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate worker thread count for a dedicated pool
    pub fn validate_threads(threads: usize) -> SdeResult<()> {
        if threads == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "threads".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
