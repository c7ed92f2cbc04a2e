// src/models/ou_process.rs
//! Ornstein-Uhlenbeck Recurrence Evaluator
//!
//! # Mathematical Framework
//!
//! The mean-zero OU process relaxes towards 0 on timescale τ with
//! stationary standard deviation σ:
//! ```text
//! dX_t = -X_t / τ dt + σ √(2/τ) dW_t
//! ```
//!
//! Sampled on a grid of spacing Δt, the process obeys the exact linear
//! recurrence
//! ```text
//! X_{n+1} = X_n · relax + diffuse · Z_n,    Z_n ~ N(0,1)
//! relax   = exp(-Δt/τ)
//! diffuse = σ √(1 - relax²)
//! ```
//! so the stationary variance of the discrete chain is exactly σ².
//!
//! # Validation
//!
//! Inputs are validated before any work is done. A short noise slice, a
//! non-positive `dt` or `tau`, a negative `sigma` and any non-finite value
//! return [`SdeError::InvalidArgument`]. Extra noise beyond `num_steps` is
//! ignored.
//!
//! [`SdeError::InvalidArgument`]: crate::error::SdeError::InvalidArgument

use crate::error::{validation::*, SdeResult};
use crate::path::SamplePath;

/// Physical parameters of the discretized OU process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OuParams {
    pub dt: f64,    // Time step
    pub x0: f64,    // Initial value
    pub tau: f64,   // Relaxation timescale
    pub sigma: f64, // Stationary standard deviation
}

impl Default for OuParams {
    fn default() -> Self {
        OuParams {
            dt: 0.1,
            x0: 0.0,
            tau: 1.0,
            sigma: 2.0,
        }
    }
}

impl OuParams {
    pub fn new(dt: f64, x0: f64, tau: f64, sigma: f64) -> Self {
        OuParams { dt, x0, tau, sigma }
    }

    /// Validate the parameter set
    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("dt", self.dt)?;
        validate_finite("x0", self.x0)?;
        validate_positive("tau", self.tau)?;
        validate_non_negative("sigma", self.sigma)?;
        Ok(())
    }

    /// Per-step coefficients of the recurrence.
    ///
    /// Assumes the parameters are valid; call [`OuParams::validate`] first
    /// when they come from outside.
    pub fn coefficients(&self) -> OuCoefficients {
        let relax = (-self.dt / self.tau).exp();
        // relax² can round above 1 for tiny dt/tau
        let diffuse = self.sigma * (1.0 - relax * relax).max(0.0).sqrt();
        OuCoefficients { relax, diffuse }
    }
}

/// Per-step decay and noise scaling of the recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OuCoefficients {
    pub relax: f64,
    pub diffuse: f64,
}

impl OuCoefficients {
    #[inline(always)]
    pub fn step(&self, x: f64, z: f64) -> f64 {
        x * self.relax + self.diffuse * z
    }
}

/// Evaluate an OU sample path from `num_steps` standard-normal draws.
///
/// Returns a fresh path of length `num_steps + 1` starting at `params.x0`.
/// The computation is strictly sequential along the step axis and has no
/// side effects, so it may be called from any number of threads at once.
///
/// # Errors
///
/// [`SdeError::InvalidArgument`](crate::error::SdeError::InvalidArgument) if
/// `noise` holds fewer than `num_steps` draws or any parameter is out of range.
pub fn evaluate(num_steps: usize, noise: &[f64], params: &OuParams) -> SdeResult<SamplePath> {
    validate_noise_len(noise.len(), num_steps)?;
    params.validate()?;

    let coeffs = params.coefficients();
    let mut values = Vec::with_capacity(num_steps + 1);
    values.push(params.x0);

    let mut x = params.x0;
    for &z in &noise[..num_steps] {
        x = coeffs.step(x, z);
        values.push(x);
    }

    Ok(SamplePath::from_vec(values))
}

/// [`evaluate`] with `dt=0.1, x0=0.0, tau=1.0, sigma=2.0`.
pub fn evaluate_default(num_steps: usize, noise: &[f64]) -> SdeResult<SamplePath> {
    evaluate(num_steps, noise, &OuParams::default())
}
