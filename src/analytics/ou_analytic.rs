// src/analytics/ou_analytic.rs
//! Closed-form results for the discretized OU chain
//!
//! # Mathematical Foundation
//!
//! With `relax = exp(-Δt/τ)` and `diffuse = σ√(1 - relax²)`, the chain
//! ```text
//! X_{n+1} = relax · X_n + diffuse · Z_n
//! ```
//! is Gaussian with
//! ```text
//! E[X_n]          = x₀ · relaxⁿ
//! Var[X_n]        = σ² (1 - relax²ⁿ)
//! Corr[X_n, X_m]  → relax^|n-m|   (stationary regime)
//! X_{n+1} | X_n   ~ N(relax · X_n, diffuse²)
//! ```
//! These are exact for the discrete recurrence, not only in the Δt → 0 limit.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::ou_process::OuParams;
use crate::path::SamplePath;
use statrs::distribution::{Continuous, Normal};

/// Expected value after `step` steps from `x0`
pub fn mean_at(params: &OuParams, step: usize) -> SdeResult<f64> {
    params.validate()?;
    Ok(params.x0 * params.coefficients().relax.powf(step as f64))
}

/// Variance after `step` steps (deterministic start)
pub fn variance_at(params: &OuParams, step: usize) -> SdeResult<f64> {
    params.validate()?;
    let relax = params.coefficients().relax;
    Ok(params.sigma * params.sigma * (1.0 - relax.powf(2.0 * step as f64)))
}

pub fn stationary_variance(params: &OuParams) -> SdeResult<f64> {
    params.validate()?;
    Ok(params.sigma * params.sigma)
}

/// Stationary autocorrelation at a lag of `lag` steps
pub fn autocorrelation(params: &OuParams, lag: usize) -> SdeResult<f64> {
    params.validate()?;
    Ok(params.coefficients().relax.powf(lag as f64))
}

/// Distribution of the next value given the current one.
///
/// Requires `sigma > 0`; with `sigma == 0` the transition is a point mass.
pub fn transition(params: &OuParams, x_prev: f64) -> SdeResult<Normal> {
    params.validate()?;
    validate_positive("sigma", params.sigma)?;
    validate_finite("x_prev", x_prev)?;

    let coeffs = params.coefficients();
    Normal::new(coeffs.relax * x_prev, coeffs.diffuse).map_err(|e| {
        SdeError::NumericalInstability {
            method: "OU transition".to_string(),
            reason: format!("{} (diffuse = {})", e, coeffs.diffuse),
        }
    })
}

/// Exact log-likelihood of a path's increments under `params`.
///
/// The starting value is treated as given, so a single-point path has
/// log-likelihood 0.
pub fn path_log_likelihood(path: &SamplePath, params: &OuParams) -> SdeResult<f64> {
    params.validate()?;
    validate_positive("sigma", params.sigma)?;

    let coeffs = params.coefficients();
    if coeffs.diffuse <= 0.0 {
        return Err(SdeError::NumericalInstability {
            method: "OU log-likelihood".to_string(),
            reason: format!("degenerate transition (dt/tau = {})", params.dt / params.tau),
        });
    }

    let mut total = 0.0;
    for w in path.as_slice().windows(2) {
        let normal = Normal::new(coeffs.relax * w[0], coeffs.diffuse).map_err(|e| {
            SdeError::NumericalInstability {
                method: "OU log-likelihood".to_string(),
                reason: format!("{} (x = {})", e, w[0]),
            }
        })?;
        total += normal.ln_pdf(w[1]);
    }

    if !total.is_finite() {
        return Err(SdeError::NumericalInstability {
            method: "OU log-likelihood".to_string(),
            reason: format!("log-likelihood is not finite: {}", total),
        });
    }
    Ok(total)
}

/// Least-squares estimate of `(tau, sigma)` from one path sampled at `dt`.
///
/// # Algorithm
///
/// 1. Regress `X_{n+1}` on `X_n` through the origin: `relax = Σ xₙxₙ₊₁ / Σ xₙ²`
/// 2. `tau = -dt / ln(relax)`
/// 3. Residual variance `s²` estimates `diffuse²`, so `sigma = s / √(1 - relax²)`
///
/// The returned `x0` is the path's first value.
pub fn estimate_params(path: &SamplePath, dt: f64) -> SdeResult<OuParams> {
    validate_positive("dt", dt)?;
    if path.num_steps() < 2 {
        return Err(SdeError::InvalidArgument {
            parameter: "path".to_string(),
            reason: format!("needs at least 2 steps, got {}", path.num_steps()),
        });
    }

    let xs = path.as_slice();
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for w in xs.windows(2) {
        sxy += w[0] * w[1];
        sxx += w[0] * w[0];
    }
    let relax = sxy / sxx;
    if !(relax > 0.0 && relax < 1.0) {
        return Err(SdeError::NumericalInstability {
            method: "OU estimation".to_string(),
            reason: format!("fitted relax = {} is outside (0, 1)", relax),
        });
    }

    let n = (xs.len() - 1) as f64;
    let resid_var = xs
        .windows(2)
        .map(|w| (w[1] - relax * w[0]).powi(2))
        .sum::<f64>()
        / n;

    Ok(OuParams {
        dt,
        x0: xs[0],
        tau: -dt / relax.ln(),
        sigma: (resid_var / (1.0 - relax * relax)).sqrt(),
    })
}
