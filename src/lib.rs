//! # ou-sde: Ornstein-Uhlenbeck Sample Paths
//!
//! A Rust library for generating discretized Ornstein-Uhlenbeck sample paths
//! and running large ensembles of independent replicates in parallel.
//!
//! ## Key Features
//!
//! - **Exact Recurrence**: Paths follow the exact discrete-time OU transition
//! - **Pure Evaluator**: No hidden state, safe to call from any thread
//! - **Parallel Replicates**: Ensembles run on Rayon with ordered results
//! - **Reproducible**: Per-replicate seeding independent of thread count
//! - **Analytics**: Closed-form moments, transition law and path likelihood
//!
//! ## Quick Start
//!
//! ```rust
//! use ou_sde::models::ou_process::{evaluate, OuParams};
//!
//! let params = OuParams { x0: 1.0, ..Default::default() };
//! let path = evaluate(3, &[0.0, 0.0, 0.0], &params).expect("Valid inputs");
//! assert_eq!(path.len(), 4);
//! assert_eq!(path[0], 1.0);
//! ```
//!
//! Ensembles draw their own noise:
//!
//! ```rust
//! use ou_sde::mc::ensemble::{simulate_ensemble, EnsembleConfig};
//!
//! let config = EnsembleConfig {
//!     replicates: 100,
//!     num_steps: 50,
//!     seed: 42,
//!     ..Default::default()
//! };
//! let ensemble = simulate_ensemble(&config).expect("Valid configuration");
//! assert_eq!(ensemble.to_array().dim(), (100, 51));
//! ```

// Module declarations
pub mod error;
pub mod path;
pub mod rng;
pub mod models;
pub mod mc;
pub mod analytics;
pub mod output;

// Re-export commonly used types for convenience
pub use error::{SdeError, SdeResult};
pub use models::ou_process::{evaluate, OuParams};
pub use path::SamplePath;
