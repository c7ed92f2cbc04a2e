// src/rng.rs
//! Standard-Normal Noise for OU Replicates
//!
//! # Design
//!
//! The evaluator only needs "N independent N(0,1) draws". This module
//! supplies them from `rand` generators through `rand_distr::StandardNormal`.
//!
//! # Reproducible Replicates
//!
//! Each replicate gets its own `StdRng` seeded from `(base_seed + replicate)`:
//! - Replicate streams never share state, so they can be drawn on any thread
//! - A replicate's noise depends only on the base seed and its index, so
//!   results are identical whatever the thread count or execution order

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Anything that can produce an ordered sequence of standard-normal draws.
pub trait NoiseSource {
    fn standard_normal(&mut self) -> f64;

    /// Draw `n` independent standard normals.
    fn standard_normals(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.standard_normal()).collect()
    }
}

impl<R: Rng + ?Sized> NoiseSource for R {
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(self)
    }
}

/// RNG factory for reproducible per-replicate streams
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Create the generator for a specific replicate
    pub fn create_std_rng(&self, replicate: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(replicate))
    }

    /// Noise sequence of length `num_steps` for a specific replicate
    pub fn replicate_noise(&self, replicate: u64, num_steps: usize) -> Vec<f64> {
        self.create_std_rng(replicate).standard_normals(num_steps)
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
