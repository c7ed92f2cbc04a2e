// src/path.rs
use std::ops::Index;

/// Discretized sample path of a scalar process.
///
/// Element `i` is the process value at time `i * dt`. A path produced by the
/// evaluator always holds `num_steps + 1` values and is never empty. There
/// are no mutating accessors; take ownership of the values with
/// [`SamplePath::into_vec`] if a mutable buffer is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePath {
    values: Vec<f64>,
}

impl SamplePath {
    pub(crate) fn from_vec(values: Vec<f64>) -> Self {
        debug_assert!(!values.is_empty());
        SamplePath { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of time points (`num_steps + 1`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of recurrence steps taken.
    pub fn num_steps(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    pub fn initial(&self) -> f64 {
        self.values[0]
    }

    pub fn terminal(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// Time grid `0, dt, 2dt, ...` matching the path's points.
    pub fn times(&self, dt: f64) -> Vec<f64> {
        (0..self.values.len()).map(|i| i as f64 * dt).collect()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl Index<usize> for SamplePath {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl AsRef<[f64]> for SamplePath {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a SamplePath {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let path = SamplePath::from_vec(vec![1.0, 0.5, 0.25]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.num_steps(), 2);
        assert_eq!(path.initial(), 1.0);
        assert_eq!(path.terminal(), 0.25);
        assert_eq!(path[1], 0.5);
        assert_eq!(path.times(0.1).len(), 3);
        assert!((path.times(0.1)[2] - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_single_point_path() {
        let path = SamplePath::from_vec(vec![3.0]);
        assert_eq!(path.num_steps(), 0);
        assert_eq!(path.initial(), path.terminal());
        assert_eq!(path.into_vec(), vec![3.0]);
    }
}
