//! Sampling ranges for the two input variables.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A sampled numeric range: `step_count + 1` evenly spaced points from
/// `lower` to `upper` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComputingBound {
    lower: f64,
    upper: f64,
    step_count: usize,
}

impl ComputingBound {
    /// Create a bound, rejecting empty or inverted ranges.
    pub fn new(lower: f64, upper: f64, step_count: usize) -> Result<Self, ConfigError> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(ConfigError::InvalidBound { lower, upper });
        }
        if step_count == 0 {
            return Err(ConfigError::InvalidStepCount);
        }
        Ok(Self {
            lower,
            upper,
            step_count,
        })
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Distance between two consecutive samples.
    #[inline]
    pub fn step(&self) -> f64 {
        (self.upper - self.lower) / self.step_count as f64
    }

    /// Number of sampled points (`step_count + 1`).
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.step_count + 1
    }

    /// Value of the `i`-th sample.
    #[inline]
    pub fn sample(&self, i: usize) -> f64 {
        self.lower + i as f64 * self.step()
    }

    /// All sampled values in order.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.step_count).map(move |i| self.sample(i))
    }
}

impl Default for ComputingBound {
    fn default() -> Self {
        Self {
            lower: -1.0,
            upper: 1.0,
            step_count: 20,
        }
    }
}

#[derive(Deserialize)]
struct ComputingBoundRepr {
    lower: f64,
    upper: f64,
    step_count: usize,
}

impl<'de> Deserialize<'de> for ComputingBound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = ComputingBoundRepr::deserialize(deserializer)?;
        ComputingBound::new(repr.lower, repr.upper, repr.step_count)
            .map_err(serde::de::Error::custom)
    }
}
