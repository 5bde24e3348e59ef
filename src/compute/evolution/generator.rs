//! Random expression tree generation.

use rand::prelude::*;

use crate::ast::{BinaryOp, Node, NodeRef};
use crate::compute::{Optimized, optimize};
use crate::schema::GeneratorConfig;

/// Names of the variables a generated tree may reference.
pub const VARIABLES: [&str; 2] = ["x", "y"];

/// Builds random trees, biased toward composite nodes near the root and
/// leaves near the maximum depth.
#[derive(Debug, Clone)]
pub struct TreeGenerator {
    max_depth: usize,
    constant_magnitude: u32,
}

impl Default for TreeGenerator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl TreeGenerator {
    /// Generator with the default constant range. A depth of 0 is treated as 1.
    pub fn new(max_depth: usize) -> Self {
        Self::with_config(max_depth, &GeneratorConfig::default())
    }

    pub fn with_config(max_depth: usize, config: &GeneratorConfig) -> Self {
        Self {
            max_depth: max_depth.max(1),
            constant_magnitude: config.constant_magnitude.max(1),
        }
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Generate an optimized random tree.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Optimized {
        let tree = self.grow(rng, 0);
        optimize(&tree)
    }

    /// Generate a raw tree without optimization.
    pub fn grow<R: Rng + ?Sized>(&self, rng: &mut R, depth: usize) -> NodeRef {
        let max = self.max_depth as f64;
        let d = depth as f64;
        let root_bias = (max - d) / max;
        let leaf_bias = 3.0 * d / max;
        let kind = (rng.gen_range(0..5u32) as f64 + root_bias - leaf_bias).clamp(0.0, 4.0);

        if kind <= 0.0 {
            Node::constant(self.random_constant(rng))
        } else if kind <= 1.0 {
            Node::identifier(random_identifier(rng))
        } else if kind <= 2.0 {
            Node::negate(self.grow(rng, depth + 1))
        } else if kind <= 3.0 {
            Node::ternary(
                self.grow(rng, depth + 1),
                self.grow(rng, depth + 1),
                Some(self.grow(rng, depth + 1)),
            )
        } else {
            let op = BinaryOp::ALL[rng.gen_range(0..BinaryOp::ALL.len())];
            Node::binary(op, self.grow(rng, depth + 1), self.grow(rng, depth + 1))
        }
    }

    /// Signed value with a uniform integer magnitude plus a fraction in `[0, 1)`.
    pub fn random_constant<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut value = rng.gen_range(0..self.constant_magnitude) as f64;
        if rng.gen_bool(0.5) {
            value = -value;
        }
        value + rng.r#gen::<f64>()
    }
}

/// Uniformly pick one of the supported variable names.
pub fn random_identifier<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    VARIABLES[rng.gen_range(0..VARIABLES.len())]
}
