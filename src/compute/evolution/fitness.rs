//! Fitness scoring of candidate expressions against a sampled target.
//!
//! The score is a sum of squared errors over the sample grid. Cells whose
//! squared error is NaN or infinite are not summed; instead each one is
//! charged the largest finite squared error seen, so degenerate candidates
//! are penalized without poisoning the total. A candidate with no finite
//! cell at all scores `f64::MAX`.

use crate::ast::NodeRef;
use crate::compute::ComputeVisitor;
use crate::schema::{ComputingBound, Grid};

/// Fitness computation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitnessError {
    #[error("Grid is {actual:?} but the bounds require {expected:?}")]
    GridMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Running aggregate of squared errors.
#[derive(Debug, Default)]
struct ScoreAccumulator {
    sum: f64,
    worst: f64,
    invariant_count: usize,
    finite_count: usize,
}

impl ScoreAccumulator {
    #[inline]
    fn push(&mut self, expected: f64, actual: f64) {
        let squared = (expected - actual) * (expected - actual);
        if squared.is_finite() {
            self.sum += squared;
            self.finite_count += 1;
            if squared > self.worst {
                self.worst = squared;
            }
        } else {
            self.invariant_count += 1;
        }
    }

    fn finish(self) -> f64 {
        if self.finite_count == 0 {
            return f64::MAX;
        }
        (self.sum + self.invariant_count as f64 * self.worst).min(f64::MAX)
    }
}

/// Evaluates expressions over the `x` × `y` sample grid.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    x_bound: ComputingBound,
    y_bound: ComputingBound,
}

impl FitnessEvaluator {
    pub fn new(x_bound: ComputingBound, y_bound: ComputingBound) -> Self {
        Self { x_bound, y_bound }
    }

    #[inline]
    pub fn x_bound(&self) -> &ComputingBound {
        &self.x_bound
    }

    #[inline]
    pub fn y_bound(&self) -> &ComputingBound {
        &self.y_bound
    }

    /// Shape every grid used with this evaluator must have.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.x_bound.sample_count(), self.y_bound.sample_count())
    }

    /// Zero-filled grid with the expected shape.
    pub fn grid(&self) -> Grid {
        Grid::for_bounds(&self.x_bound, &self.y_bound)
    }

    fn check(&self, grid: &Grid) -> Result<(), FitnessError> {
        if grid.dims() != self.dims() {
            return Err(FitnessError::GridMismatch {
                expected: self.dims(),
                actual: grid.dims(),
            });
        }
        Ok(())
    }

    /// Evaluate `expression` at every sample point into `output`.
    pub fn compute(&self, expression: &NodeRef, output: &mut Grid) -> Result<(), FitnessError> {
        self.check(output)?;
        for (i, x) in self.x_bound.samples().enumerate() {
            for (j, y) in self.y_bound.samples().enumerate() {
                output.set(i, j, evaluate_at(expression, x, y));
            }
        }
        Ok(())
    }

    /// Score two precomputed grids.
    pub fn score(&self, theoretical: &Grid, computed: &Grid) -> Result<f64, FitnessError> {
        self.check(theoretical)?;
        self.check(computed)?;
        let mut acc = ScoreAccumulator::default();
        for (&expected, &actual) in theoretical.as_slice().iter().zip(computed.as_slice()) {
            acc.push(expected, actual);
        }
        Ok(acc.finish())
    }

    /// Evaluate and score in one pass without an intermediate grid.
    pub fn difference(&self, expression: &NodeRef, theoretical: &Grid) -> Result<f64, FitnessError> {
        self.check(theoretical)?;
        let mut acc = ScoreAccumulator::default();
        for (i, x) in self.x_bound.samples().enumerate() {
            for (j, y) in self.y_bound.samples().enumerate() {
                acc.push(theoretical.get(i, j), evaluate_at(expression, x, y));
            }
        }
        Ok(acc.finish())
    }

    /// Evaluate into `scratch`, then score it against `theoretical`.
    pub fn difference_with_scratch(
        &self,
        expression: &NodeRef,
        theoretical: &Grid,
        scratch: &mut Grid,
    ) -> Result<f64, FitnessError> {
        self.compute(expression, scratch)?;
        self.score(theoretical, scratch)
    }
}

#[inline]
fn evaluate_at(expression: &NodeRef, x: f64, y: f64) -> f64 {
    ComputeVisitor::new(|name: &str| match name {
        "x" => Some(x),
        "y" => Some(y),
        _ => None,
    })
    .compute(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    fn tree(source: &str) -> NodeRef {
        parse(source).unwrap().unwrap()
    }

    fn unit_evaluator() -> FitnessEvaluator {
        let bound = ComputingBound::new(-1.0, 1.0, 1).unwrap();
        FitnessEvaluator::new(bound, bound)
    }

    #[test]
    fn test_score_precomputed_grids() {
        let evaluator = unit_evaluator();
        let theoretical = Grid::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let computed = Grid::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(evaluator.score(&theoretical, &computed).unwrap(), 6.0);
    }

    #[test]
    fn test_difference_against_zero_target() {
        let evaluator = unit_evaluator();
        let target = evaluator.grid();
        // (x + y) - 1 over the corners {-1, 1}²: -3, -1, -1, 1 → 9 + 1 + 1 + 1.
        let score = evaluator.difference(&tree("x + y - 1"), &target).unwrap();
        assert_eq!(score, 12.0);
    }

    #[test]
    fn test_squared_error_sum() {
        let evaluator = unit_evaluator();
        let mut target = evaluator.grid();
        for i in 0..2 {
            for j in 0..2 {
                target.set(i, j, 1.0);
            }
        }
        // x * 0 is 0 everywhere.
        target.set(0, 0, 2.0);
        let score = evaluator.difference(&tree("x * 0"), &target).unwrap();
        assert_eq!(score, 7.0);
    }

    #[test]
    fn test_perfect_match_scores_zero() {
        let evaluator = FitnessEvaluator::new(ComputingBound::default(), ComputingBound::default());
        let expression = tree("x * y + 3");
        let mut target = evaluator.grid();
        evaluator.compute(&expression, &mut target).unwrap();
        assert_eq!(evaluator.difference(&expression, &target).unwrap(), 0.0);
    }

    #[test]
    fn test_computed_grid_matches_sum() {
        let bound = ComputingBound::default();
        let evaluator = FitnessEvaluator::new(bound, bound);
        let mut grid = evaluator.grid();
        evaluator.compute(&tree("x + y"), &mut grid).unwrap();
        assert_eq!(grid.dims(), (21, 21));
        for (i, x) in bound.samples().enumerate() {
            for (j, y) in bound.samples().enumerate() {
                assert!((grid.get(i, j) - (x + y)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_degenerate_cells_charged_worst() {
        let x_bound = ComputingBound::new(0.0, 1.0, 1).unwrap();
        let y_bound = ComputingBound::new(0.0, 1.0, 1).unwrap();
        let evaluator = FitnessEvaluator::new(x_bound, y_bound);
        let target = evaluator.grid();
        // 1 / x: x = 0 gives inf in row 0, x = 1 gives 1 in row 1.
        // Finite: two cells with error 1. Degenerate: two cells charged 1 each.
        let score = evaluator.difference(&tree("1 / x"), &target).unwrap();
        assert_eq!(score, 4.0);
    }

    #[test]
    fn test_all_degenerate_scores_max() {
        let evaluator = unit_evaluator();
        let target = evaluator.grid();
        let score = evaluator.difference(&tree("0 / 0 + x"), &target).unwrap();
        assert_eq!(score, f64::MAX);
        let score = evaluator.difference(&tree("z"), &target).unwrap();
        assert_eq!(score, f64::MAX);
    }

    #[test]
    fn test_huge_finite_errors_saturate() {
        let bound = ComputingBound::new(-1.0, 1.0, 2).unwrap();
        let evaluator = FitnessEvaluator::new(bound, bound);
        let target = evaluator.grid();
        // Every cell errs by 1e308; the nine-cell sum overflows.
        let candidate = tree("x - x + 1e154");
        let score = evaluator.difference(&candidate, &target).unwrap();
        assert_eq!(score, f64::MAX);
        let mut scratch = evaluator.grid();
        let score = evaluator
            .difference_with_scratch(&candidate, &target, &mut scratch)
            .unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn test_scratch_matches_streaming() {
        let evaluator = FitnessEvaluator::new(ComputingBound::default(), ComputingBound::default());
        let mut target = evaluator.grid();
        evaluator.compute(&tree("x * x - y"), &mut target).unwrap();
        let mut scratch = evaluator.grid();
        let candidate = tree("x / (y + 0.5)");
        let streaming = evaluator.difference(&candidate, &target).unwrap();
        let scratched = evaluator
            .difference_with_scratch(&candidate, &target, &mut scratch)
            .unwrap();
        assert_eq!(streaming, scratched);
    }

    #[test]
    fn test_grid_mismatch() {
        let evaluator = unit_evaluator();
        let wrong = Grid::new(3, 2);
        assert_eq!(
            evaluator.difference(&tree("x"), &wrong),
            Err(FitnessError::GridMismatch {
                expected: (2, 2),
                actual: (3, 2),
            })
        );
        let mut wrong = wrong;
        assert!(evaluator.compute(&tree("x"), &mut wrong).is_err());
    }
}
