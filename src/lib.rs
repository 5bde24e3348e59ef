//! Genetic Expression - Evolve symbolic formulas that fit a sampled function.
//!
//! This crate searches for an expression `f(x, y)` built from constants,
//! the variables `x` and `y`, negation, the four arithmetic operators and a
//! sign-testing ternary, whose values over a rectangular sample grid match a
//! target grid as closely as possible.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `ast`: Expression trees, traversal protocols, parsing and rendering
//! - `compute`: Evaluation, simplification, subtree lookup and the evolutionary search
//! - `schema`: Configuration, sampling bounds and grid types
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_expression::{
//!     ast::parse,
//!     compute::{optimize, evolution::{FitnessEvaluator, generate}},
//!     schema::{ComputingBound, SearchConfig},
//! };
//!
//! // Simplify an expression
//! let tree = parse("10 + 4 - 7 * (3 + 5)").unwrap().unwrap();
//! assert_eq!(optimize(&tree).node.to_string(), "-42");
//!
//! // Sample a target function and search for it
//! let bound = ComputingBound::default();
//! let evaluator = FitnessEvaluator::new(bound, bound);
//! let target = parse("x * y - 2").unwrap().unwrap();
//! let mut theoretical = evaluator.grid();
//! evaluator.compute(&target, &mut theoretical).unwrap();
//!
//! let config = SearchConfig {
//!     population_size: 200,
//!     generation_count: 20,
//!     ..Default::default()
//! };
//! let result = generate(&theoretical, bound, bound, &config).unwrap();
//! println!("Best: {}", result.best);
//! ```

pub mod ast;
pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use ast::{Node, NodeRef, parse};
pub use compute::evolution::{ComputedResult, SearchResult, generate};
pub use schema::{ComputingBound, Grid, SearchConfig};
