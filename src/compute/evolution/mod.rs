//! Evolutionary search for symbolic expressions.
//!
//! This module evolves expression trees in `x` and `y` whose samples over a
//! rectangular grid approximate a target grid.
//!
//! # Overview
//!
//! - **Tree generation** (`generator`): depth-biased random trees
//! - **Genetic operators** (`mutation`): per-node mutation and crossover
//! - **Fitness** (`fitness`): squared-error scoring against the target grid
//! - **Elite keeper** (`keeper`): bounded top-K retention
//! - **Search** (`search`): the generational loop
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_expression::ast::parse;
//! use genetic_expression::compute::evolution::{FitnessEvaluator, generate};
//! use genetic_expression::schema::{ComputingBound, SearchConfig};
//!
//! let bound = ComputingBound::default();
//! let evaluator = FitnessEvaluator::new(bound, bound);
//!
//! // Sample the target function.
//! let target = parse("x * x + y").unwrap().unwrap();
//! let mut theoretical = evaluator.grid();
//! evaluator.compute(&target, &mut theoretical).unwrap();
//!
//! let result = generate(&theoretical, bound, bound, &SearchConfig::default()).unwrap();
//! println!("{}", result.best);
//! ```

mod fitness;
mod generator;
mod keeper;
mod mutation;
mod search;

pub use fitness::{FitnessError, FitnessEvaluator};
pub use generator::{TreeGenerator, VARIABLES, random_identifier};
pub use keeper::{ComputedResult, EliteKeeper};
pub use mutation::{GeneticMutator, MutationError};
pub use search::{
    GeneticExpressionGenerator, ProgressCallback, SearchError, SearchProgress, SearchResult,
    SearchStats, StopReason, generate, tournament,
};
