//! Compute module - Evaluation, simplification and evolutionary search over expression trees.

mod evaluate;
mod index;
mod optimize;

pub mod evolution;

pub use evaluate::*;
pub use index::*;
pub use optimize::*;
