//! Schema module - Configuration, sampling bounds and grid types.

mod bound;
mod config;
mod grid;

pub use bound::*;
pub use config::*;
pub use grid::*;
