//! delta-grid: maximal gaps of x = b² − a², their column structure, and the
//! irregular values that precede each column's closed form.
//!
//! Stages, leaves first:
//!
//! 1. [`horizon`]: how far pair enumeration must reach for a given `k_max`.
//! 2. [`grid`]: max gap `y = b − a` per difference `x`.
//! 3. [`columns`]: group by gap, read depth-wise into columns.
//! 4. [`stabilization`]: where column `k` settles on `x = n(n + 2(k−1))`, and
//!    what came before.
//! 5. [`lsequence`]: the n-th irregular value across columns, split at its
//!    last strict decrease.
//! 6. [`prime_chain`]: is the right half `m` times consecutive primes?
//!
//! [`pipeline`] runs them in order from a [`RunConfig`]; [`report`] renders
//! the result; [`scan`] streams filtered values out of the grid.

pub mod arith;
pub mod columns;
pub mod config;
pub mod error;
pub mod grid;
pub mod horizon;
pub mod lsequence;
pub mod pipeline;
pub mod prime_chain;
pub mod report;
pub mod scan;
pub mod stabilization;

pub use config::{LookupSettings, RunConfig};
pub use error::ConfigError;
pub use grid::{DifferenceOfSquares, GridBounds, MaxDeltaArray, Projection};
pub use pipeline::{run, Pipeline, PipelineReport};
