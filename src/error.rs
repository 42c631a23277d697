//! Crate error type
//!
//! Only programmer errors surface here: a rotation order that failed to
//! parse, or a component index outside a vector's dimension. Geometric
//! misses are `None` and numeric degeneracies fall back to neutral values,
//! so neither appears in this enum.

use thiserror::Error;

/// Errors raised by the math and scene layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A rotation-order string did not name one of the six axis orders.
    #[error("unknown Euler rotation order: {0:?}")]
    UnknownEulerOrder(String),

    /// A component index was outside `0..dimensions`.
    #[error("component index {index} out of range for a {dimensions}-component value")]
    ComponentOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of components of the indexed value.
        dimensions: usize,
    },
}
