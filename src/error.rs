use thiserror::Error;

/// Unified error type for `blvrs` operations.
///
/// Only malformed inputs are errors. Numerical degeneracy (a zero row
/// normalizer, negative weights raised to a fractional power) is reported
/// through non-finite entries in the returned matrices instead.
#[derive(Debug, Error)]
pub enum BlvError {
    /// Raised when provided matrices or vectors have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, usually the number of locations.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when a cost or output is negative or NaN.
    ///
    /// For the cost matrix `index` is the row-major position `row * n + column`.
    #[error("{context} at index {index} must be nonnegative, found {value}")]
    NegativeValue {
        /// Which input held the value.
        context: &'static str,
        /// Position of the offending entry.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// Raised when a problem has no locations at all.
    #[error("a spatial interaction problem needs at least one location")]
    EmptyProblem,

    /// Raised when a solver setting lies outside its valid domain.
    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected value, rendered for display.
        value: String,
    },
}

impl BlvError {
    /// Helper to format a [`DimensionMismatch`](BlvError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for rejecting a solver setting.
    pub fn invalid_parameter(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, BlvError>;
