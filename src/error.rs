//! Error types shared by every comparable.

use arrow::{datatypes::DataType, error::ArrowError};
use thiserror::Error;

use crate::{capability::HostOp, operator::CompareOp};

/// Errors raised while defining or evaluating comparables.
#[derive(Debug, Error)]
pub enum Error {
    /// A completion could not find a source operator when the type was defined.
    #[error("{type_name}: define at least one of {expected}")]
    Definition {
        /// Name the type was registered under.
        type_name: &'static str,
        /// Operators of which at least one must be defined.
        expected: &'static str,
    },
    /// A range carried a bounds token other than `[]`, `[)`, `(]` or `()`.
    #[error("bounds must be one of [], [), (], or (); got {0:?}")]
    UnsupportedBounds(String),
    /// The left operand defines none of the operators a derivation needs.
    #[error("no comparison operator is defined for left {op} right (left: {operand})")]
    MissingOperator {
        /// Requested operator.
        op: CompareOp,
        /// Description of the left operand.
        operand: String,
    },
    /// The capability requires the operator but the type only declared it.
    #[error("{operand} declares {op} but does not implement it")]
    AbstractOperator {
        /// Requested operator.
        op: CompareOp,
        /// Name the type was registered under.
        operand: &'static str,
    },
    /// The comparable declined a host operation.
    #[error("host operation {op} is not handled by {operand}")]
    Unhandled {
        /// Declined operation.
        op: HostOp,
        /// Description of the right operand.
        operand: String,
    },
    /// A literal has no lossless common type with the array it is compared to.
    #[error("cannot compare {value} with {data_type} values without loss")]
    Coercion {
        /// The literal, as displayed.
        value: String,
        /// Data type of the array.
        data_type: DataType,
    },
    /// Pattern matching was asked to evaluate a non-string array.
    #[error("pattern matching requires a string array, got {0:?}")]
    UnsupportedArray(DataType),
    /// The pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// An Arrow kernel failed.
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
