#![deny(missing_docs)]
//! Comparable objects for Arrow arrays.
//!
//! A comparable sits on either side of a relational operator against an Arrow
//! array and yields a `BooleanArray`: ranges, pattern matchers, arbitrary
//! boolean functions, the `ANY` / `NEVER` sentinels and logical combinators of
//! all of them. A comparable type supplies as few as one operator; the rest
//! are derived when the type is registered through a [`Definition`].
//!
//! ```ignore
//! use ndcompare::{dispatch, HostOp, Range};
//!
//! let data = Int64Array::from(vec![0, 1, 2]);
//! dispatch(&data, HostOp::Equal, &Range::new(1, 2))?; // [false, true, false]
//! dispatch(&data, HostOp::Less, &Range::new(1, 2))?; // [true, false, false]
//! ```

pub(crate) mod observability;

/// Relational operators, operator slots and the derivation formulas.
pub mod operator;

/// Capabilities and host-side dispatch of `array <op> comparable`.
pub mod capability;

/// Type registration and operator completion.
pub mod completion;

/// `All`, `Any` and `Not`.
pub mod combinator;

/// Range, Apply, Match and the sentinels.
pub mod builtins;

/// Literal values.
pub mod value;

/// Crate error type.
pub mod error;

pub use crate::{
    builtins::{
        AnyType, Apply, ApplyFn, Arguments, Bounds, Match, MatchFlags, MatchOptions, NeverType,
        Range, ANY, NEVER,
    },
    capability::{dispatch, elementwise, Capability, HostOp, ReflectedCompare},
    combinator::{All, Any, Combinable, Condition, Not},
    completion::{Comparable, Definition, DefinitionBuilder, Route},
    error::{Error, Result},
    operator::{eq, ge, gt, le, lt, ne, CompareOp, Operators, Relational, Slot},
    value::ScalarValue,
};
