//! Ready-made comparables.

mod apply;
mod pattern;
mod range;
mod sentinel;

pub use apply::{Apply, ApplyFn, Arguments};
pub use pattern::{Match, MatchFlags, MatchOptions};
pub use range::{Bounds, Range};
pub use sentinel::{AnyType, NeverType, ANY, NEVER};

use crate::combinator::{impl_logical_ops, impl_negation};

impl_logical_ops!(Range, Apply, Match, AnyType, NeverType);
impl_negation!(Range, Apply, Match, AnyType, NeverType);
