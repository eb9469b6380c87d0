//! Logical combinators over comparables.
//!
//! `a & b` builds an [`All`], `a | b` an [`Any`] and `!a` a [`Not`]. Members
//! of the same kind are merged instead of nested:
//!
//! ```ignore
//! let a = Condition::from(Range::new(0, 10));
//! let b = Condition::from(Match::new("a+"));
//! assert_eq!(All::new([a.clone()]) & b.clone(), All::new([a.clone(), b.clone()]));
//! assert_eq!(
//!     All::new([a.clone()]) | b.clone(),
//!     Any::new([Condition::from(All::new([a])), b]),
//! );
//! ```

use std::{ops, ptr, slice, sync::Arc};

use arrow::array::{BooleanArray, Datum};
use once_cell::sync::Lazy;

use crate::{
    capability::{dispatch, elementwise, HostOp},
    completion::{Comparable, Definition},
    error::{Error, Result},
    operator::{all_of, any_of, filled, invert, CompareOp},
    value::ScalarValue,
};

/// Member of a combinator, or any operand that can be combined.
#[derive(Clone, Debug)]
pub enum Condition {
    /// Plain literal; `array == value` is the host's elementwise comparison.
    Value(ScalarValue),
    /// Opaque comparable.
    Comparable(Arc<dyn Comparable>),
    /// Conjunction.
    All(All),
    /// Disjunction.
    Any(Any),
    /// Negation.
    Not(Not),
}

static VALUE_DEFINITION: Lazy<Definition> = Lazy::new(|| {
    CompareOp::ALL
        .iter()
        .fold(Definition::orderable("Value"), |builder, op| {
            builder.define(*op)
        })
        .build()
        .expect("literal values define every operator")
});

impl Condition {
    /// Wraps a comparable value.
    pub fn comparable<C>(comparable: C) -> Self
    where
        C: Comparable + 'static,
    {
        Condition::Comparable(Arc::new(comparable))
    }

    /// Evaluates `right == self` with `right` on the left, as the host sees it.
    pub fn matches(&self, right: &dyn Datum) -> Result<BooleanArray> {
        match self {
            Condition::Value(value) => elementwise(right, HostOp::Equal, value),
            Condition::Comparable(comparable) => {
                dispatch(right, HostOp::Equal, comparable.as_ref())
            }
            Condition::All(all) => all.matches(right),
            Condition::Any(any) => any.matches(right),
            Condition::Not(not) => not.matches(right),
        }
    }

    /// Combines with `rhs` into a conjunction, merging conjunctions on either side.
    #[must_use]
    pub fn and(self, rhs: impl Into<Condition>) -> All {
        let mut members = self.into_all_members();
        members.extend(rhs.into().into_all_members());
        All { members }
    }

    /// Combines with `rhs` into a disjunction, merging disjunctions on either side.
    #[must_use]
    pub fn or(self, rhs: impl Into<Condition>) -> Any {
        let mut members = self.into_any_members();
        members.extend(rhs.into().into_any_members());
        Any { members }
    }

    fn into_all_members(self) -> Vec<Condition> {
        match self {
            Condition::All(all) => all.members,
            other => vec![other],
        }
    }

    fn into_any_members(self) -> Vec<Condition> {
        match self {
            Condition::Any(any) => any.members,
            other => vec![other],
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Condition::Value(lhs), Condition::Value(rhs)) => lhs == rhs,
            (Condition::Comparable(lhs), Condition::Comparable(rhs)) => {
                ptr::addr_eq(Arc::as_ptr(lhs), Arc::as_ptr(rhs))
            }
            (Condition::All(lhs), Condition::All(rhs)) => lhs == rhs,
            (Condition::Any(lhs), Condition::Any(rhs)) => lhs == rhs,
            (Condition::Not(lhs), Condition::Not(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Comparable for Condition {
    fn definition(&self) -> &Definition {
        match self {
            Condition::Value(_) => &*VALUE_DEFINITION,
            Condition::Comparable(comparable) => comparable.definition(),
            Condition::All(all) => all.definition(),
            Condition::Any(any) => any.definition(),
            Condition::Not(not) => not.definition(),
        }
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match self {
            Condition::Value(value) => elementwise(right, HostOp::from(op.flipped()), value),
            Condition::Comparable(comparable) => comparable.evaluate(op, right),
            Condition::All(all) => all.evaluate(op, right),
            Condition::Any(any) => any.evaluate(op, right),
            Condition::Not(not) => not.evaluate(op, right),
        }
    }

    fn compare(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match self {
            Condition::Value(value) => elementwise(right, HostOp::from(op.flipped()), value),
            Condition::Comparable(comparable) => comparable.compare(op, right),
            Condition::All(all) => all.compare(op, right),
            Condition::Any(any) => any.compare(op, right),
            Condition::Not(not) => not.compare(op, right),
        }
    }
}

impl From<ScalarValue> for Condition {
    fn from(value: ScalarValue) -> Self {
        Condition::Value(value)
    }
}

impl From<Arc<dyn Comparable>> for Condition {
    fn from(comparable: Arc<dyn Comparable>) -> Self {
        Condition::Comparable(comparable)
    }
}

impl From<All> for Condition {
    fn from(all: All) -> Self {
        Condition::All(all)
    }
}

impl From<Any> for Condition {
    fn from(any: Any) -> Self {
        Condition::Any(any)
    }
}

impl From<Not> for Condition {
    fn from(not: Not) -> Self {
        Condition::Not(not)
    }
}

macro_rules! literal_condition {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Condition {
                fn from(value: $ty) -> Self {
                    Condition::Value(ScalarValue::from(value))
                }
            }
        )*
    };
}

literal_condition!(bool, i32, i64, u32, u64, f64, &str, String);

/// Anything that converts into a [`Condition`] can be combined with `and` / `or`.
///
/// Types defined in this crate also get the `&`, `|` and `!` operators.
pub trait Combinable: Into<Condition> {
    /// `self & rhs`.
    fn and(self, rhs: impl Into<Condition>) -> All {
        Into::<Condition>::into(self).and(rhs)
    }

    /// `self | rhs`.
    fn or(self, rhs: impl Into<Condition>) -> Any {
        Into::<Condition>::into(self).or(rhs)
    }
}

impl<T: Into<Condition>> Combinable for T {}

macro_rules! combinator {
    ($name:ident, $label:literal, $fold:ident, $identity:literal) => {
        #[doc = concat!("Ordered, mutable collection of conditions folded with `", $label, "`.")]
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            members: Vec<Condition>,
        }

        impl $name {
            /// Creates the combinator from its members in order.
            pub fn new<I, C>(members: I) -> Self
            where
                I: IntoIterator<Item = C>,
                C: Into<Condition>,
            {
                Self {
                    members: members.into_iter().map(Into::into).collect(),
                }
            }

            /// Appends a member.
            pub fn push(&mut self, member: impl Into<Condition>) {
                self.members.push(member.into());
            }

            /// Iterates over members in order.
            pub fn iter(&self) -> slice::Iter<'_, Condition> {
                self.members.iter()
            }

            /// Number of members.
            #[must_use]
            pub fn len(&self) -> usize {
                self.members.len()
            }

            /// True when there are no members.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.members.is_empty()
            }

            /// Mutable access to the member list.
            pub fn members_mut(&mut self) -> &mut Vec<Condition> {
                &mut self.members
            }

            /// Consumes the combinator, returning its members.
            #[must_use]
            pub fn into_members(self) -> Vec<Condition> {
                self.members
            }

            /// Evaluates `right == self` by folding every member's result left to right.
            ///
            #[doc = concat!("Without members every element is `", $identity, "`.")]
            pub fn matches(&self, right: &dyn Datum) -> Result<BooleanArray> {
                let mut members = self.members.iter();
                let Some(first) = members.next() else {
                    return Ok(filled(right, $identity));
                };
                members.try_fold(first.matches(right)?, |acc, member| {
                    $fold(&acc, &member.matches(right)?)
                })
            }
        }

        impl Comparable for $name {
            fn definition(&self) -> &Definition {
                static DEFINITION: Lazy<Definition> = Lazy::new(|| {
                    Definition::equatable(stringify!($name))
                        .define(CompareOp::Eq)
                        .define(CompareOp::Ne)
                        .build()
                        .expect("eq and ne are defined")
                });
                &*DEFINITION
            }

            fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
                match op {
                    CompareOp::Eq => self.matches(right),
                    CompareOp::Ne => invert(&self.matches(right)?),
                    _ => Err(Error::MissingOperator {
                        op,
                        operand: format!("{self:?}"),
                    }),
                }
            }
        }

        impl Extend<Condition> for $name {
            fn extend<I: IntoIterator<Item = Condition>>(&mut self, iter: I) {
                self.members.extend(iter);
            }
        }

        impl FromIterator<Condition> for $name {
            fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
                Self {
                    members: iter.into_iter().collect(),
                }
            }
        }

        impl IntoIterator for $name {
            type Item = Condition;
            type IntoIter = std::vec::IntoIter<Condition>;

            fn into_iter(self) -> Self::IntoIter {
                self.members.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a Condition;
            type IntoIter = slice::Iter<'a, Condition>;

            fn into_iter(self) -> Self::IntoIter {
                self.members.iter()
            }
        }
    };
}

combinator!(All, "and", all_of, true);
combinator!(Any, "or", any_of, false);

/// Negation of a condition: `right == Not(c)` is `!(right == c)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Not(Box<Condition>);

static NOT_DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_equality("Not")
        .define(CompareOp::Eq)
        .build()
        .expect("eq is defined")
});

impl Not {
    /// Negates `condition`.
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self(Box::new(condition.into()))
    }

    /// The negated condition.
    #[must_use]
    pub fn inner(&self) -> &Condition {
        &self.0
    }

    /// Consumes the negation, returning the negated condition.
    #[must_use]
    pub fn into_inner(self) -> Condition {
        *self.0
    }

    /// Evaluates `right == self`.
    pub fn matches(&self, right: &dyn Datum) -> Result<BooleanArray> {
        invert(&self.0.matches(right)?)
    }
}

impl Comparable for Not {
    fn definition(&self) -> &Definition {
        &*NOT_DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match op {
            CompareOp::Eq => self.matches(right),
            _ => Err(Error::MissingOperator {
                op,
                operand: format!("{self:?}"),
            }),
        }
    }
}

impl ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        match self {
            Condition::Not(not) => not.into_inner(),
            other => Condition::Not(Not::new(other)),
        }
    }
}

/// Implements `&`, `|` and `!` for types that convert into [`Condition`].
macro_rules! impl_logical_ops {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<R: Into<$crate::combinator::Condition>> ::std::ops::BitAnd<R> for $ty {
                type Output = $crate::combinator::All;

                fn bitand(self, rhs: R) -> Self::Output {
                    $crate::combinator::Condition::from(self).and(rhs)
                }
            }

            impl<R: Into<$crate::combinator::Condition>> ::std::ops::BitOr<R> for $ty {
                type Output = $crate::combinator::Any;

                fn bitor(self, rhs: R) -> Self::Output {
                    $crate::combinator::Condition::from(self).or(rhs)
                }
            }
        )*
    };
}

/// Implements `!` by wrapping into [`Not`].
macro_rules! impl_negation {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ::std::ops::Not for $ty {
                type Output = $crate::combinator::Condition;

                fn not(self) -> Self::Output {
                    !$crate::combinator::Condition::from(self)
                }
            }
        )*
    };
}

pub(crate) use impl_logical_ops;
pub(crate) use impl_negation;

impl_logical_ops!(Condition, All, Any, Not);
impl_negation!(All, Any, Not);
