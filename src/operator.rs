//! Relational operators and the closure that derives the ones a left operand lacks.
//!
//! Every function here takes a left operand implementing [`Relational`] and a
//! right operand that is any Arrow [`Datum`]. When the left operand does not
//! define the requested operator itself, the result is derived from one it
//! does define:
//!
//! | want | first choice | then | then |
//! |------|--------------|------|------|
//! | `==` | `!=`         |      |      |
//! | `!=` | `==`         |      |      |
//! | `>=` | `<`          | `>`  | `<=` |
//! | `>`  | `<=`         | `>=` | `<`  |
//! | `<=` | `>`          | `<`  | `>=` |
//! | `<`  | `>=`         | `<=` | `>`  |
//!
//! Single-negation substitutes come first; the two-term ones also consult `==`
//! or `!=` of the same left operand.

use std::fmt;

use arrow::{
    array::{Array, ArrayRef, BooleanArray, Datum},
    compute::kernels::{
        boolean::{and_kleene, not, or_kleene},
        cmp,
    },
    error::ArrowError,
};

use crate::{
    error::{Error, Result},
    observability::log_trace,
};

/// Relational operator between a left operand and a bulk right operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equals (`==`).
    Eq,
    /// Not equals (`!=`).
    Ne,
    /// Greater than or equal to (`>=`).
    Ge,
    /// Greater than (`>`).
    Gt,
    /// Less than or equal to (`<=`).
    Le,
    /// Less than (`<`).
    Lt,
}

impl CompareOp {
    /// All six operators.
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ge,
        CompareOp::Gt,
        CompareOp::Le,
        CompareOp::Lt,
        CompareOp::Ne,
    ];

    /// Ordering operators, in the order completion picks its source from.
    pub const ORDERING: [CompareOp; 4] = [
        CompareOp::Ge,
        CompareOp::Gt,
        CompareOp::Le,
        CompareOp::Lt,
    ];

    /// Returns a textual representation of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Lt => "<",
        }
    }

    /// Returns the operator that swaps the left/right side of the comparison.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Lt => CompareOp::Gt,
        }
    }

    /// Operators tried, in order, when the left operand lacks `self`.
    #[must_use]
    pub fn fallbacks(self) -> &'static [CompareOp] {
        match self {
            CompareOp::Eq => &[CompareOp::Ne],
            CompareOp::Ne => &[CompareOp::Eq],
            CompareOp::Ge => &[CompareOp::Lt, CompareOp::Gt, CompareOp::Le],
            CompareOp::Gt => &[CompareOp::Le, CompareOp::Ge, CompareOp::Lt],
            CompareOp::Le => &[CompareOp::Gt, CompareOp::Lt, CompareOp::Ge],
            CompareOp::Lt => &[CompareOp::Ge, CompareOp::Le, CompareOp::Gt],
        }
    }

    /// Position of `self` in [`CompareOp::ALL`].
    pub(crate) const fn index(self) -> usize {
        match self {
            CompareOp::Eq => 0,
            CompareOp::Ge => 1,
            CompareOp::Gt => 2,
            CompareOp::Le => 3,
            CompareOp::Lt => 4,
            CompareOp::Ne => 5,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one operator slot on a comparable type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Slot {
    /// Nothing supplied; only the base no-op exists.
    #[default]
    Unset,
    /// Required by a capability but still a placeholder.
    Abstract,
    /// Supplied by the type itself.
    Defined,
}

/// Per-operator slot table recorded when a comparable type is registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Operators {
    slots: [Slot; 6],
}

impl Operators {
    /// Table with every slot unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [Slot::Unset; 6],
        }
    }

    /// Table with every slot defined, as plain Arrow arrays have.
    #[must_use]
    pub const fn all_defined() -> Self {
        Self {
            slots: [Slot::Defined; 6],
        }
    }

    /// Returns a copy of this table with `op` set to `slot`.
    #[must_use]
    pub fn with(mut self, op: CompareOp, slot: Slot) -> Self {
        self.slots[op.index()] = slot;
        self
    }

    /// Sets the slot of `op`.
    pub fn set(&mut self, op: CompareOp, slot: Slot) {
        self.slots[op.index()] = slot;
    }

    /// Returns the slot of `op`.
    #[must_use]
    pub fn slot(&self, op: CompareOp) -> Slot {
        self.slots[op.index()]
    }

    /// True when the type supplies `op` itself. Abstract placeholders and the
    /// base no-op do not count.
    #[must_use]
    pub fn is_defined(&self, op: CompareOp) -> bool {
        self.slot(op) == Slot::Defined
    }

    /// Iterates over the operators the type supplies itself.
    pub fn defined(&self) -> impl Iterator<Item = CompareOp> + '_ {
        CompareOp::ALL
            .into_iter()
            .filter(move |op| self.is_defined(*op))
    }
}

/// Left operand of a relational operator.
pub trait Relational {
    /// Operators this operand supplies itself.
    fn operators(&self) -> Operators;

    /// Evaluates an operator marked [`Slot::Defined`] in [`Relational::operators`].
    fn relate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray>;

    /// Short description used in error messages.
    fn describe(&self) -> String;
}

impl Relational for ArrayRef {
    fn operators(&self) -> Operators {
        Operators::all_defined()
    }

    fn relate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        Ok(kernel(op, self, right)?)
    }

    fn describe(&self) -> String {
        format!("{} array", self.data_type())
    }
}

/// Runs the Arrow comparison kernel for `op`.
pub(crate) fn kernel(
    op: CompareOp,
    left: &dyn Datum,
    right: &dyn Datum,
) -> std::result::Result<BooleanArray, ArrowError> {
    match op {
        CompareOp::Eq => cmp::eq(left, right),
        CompareOp::Ne => cmp::neq(left, right),
        CompareOp::Ge => cmp::gt_eq(left, right),
        CompareOp::Gt => cmp::gt(left, right),
        CompareOp::Le => cmp::lt_eq(left, right),
        CompareOp::Lt => cmp::lt(left, right),
    }
}

/// Evaluates `left <op> right`, deriving `op` when `left` does not define it.
pub fn evaluate<L>(op: CompareOp, left: &L, right: &dyn Datum) -> Result<BooleanArray>
where
    L: Relational + ?Sized,
{
    let operators = left.operators();
    if operators.is_defined(op) {
        return left.relate(op, right);
    }
    match op.fallbacks().iter().find(|via| operators.is_defined(**via)) {
        Some(via) => derive(op, *via, left, right),
        None => Err(Error::MissingOperator {
            op,
            operand: left.describe(),
        }),
    }
}

/// Computes `left <target> right` through the substitution formula that uses `via`.
pub fn derive<L>(
    target: CompareOp,
    via: CompareOp,
    left: &L,
    right: &dyn Datum,
) -> Result<BooleanArray>
where
    L: Relational + ?Sized,
{
    use CompareOp::*;

    log_trace!(
        component = "operator",
        event = "operator_derived",
        wanted = %target,
        via = %via
    );
    match (target, via) {
        (target, via) if target == via => left.relate(target, right),
        (Eq, Ne) => eq_by_ne(left, right),
        (Ne, Eq) => ne_by_eq(left, right),
        (Ge, Gt) => ge_by_gt(left, right),
        (Ge, Le) => ge_by_le(left, right),
        (Ge, Lt) => ge_by_lt(left, right),
        (Gt, Ge) => gt_by_ge(left, right),
        (Gt, Le) => gt_by_le(left, right),
        (Gt, Lt) => gt_by_lt(left, right),
        (Le, Ge) => le_by_ge(left, right),
        (Le, Gt) => le_by_gt(left, right),
        (Le, Lt) => le_by_lt(left, right),
        (Lt, Ge) => lt_by_ge(left, right),
        (Lt, Gt) => lt_by_gt(left, right),
        (Lt, Le) => lt_by_le(left, right),
        _ => Err(Error::MissingOperator {
            op: target,
            operand: left.describe(),
        }),
    }
}

/// `left == right`, falling back to `!=`.
pub fn eq<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Eq, left, right)
}

/// `left != right`, falling back to `==`.
pub fn ne<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Ne, left, right)
}

/// `left >= right`, falling back to `<`, `>`, then `<=`.
pub fn ge<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Ge, left, right)
}

/// `left > right`, falling back to `<=`, `>=`, then `<`.
pub fn gt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Gt, left, right)
}

/// `left <= right`, falling back to `>`, `<`, then `>=`.
pub fn le<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Le, left, right)
}

/// `left < right`, falling back to `>=`, `<=`, then `>`.
pub fn lt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    evaluate(CompareOp::Lt, left, right)
}

/// `==` as `not(!=)`.
pub fn eq_by_ne<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&ne(left, right)?)
}

/// `!=` as `not(==)`.
pub fn ne_by_eq<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&eq(left, right)?)
}

/// `>=` as `> or ==`.
pub fn ge_by_gt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    any_of(&gt(left, right)?, &eq(left, right)?)
}

/// `>=` as `not(<=) or ==`.
pub fn ge_by_le<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    any_of(&invert(&le(left, right)?)?, &eq(left, right)?)
}

/// `>=` as `not(<)`.
pub fn ge_by_lt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&lt(left, right)?)
}

/// `>` as `>= and !=`.
pub fn gt_by_ge<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    all_of(&ge(left, right)?, &ne(left, right)?)
}

/// `>` as `not(<=)`.
pub fn gt_by_le<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&le(left, right)?)
}

/// `>` as `not(<) and !=`.
pub fn gt_by_lt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    all_of(&invert(&lt(left, right)?)?, &ne(left, right)?)
}

/// `<=` as `not(>=) or ==`.
pub fn le_by_ge<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    any_of(&invert(&ge(left, right)?)?, &eq(left, right)?)
}

/// `<=` as `not(>)`.
pub fn le_by_gt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&gt(left, right)?)
}

/// `<=` as `< or ==`.
pub fn le_by_lt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    any_of(&lt(left, right)?, &eq(left, right)?)
}

/// `<` as `not(>=)`.
pub fn lt_by_ge<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    invert(&ge(left, right)?)
}

/// `<` as `not(>) and !=`.
pub fn lt_by_gt<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    all_of(&invert(&gt(left, right)?)?, &ne(left, right)?)
}

/// `<` as `<= and !=`.
pub fn lt_by_le<L: Relational + ?Sized>(left: &L, right: &dyn Datum) -> Result<BooleanArray> {
    all_of(&le(left, right)?, &ne(left, right)?)
}

pub(crate) fn invert(array: &BooleanArray) -> Result<BooleanArray> {
    Ok(not(array)?)
}

pub(crate) fn all_of(left: &BooleanArray, right: &BooleanArray) -> Result<BooleanArray> {
    Ok(and_kleene(left, right)?)
}

pub(crate) fn any_of(left: &BooleanArray, right: &BooleanArray) -> Result<BooleanArray> {
    Ok(or_kleene(left, right)?)
}

/// Boolean array of `value` with one element per element of `right`.
pub(crate) fn filled(right: &dyn Datum, value: bool) -> BooleanArray {
    let (array, _) = right.get();
    BooleanArray::from(vec![value; array.len()])
}
