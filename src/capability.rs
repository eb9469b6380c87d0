//! Capabilities a comparable declares, and the host hook that reroutes
//! `array <op> comparable` back into the comparable.

use std::fmt;

use arrow::array::{BooleanArray, Datum};

use crate::{
    completion::Comparable,
    error::{Error, Result},
    observability::log_debug,
    operator::CompareOp,
    value::ScalarValue,
};

/// Operator contract a comparable type promises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Promises `==` and `!=`.
    Equatable,
    /// Promises all six relational operators.
    Orderable,
}

impl Capability {
    /// Operators a type declaring this capability must provide.
    #[must_use]
    pub fn required(self) -> &'static [CompareOp] {
        match self {
            Capability::Equatable => &[CompareOp::Eq, CompareOp::Ne],
            Capability::Orderable => &CompareOp::ALL,
        }
    }

    /// True when `op` is part of this capability's contract.
    #[must_use]
    pub fn requires(self, op: CompareOp) -> bool {
        self.required().contains(&op)
    }

    /// Returns the operator to evaluate on the comparable when the host sees
    /// `array <op> comparable`, or `None` when the host operation is declined.
    #[must_use]
    pub fn intercepts(self, op: HostOp) -> Option<CompareOp> {
        let relational = op.relational()?;
        self.requires(relational).then(|| relational.flipped())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Equatable => f.write_str("Equatable"),
            Capability::Orderable => f.write_str("Orderable"),
        }
    }
}

/// Binary operation the host array library dispatches with an array on the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOp {
    /// `array == rhs`
    Equal,
    /// `array != rhs`
    NotEqual,
    /// `array > rhs`
    Greater,
    /// `array >= rhs`
    GreaterEqual,
    /// `array < rhs`
    Less,
    /// `array <= rhs`
    LessEqual,
    /// `array + rhs`
    Add,
    /// `array - rhs`
    Subtract,
    /// `array * rhs`
    Multiply,
    /// `array / rhs`
    Divide,
    /// `array & rhs`
    And,
    /// `array | rhs`
    Or,
}

impl HostOp {
    /// The six relational host operations.
    pub const RELATIONAL: [HostOp; 6] = [
        HostOp::Equal,
        HostOp::NotEqual,
        HostOp::Greater,
        HostOp::GreaterEqual,
        HostOp::Less,
        HostOp::LessEqual,
    ];

    /// The relational operator this host operation performs, if any.
    #[must_use]
    pub fn relational(self) -> Option<CompareOp> {
        match self {
            HostOp::Equal => Some(CompareOp::Eq),
            HostOp::NotEqual => Some(CompareOp::Ne),
            HostOp::Greater => Some(CompareOp::Gt),
            HostOp::GreaterEqual => Some(CompareOp::Ge),
            HostOp::Less => Some(CompareOp::Lt),
            HostOp::LessEqual => Some(CompareOp::Le),
            HostOp::Add
            | HostOp::Subtract
            | HostOp::Multiply
            | HostOp::Divide
            | HostOp::And
            | HostOp::Or => None,
        }
    }

    /// Returns a textual representation of the operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HostOp::Equal => "==",
            HostOp::NotEqual => "!=",
            HostOp::Greater => ">",
            HostOp::GreaterEqual => ">=",
            HostOp::Less => "<",
            HostOp::LessEqual => "<=",
            HostOp::Add => "+",
            HostOp::Subtract => "-",
            HostOp::Multiply => "*",
            HostOp::Divide => "/",
            HostOp::And => "&",
            HostOp::Or => "|",
        }
    }
}

impl From<CompareOp> for HostOp {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Eq => HostOp::Equal,
            CompareOp::Ne => HostOp::NotEqual,
            CompareOp::Ge => HostOp::GreaterEqual,
            CompareOp::Gt => HostOp::Greater,
            CompareOp::Le => HostOp::LessEqual,
            CompareOp::Lt => HostOp::Less,
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hook the host consults when a comparable sits on the right of an array operation.
pub trait ReflectedCompare {
    /// Handles `array <op> self`. Returns `None` to decline the operation.
    fn reflected(&self, op: HostOp, array: &dyn Datum) -> Option<Result<BooleanArray>>;
}

impl<T> ReflectedCompare for T
where
    T: Comparable + ?Sized,
{
    fn reflected(&self, op: HostOp, array: &dyn Datum) -> Option<Result<BooleanArray>> {
        let reflected = self.definition().capability().intercepts(op)?;
        Some(self.compare(reflected, array))
    }
}

/// Evaluates `array <op> rhs` with a comparable on the right.
///
/// `array > range` runs as `range < array`; operations the comparable's
/// capability does not own fail with [`Error::Unhandled`].
pub fn dispatch<R>(array: &dyn Datum, op: HostOp, rhs: &R) -> Result<BooleanArray>
where
    R: ReflectedCompare + fmt::Debug + ?Sized,
{
    match rhs.reflected(op, array) {
        Some(result) => result,
        None => {
            log_debug!(
                component = "capability",
                event = "host_op_declined",
                op = %op,
                operand = ?rhs
            );
            Err(Error::Unhandled {
                op,
                operand: format!("{rhs:?}"),
            })
        }
    }
}

/// Evaluates `array <op> value` elementwise, the host's own path for plain literals.
pub fn elementwise(array: &dyn Datum, op: HostOp, value: &ScalarValue) -> Result<BooleanArray> {
    let Some(relational) = op.relational() else {
        return Err(Error::Unhandled {
            op,
            operand: value.to_string(),
        });
    };
    value.compare_array(relational, array)
}

#[cfg(test)]
mod tests {
    use arrow::array::Int64Array;

    use super::*;

    #[test]
    fn equatable_intercepts_equality_only() {
        let cap = Capability::Equatable;
        assert_eq!(cap.intercepts(HostOp::Equal), Some(CompareOp::Eq));
        assert_eq!(cap.intercepts(HostOp::NotEqual), Some(CompareOp::Ne));
        assert_eq!(cap.intercepts(HostOp::Greater), None);
        assert_eq!(cap.intercepts(HostOp::Add), None);
    }

    #[test]
    fn orderable_reflects_inequalities() {
        let cap = Capability::Orderable;
        assert_eq!(cap.intercepts(HostOp::Equal), Some(CompareOp::Eq));
        assert_eq!(cap.intercepts(HostOp::NotEqual), Some(CompareOp::Ne));
        assert_eq!(cap.intercepts(HostOp::Greater), Some(CompareOp::Lt));
        assert_eq!(cap.intercepts(HostOp::GreaterEqual), Some(CompareOp::Le));
        assert_eq!(cap.intercepts(HostOp::Less), Some(CompareOp::Gt));
        assert_eq!(cap.intercepts(HostOp::LessEqual), Some(CompareOp::Ge));
        assert_eq!(cap.intercepts(HostOp::Multiply), None);
        assert_eq!(cap.intercepts(HostOp::Or), None);
    }

    #[test]
    fn host_op_round_trips_through_compare_op() {
        for op in CompareOp::ALL {
            assert_eq!(HostOp::from(op).relational(), Some(op));
        }
    }

    #[test]
    fn elementwise_compares_plain_literals() {
        let data = Int64Array::from(vec![0, 1, 2]);
        let result = elementwise(&data, HostOp::GreaterEqual, &ScalarValue::from(1i64))
            .expect("int64 comparison");
        assert_eq!(result, BooleanArray::from(vec![false, true, true]));

        let err = elementwise(&data, HostOp::Add, &ScalarValue::from(1i64)).unwrap_err();
        assert!(matches!(err, Error::Unhandled { op: HostOp::Add, .. }));
    }
}
