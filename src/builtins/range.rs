use std::{fmt, str::FromStr};

use arrow::array::{BooleanArray, Datum};
use once_cell::sync::Lazy;

use crate::{
    combinator::Condition,
    completion::{Comparable, Definition},
    error::{Error, Result},
    operator::{all_of, CompareOp},
    value::ScalarValue,
};

/// Which endpoints of a [`Range`] are inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Bounds {
    /// `[]`
    Closed,
    /// `[)`
    #[default]
    ClosedOpen,
    /// `(]`
    OpenClosed,
    /// `()`
    Open,
}

impl Bounds {
    /// True when the lower endpoint is part of the range.
    #[must_use]
    pub fn lower_closed(self) -> bool {
        matches!(self, Bounds::Closed | Bounds::ClosedOpen)
    }

    /// True when the upper endpoint is part of the range.
    #[must_use]
    pub fn upper_closed(self) -> bool {
        matches!(self, Bounds::Closed | Bounds::OpenClosed)
    }

    /// The two-character token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Bounds::Closed => "[]",
            Bounds::ClosedOpen => "[)",
            Bounds::OpenClosed => "(]",
            Bounds::Open => "()",
        }
    }
}

impl FromStr for Bounds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "[]" => Ok(Bounds::Closed),
            "[)" => Ok(Bounds::ClosedOpen),
            "(]" => Ok(Bounds::OpenClosed),
            "()" => Ok(Bounds::Open),
            other => Err(Error::UnsupportedBounds(other.to_owned())),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_ordering("Range")
        .define(CompareOp::Eq)
        .define(CompareOp::Ge)
        .define(CompareOp::Gt)
        .build()
        .expect("eq and ge are defined")
});

/// Interval membership and ordering.
///
/// `array == range` tests membership, `array < range` is true below the
/// range and `array > range` above it. The bounds token is checked on every
/// comparison, so an invalid token only fails once the range is used.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    lower: ScalarValue,
    upper: ScalarValue,
    bounds: String,
}

impl Range {
    /// Range with the lower endpoint included and the upper one excluded.
    pub fn new(lower: impl Into<ScalarValue>, upper: impl Into<ScalarValue>) -> Self {
        Self::with_bounds(lower, upper, Bounds::default().as_str())
    }

    /// Range with an explicit bounds token: `[]`, `[)`, `(]` or `()`.
    pub fn with_bounds(
        lower: impl Into<ScalarValue>,
        upper: impl Into<ScalarValue>,
        bounds: impl Into<String>,
    ) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            bounds: bounds.into(),
        }
    }

    /// Lower endpoint.
    pub fn lower(&self) -> &ScalarValue {
        &self.lower
    }

    /// Upper endpoint.
    pub fn upper(&self) -> &ScalarValue {
        &self.upper
    }

    /// Parsed bounds token.
    pub fn bounds(&self) -> Result<Bounds> {
        self.bounds.parse()
    }

    fn above_lower(&self, bounds: Bounds, right: &dyn Datum) -> Result<BooleanArray> {
        let op = if bounds.lower_closed() {
            CompareOp::Ge
        } else {
            CompareOp::Gt
        };
        self.lower.compare_array(op, right)
    }

    fn below_upper(&self, bounds: Bounds, right: &dyn Datum) -> Result<BooleanArray> {
        let op = if bounds.upper_closed() {
            CompareOp::Le
        } else {
            CompareOp::Lt
        };
        self.upper.compare_array(op, right)
    }
}

impl Comparable for Range {
    fn definition(&self) -> &Definition {
        &DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        let bounds = self.bounds()?;
        match op {
            CompareOp::Eq => all_of(
                &self.above_lower(bounds, right)?,
                &self.below_upper(bounds, right)?,
            ),
            // range >= x: x is in or below the range
            CompareOp::Ge => self.below_upper(bounds, right),
            // range > x: x is below the range
            CompareOp::Gt => {
                let op = if bounds.lower_closed() {
                    CompareOp::Lt
                } else {
                    CompareOp::Le
                };
                self.lower.compare_array(op, right)
            }
            op => Err(Error::MissingOperator {
                op,
                operand: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut token = self.bounds.chars();
        let open = token.next().unwrap_or('[');
        let close = token.next_back().unwrap_or(')');
        write!(f, "{open}{}, {}{close}", self.lower, self.upper)
    }
}

impl From<Range> for Condition {
    fn from(range: Range) -> Self {
        Condition::comparable(range)
    }
}
