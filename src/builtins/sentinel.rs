use std::{fmt, sync::Arc};

use arrow::array::{BooleanArray, Datum};
use once_cell::sync::Lazy;

use crate::{
    combinator::Condition,
    completion::{Comparable, Definition},
    error::{Error, Result},
    operator::{all_of, any_of, filled, kernel, CompareOp},
};

/// Comparable equal to every element, nulls included.
///
/// `ANY` is `Copy` and joins conditions directly: `ANY & Range::new(1, 3)`,
/// `ANY | "a"` or `!ANY`.
pub static ANY: AnyType = AnyType { _private: () };

/// Comparable equal to no element. Combines like [`ANY`].
pub static NEVER: NeverType = NeverType { _private: () };

// Every condition built from a sentinel holds the same shared instance.
static SHARED_ANY: Lazy<Arc<dyn Comparable>> =
    Lazy::new(|| Arc::new(ANY) as Arc<dyn Comparable>);
static SHARED_NEVER: Lazy<Arc<dyn Comparable>> =
    Lazy::new(|| Arc::new(NEVER) as Arc<dyn Comparable>);

static ANY_DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_equality("ANY")
        .define(CompareOp::Eq)
        .build()
        .expect("eq is defined")
});

static NEVER_DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_equality("NEVER")
        .define(CompareOp::Eq)
        .build()
        .expect("eq is defined")
});

/// Type of [`ANY`].
#[derive(Clone, Copy)]
pub struct AnyType {
    _private: (),
}

impl AnyType {
    /// Returns the [`ANY`] instance.
    pub fn new() -> &'static AnyType {
        &ANY
    }
}

impl Comparable for AnyType {
    fn definition(&self) -> &Definition {
        &ANY_DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match op {
            // (x == x) | true keeps the shape of x
            CompareOp::Eq => any_of(&kernel(CompareOp::Eq, right, right)?, &filled(right, true)),
            op => Err(Error::MissingOperator {
                op,
                operand: self.to_string(),
            }),
        }
    }
}

/// Type of [`NEVER`].
#[derive(Clone, Copy)]
pub struct NeverType {
    _private: (),
}

impl NeverType {
    /// Returns the [`NEVER`] instance.
    pub fn new() -> &'static NeverType {
        &NEVER
    }
}

impl Comparable for NeverType {
    fn definition(&self) -> &Definition {
        &NEVER_DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match op {
            CompareOp::Eq => all_of(&kernel(CompareOp::Ne, right, right)?, &filled(right, false)),
            op => Err(Error::MissingOperator {
                op,
                operand: self.to_string(),
            }),
        }
    }
}

macro_rules! sentinel_traits {
    ($ty:ident, $shared:ident, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($label)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($label)
            }
        }

        impl From<$ty> for Condition {
            fn from(_: $ty) -> Self {
                Condition::Comparable(Arc::clone(&$shared))
            }
        }

        impl From<&$ty> for Condition {
            fn from(_: &$ty) -> Self {
                Condition::Comparable(Arc::clone(&$shared))
            }
        }
    };
}

sentinel_traits!(AnyType, SHARED_ANY, "ANY");
sentinel_traits!(NeverType, SHARED_NEVER, "NEVER");

#[cfg(test)]
mod tests {
    use std::ptr;

    use arrow::array::{Int64Array, StringArray};

    use super::*;
    use crate::{
        capability::{dispatch, HostOp},
        combinator::{All, Any},
    };

    #[test]
    fn constructors_share_one_instance() {
        assert!(ptr::eq(AnyType::new(), AnyType::new()));
        assert!(ptr::eq(AnyType::new(), &ANY));
        assert!(ptr::eq(NeverType::new(), &NEVER));
        assert_eq!(Condition::from(ANY), Condition::from(AnyType::new()));
        assert_ne!(Condition::from(ANY), Condition::from(NEVER));
    }

    #[test]
    fn any_matches_everything_never_nothing() {
        let data = StringArray::from(vec![Some("a"), None, Some("c")]);
        assert_eq!(
            dispatch(&data, HostOp::Equal, &ANY).unwrap(),
            BooleanArray::from(vec![true; 3])
        );
        assert_eq!(
            dispatch(&data, HostOp::NotEqual, &ANY).unwrap(),
            BooleanArray::from(vec![false; 3])
        );
        assert_eq!(
            dispatch(&data, HostOp::Equal, &NEVER).unwrap(),
            BooleanArray::from(vec![false; 3])
        );
    }

    #[test]
    fn sentinels_are_identities_in_combinators() {
        let data = Int64Array::from(vec![0, 1, 2]);
        let only_one: All = ANY & 1i64;
        assert_eq!(
            only_one.matches(&data).unwrap(),
            BooleanArray::from(vec![false, true, false])
        );
        let still_one: Any = NEVER | 1i64;
        assert_eq!(
            still_one.matches(&data).unwrap(),
            BooleanArray::from(vec![false, true, false])
        );
        assert_eq!(
            (!ANY).matches(&data).unwrap(),
            BooleanArray::from(vec![false; 3])
        );
        assert_eq!(ANY.to_string(), "ANY");
        assert_eq!(format!("{NEVER:?}"), "NEVER");
    }
}
