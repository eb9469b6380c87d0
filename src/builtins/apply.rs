use std::{fmt, sync::Arc};

use arrow::array::{Array, BooleanArray, Datum};
use once_cell::sync::Lazy;

use crate::{
    combinator::Condition,
    completion::{Comparable, Definition},
    error::{Error, Result},
    operator::CompareOp,
    value::ScalarValue,
};

/// Boolean function applied by [`Apply`].
pub type ApplyFn = dyn Fn(&dyn Array, &Arguments) -> Result<BooleanArray> + Send + Sync;

/// Extra arguments passed to an [`Apply`] function after the array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<ScalarValue>,
    keyword: Vec<(String, ScalarValue)>,
}

impl Arguments {
    /// Positional arguments in order.
    pub fn positional(&self) -> &[ScalarValue] {
        &self.positional
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&ScalarValue> {
        self.positional.get(index)
    }

    /// Keyword argument named `name`.
    pub fn keyword(&self, name: &str) -> Option<&ScalarValue> {
        self.keyword
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Keyword arguments in insertion order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &ScalarValue)> + '_ {
        self.keyword.iter().map(|(key, value)| (key.as_str(), value))
    }
}

static DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_equality("Apply")
        .define(CompareOp::Eq)
        .build()
        .expect("eq is defined")
});

/// Equality through an arbitrary boolean function of the array.
///
/// ```ignore
/// let upper = Apply::new("is_upper", |array, _| {
///     let strings = array.as_string::<i32>();
///     Ok(strings.iter().map(|s| s.map(|s| s.chars().all(char::is_uppercase))).collect())
/// });
/// ```
#[derive(Clone)]
pub struct Apply {
    name: String,
    func: Arc<ApplyFn>,
    args: Arguments,
}

impl Apply {
    /// Wraps `func`; `name` identifies it in debug output and errors.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&dyn Array, &Arguments) -> Result<BooleanArray> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            args: Arguments::default(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<ScalarValue>) -> Self {
        self.args.positional.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing an earlier one with the same name.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.args.keyword.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.args.keyword.push((name, value)),
        }
        self
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.args
    }
}

impl Comparable for Apply {
    fn definition(&self) -> &Definition {
        &DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match op {
            CompareOp::Eq => {
                let (array, _) = right.get();
                (self.func)(array, &self.args)
            }
            op => Err(Error::MissingOperator {
                op,
                operand: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for Apply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Apply({}, *[", self.name)?;
        for (i, value) in self.args.positional.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("], **{")?;
        for (i, (key, value)) in self.args.keyword.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key:?}: {value}")?;
        }
        f.write_str("})")
    }
}

impl fmt::Debug for Apply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Apply> for Condition {
    fn from(apply: Apply) -> Self {
        Condition::comparable(apply)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{AsArray, Int64Array};

    use super::*;
    use crate::capability::{dispatch, HostOp};

    fn at_least() -> Apply {
        Apply::new("at_least", |array, args| {
            args.get(0)
                .cloned()
                .unwrap_or(ScalarValue::Int64(0))
                .compare_array(CompareOp::Ge, &array)
        })
    }

    #[test]
    fn arguments_reach_the_function() {
        let data = Int64Array::from(vec![0, 1, 2]);
        let apply = at_least().arg(1);
        assert_eq!(
            dispatch(&data, HostOp::Equal, &apply).unwrap(),
            BooleanArray::from(vec![false, true, true])
        );
        assert_eq!(
            dispatch(&data, HostOp::NotEqual, &apply).unwrap(),
            BooleanArray::from(vec![true, false, false])
        );
    }

    #[test]
    fn keyword_arguments_replace_by_name() {
        let apply = at_least().arg(1).kwarg("mode", "strict").kwarg("mode", "loose");
        assert_eq!(
            apply.arguments().keyword("mode"),
            Some(&ScalarValue::from("loose"))
        );
        assert_eq!(apply.arguments().keywords().count(), 1);
        assert_eq!(apply.to_string(), "Apply(at_least, *[1], **{\"mode\": \"loose\"})");
    }

    #[test]
    fn ordering_is_declined() {
        let data = Int64Array::from(vec![0, 1, 2]);
        let err = dispatch(&data, HostOp::Less, &at_least()).unwrap_err();
        assert!(matches!(err, Error::Unhandled { op: HostOp::Less, .. }));
    }

    #[test]
    fn function_errors_propagate() {
        let strings = arrow::array::StringArray::from(vec!["a"]);
        let failing = Apply::new("strings_only", |array, _| {
            Ok(array
                .as_string_opt::<i32>()
                .ok_or_else(|| Error::UnsupportedArray(array.data_type().clone()))?
                .iter()
                .map(|value| value.map(str::is_empty))
                .collect())
        });
        assert!(dispatch(&strings, HostOp::Equal, &failing).is_ok());

        let numbers = Int64Array::from(vec![1]);
        assert!(matches!(
            dispatch(&numbers, HostOp::Equal, &failing),
            Err(Error::UnsupportedArray(_))
        ));
    }
}
