//! Literal values that comparables hold and compare arrays against.

use std::{fmt, sync::Arc};

use arrow::{
    array::{
        new_null_array, Array, ArrayRef, BinaryArray, BooleanArray, Datum, Float64Array,
        Int64Array, Scalar, StringArray, UInt64Array,
    },
    compute::{can_cast_types, cast_with_options, CastOptions},
    datatypes::DataType,
};

use crate::{
    error::{Error, Result},
    observability::log_trace,
    operator::{kernel, CompareOp},
};

/// Literal values accepted as range bounds, combinator members and function arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// Represents Arrow `NULL`.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Binary blob.
    Binary(Vec<u8>),
}

impl ScalarValue {
    /// Returns true when the literal is the `Null` variant.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Arrow data type this literal naturally maps to.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::UInt64(_) => DataType::UInt64,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Utf8(_) => DataType::Utf8,
            ScalarValue::Binary(_) => DataType::Binary,
        }
    }

    /// Builds a single-element array holding this literal.
    #[must_use]
    pub fn to_array(&self) -> ArrayRef {
        match self {
            ScalarValue::Null => new_null_array(&DataType::Null, 1),
            ScalarValue::Boolean(value) => Arc::new(BooleanArray::from(vec![*value])),
            ScalarValue::Int64(value) => Arc::new(Int64Array::from(vec![*value])),
            ScalarValue::UInt64(value) => Arc::new(UInt64Array::from(vec![*value])),
            ScalarValue::Float64(value) => Arc::new(Float64Array::from(vec![*value])),
            ScalarValue::Utf8(value) => Arc::new(StringArray::from(vec![value.as_str()])),
            ScalarValue::Binary(value) => Arc::new(BinaryArray::from(vec![value.as_slice()])),
        }
    }

    /// Evaluates `target <op> self` elementwise.
    ///
    /// The literal is cast to the type of `target` when that cast round-trips
    /// exactly. Otherwise numeric operands are both widened to a common type:
    /// `Float64` when either side is floating point, `Decimal128(20, 0)` when
    /// signed and unsigned integers meet. Any other mismatch is an
    /// [`Error::Coercion`].
    pub fn compare_array(&self, op: CompareOp, target: &dyn Datum) -> Result<BooleanArray> {
        let (array, is_scalar) = target.get();
        let wanted = array.data_type();
        if self.is_null() {
            let literal = Scalar::new(new_null_array(wanted, 1));
            return Ok(kernel(op, target, &literal)?);
        }

        let literal = self.to_array();
        if literal.data_type() == wanted {
            return Ok(kernel(op, target, &Scalar::new(literal))?);
        }
        if let Some(literal) = lossless_cast(&literal, wanted) {
            return Ok(kernel(op, target, &Scalar::new(literal))?);
        }

        let common = common_type(wanted, &self.data_type()).ok_or_else(|| Error::Coercion {
            value: self.to_string(),
            data_type: wanted.clone(),
        })?;
        log_trace!(
            component = "value",
            event = "operands_widened",
            value = %self,
            from = ?wanted,
            to = ?common
        );
        let left = cast_with_options(array, &common, &strict())?;
        let right = Scalar::new(cast_with_options(&literal, &common, &strict())?);
        if is_scalar {
            Ok(kernel(op, &Scalar::new(left), &right)?)
        } else {
            Ok(kernel(op, &left, &right)?)
        }
    }
}

fn strict() -> CastOptions<'static> {
    CastOptions {
        safe: false,
        ..Default::default()
    }
}

/// Casts `literal` to `wanted` only when casting back yields the same value.
fn lossless_cast(literal: &ArrayRef, wanted: &DataType) -> Option<ArrayRef> {
    if !can_cast_types(literal.data_type(), wanted) {
        return None;
    }
    let cast = cast_with_options(literal, wanted, &strict()).ok()?;
    let back = cast_with_options(&cast, literal.data_type(), &strict()).ok()?;
    (back.to_data() == literal.to_data()).then_some(cast)
}

fn common_type(array: &DataType, literal: &DataType) -> Option<DataType> {
    let numeric = |data_type: &DataType| {
        data_type.is_signed_integer() || data_type.is_unsigned_integer() || data_type.is_floating()
    };
    if !numeric(array) || !numeric(literal) {
        return None;
    }
    if array.is_floating() || literal.is_floating() {
        Some(DataType::Float64)
    } else if array.is_signed_integer() == literal.is_signed_integer() {
        // literals are already 64 bits wide
        Some(literal.clone())
    } else {
        Some(DataType::Decimal128(20, 0))
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("null"),
            ScalarValue::Boolean(value) => write!(f, "{value}"),
            ScalarValue::Int64(value) => write!(f, "{value}"),
            ScalarValue::UInt64(value) => write!(f, "{value}"),
            ScalarValue::Float64(value) => write!(f, "{value}"),
            ScalarValue::Utf8(value) => write!(f, "{value:?}"),
            ScalarValue::Binary(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(i64::from(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::UInt64(u64::from(value))
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::UInt64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(value: Vec<u8>) -> Self {
        ScalarValue::Binary(value)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::Int32Array;

    use super::*;

    #[test]
    fn option_none_maps_to_null() {
        assert!(ScalarValue::from(None::<i64>).is_null());
        assert_eq!(ScalarValue::from(Some(3i64)), ScalarValue::Int64(3));
    }

    #[test]
    fn literal_narrows_to_the_array_type() {
        let data = Int32Array::from(vec![0, 1, 2]);
        assert_eq!(
            ScalarValue::from(1i64).compare_array(CompareOp::Eq, &data).unwrap(),
            BooleanArray::from(vec![false, true, false])
        );
        assert_eq!(
            ScalarValue::from(1.0).compare_array(CompareOp::Ge, &data).unwrap(),
            BooleanArray::from(vec![false, true, true])
        );
    }

    #[test]
    fn fractional_literal_widens_integers_to_float() {
        let data = Int64Array::from(vec![0, 1, 2]);
        assert_eq!(
            ScalarValue::from(0.5).compare_array(CompareOp::Ge, &data).unwrap(),
            BooleanArray::from(vec![false, true, true])
        );
        assert_eq!(
            ScalarValue::from(1.5).compare_array(CompareOp::Le, &data).unwrap(),
            BooleanArray::from(vec![true, true, false])
        );
    }

    #[test]
    fn negative_literal_against_unsigned_array() {
        let data = UInt64Array::from(vec![0, 1, u64::MAX]);
        assert_eq!(
            ScalarValue::from(-1i64).compare_array(CompareOp::Gt, &data).unwrap(),
            BooleanArray::from(vec![true, true, true])
        );
        assert_eq!(
            ScalarValue::from(-1i64).compare_array(CompareOp::Eq, &data).unwrap(),
            BooleanArray::from(vec![false, false, false])
        );
    }

    #[test]
    fn unsigned_literal_beyond_signed_range() {
        let data = Int64Array::from(vec![-1, i64::MAX]);
        assert_eq!(
            ScalarValue::from(u64::MAX).compare_array(CompareOp::Lt, &data).unwrap(),
            BooleanArray::from(vec![true, true])
        );
    }

    #[test]
    fn incompatible_literal_is_an_error() {
        let data = Int64Array::from(vec![0, 1, 2]);
        let err = ScalarValue::from("x")
            .compare_array(CompareOp::Eq, &data)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Coercion {
                data_type: DataType::Int64,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "cannot compare \"x\" with Int64 values without loss"
        );
    }

    #[test]
    fn null_literal_yields_nulls() {
        let data = Int64Array::from(vec![0, 1]);
        let result = ScalarValue::Null
            .compare_array(CompareOp::Eq, &data)
            .unwrap();
        assert_eq!(result.null_count(), 2);
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(ScalarValue::from(7i64).to_string(), "7");
        assert_eq!(ScalarValue::from("a+").to_string(), "\"a+\"");
        assert_eq!(ScalarValue::Null.to_string(), "null");
    }
}
