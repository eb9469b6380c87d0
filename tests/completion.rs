use arrow::array::{BooleanArray, Datum, Int64Array};
use ndcompare::{dispatch, Comparable, CompareOp, Definition, Error, HostOp, Result, Route};
use once_cell::sync::Lazy;

/// `x` satisfies `Threshold` when `x == value`; ordering compares `value` to `x`.
#[derive(Debug)]
struct Threshold {
    value: i64,
    definition: &'static Definition,
}

impl Comparable for Threshold {
    fn definition(&self) -> &Definition {
        self.definition
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        // self <op> x is x <flipped> self
        let scalar = Int64Array::new_scalar(self.value);
        let result = match op.flipped() {
            CompareOp::Eq => arrow::compute::kernels::cmp::eq(right, &scalar),
            CompareOp::Ne => arrow::compute::kernels::cmp::neq(right, &scalar),
            CompareOp::Ge => arrow::compute::kernels::cmp::gt_eq(right, &scalar),
            CompareOp::Gt => arrow::compute::kernels::cmp::gt(right, &scalar),
            CompareOp::Le => arrow::compute::kernels::cmp::lt_eq(right, &scalar),
            CompareOp::Lt => arrow::compute::kernels::cmp::lt(right, &scalar),
        };
        Ok(result?)
    }
}

static REFERENCE: Lazy<Definition> = Lazy::new(|| {
    CompareOp::ALL
        .iter()
        .fold(Definition::orderable("Reference"), |builder, op| {
            builder.define(*op)
        })
        .build()
        .unwrap()
});

static BY_GE: Lazy<Definition> = Lazy::new(|| single_source(CompareOp::Ge));
static BY_GT: Lazy<Definition> = Lazy::new(|| single_source(CompareOp::Gt));
static BY_LE: Lazy<Definition> = Lazy::new(|| single_source(CompareOp::Le));
static BY_LT: Lazy<Definition> = Lazy::new(|| single_source(CompareOp::Lt));

fn single_source(source: CompareOp) -> Definition {
    Definition::total_ordering("Threshold")
        .define(CompareOp::Eq)
        .define(source)
        .build()
        .unwrap()
}

fn random_array(rng: &mut fastrand::Rng, len: usize) -> Int64Array {
    (0..len)
        .map(|_| (rng.u8(..8) != 0).then(|| rng.i64(-5..=5)))
        .collect()
}

#[test]
fn derived_operators_agree_with_the_reference() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let sources: [&'static Definition; 4] = [&BY_GE, &BY_GT, &BY_LE, &BY_LT];

    for _ in 0..64 {
        let value = rng.i64(-5..=5);
        let len = rng.usize(1..32);
        let data = random_array(&mut rng, len);
        let reference = Threshold {
            value,
            definition: &REFERENCE,
        };
        for definition in sources {
            let derived = Threshold { value, definition };
            for op in HostOp::RELATIONAL {
                assert_eq!(
                    dispatch(&data, op, &derived).unwrap(),
                    dispatch(&data, op, &reference).unwrap(),
                    "array {op} threshold({value}) derived from {:?}",
                    definition.operators()
                );
            }
        }
    }
}

#[test]
fn derivation_uses_the_first_defined_source() {
    let definition = Definition::total_ordering("Threshold")
        .define(CompareOp::Ne)
        .define(CompareOp::Le)
        .define(CompareOp::Gt)
        .build()
        .unwrap();
    assert_eq!(definition.route(CompareOp::Eq), Route::Derived { via: CompareOp::Ne });
    assert_eq!(definition.route(CompareOp::Ge), Route::Derived { via: CompareOp::Gt });
    assert_eq!(definition.route(CompareOp::Lt), Route::Derived { via: CompareOp::Gt });
    assert_eq!(definition.route(CompareOp::Le), Route::Direct);
}

#[test]
fn completion_without_operators_is_a_configuration_error() {
    let equality = Definition::total_equality("Nothing").build().unwrap_err();
    assert_eq!(equality.to_string(), "Nothing: define at least one of eq, ne");

    let ordering = Definition::total_ordering("OnlyEq")
        .define(CompareOp::Eq)
        .build()
        .unwrap_err();
    assert!(matches!(ordering, Error::Definition { .. }));
    assert_eq!(
        ordering.to_string(),
        "OnlyEq: define at least one of ge, gt, le, lt"
    );
}

#[test]
fn plain_declaration_needs_one_operator() {
    let err = Definition::orderable("Empty").build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Empty: define at least one of eq, ge, gt, le, lt, ne"
    );
    assert!(Definition::equatable("Empty")
        .inherit(CompareOp::Eq)
        .build()
        .is_err());
    assert!(Definition::orderable("OnlyLt")
        .define(CompareOp::Lt)
        .build()
        .is_ok());
}

#[test]
fn completing_a_complete_type_keeps_every_operator() {
    let completed = CompareOp::ALL
        .iter()
        .fold(Definition::total_ordering("Reference"), |builder, op| {
            builder.define(*op)
        })
        .build()
        .unwrap();
    for op in CompareOp::ALL {
        assert_eq!(completed.route(op), Route::Direct);
    }
    assert_eq!(completed.operators(), REFERENCE.operators());
}

#[test]
fn declared_but_missing_operators_fail_on_use() {
    let definition: &'static Definition = Box::leak(Box::new(
        Definition::orderable("Partial")
            .define(CompareOp::Eq)
            .define(CompareOp::Ne)
            .build()
            .unwrap(),
    ));
    let partial = Threshold {
        value: 1,
        definition,
    };
    let data = Int64Array::from(vec![0, 1, 2]);
    assert_eq!(
        dispatch(&data, HostOp::Equal, &partial).unwrap(),
        BooleanArray::from(vec![false, true, false])
    );
    let err = dispatch(&data, HostOp::Less, &partial).unwrap_err();
    assert!(matches!(
        err,
        Error::AbstractOperator {
            op: CompareOp::Gt,
            operand: "Partial"
        }
    ));
}
