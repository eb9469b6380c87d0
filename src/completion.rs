//! Comparable types and the one-time registration that completes their operators.
//!
//! A comparable type records, once, which relational operators it supplies.
//! [`DefinitionBuilder::build`] turns that record into a route table: supplied
//! operators run directly, and for `TotalEquality` / `TotalOrdering` types the
//! rest are synthesized from a single source operator through the formulas in
//! [`crate::operator`].
//!
//! ```ignore
//! static EVEN: Lazy<Definition> = Lazy::new(|| {
//!     Definition::total_equality("Even")
//!         .define(CompareOp::Eq)
//!         .build()
//!         .expect("eq is supplied")
//! });
//! ```

use std::fmt;

use arrow::array::{BooleanArray, Datum};

use crate::{
    capability::Capability,
    error::{Error, Result},
    observability::{log_debug, log_warn},
    operator::{derive, CompareOp, Operators, Relational, Slot},
};

/// How one operator of a registered type is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// The type's own implementation.
    Direct,
    /// Synthesized from another operator the type supplies.
    Derived {
        /// Source operator of the substitution.
        via: CompareOp,
    },
    /// Required by the capability but never supplied.
    Abstract,
    /// Outside the capability and not supplied.
    Unsupported,
}

/// Completion applied when a type is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    None,
    Equality,
    Ordering,
}

/// Registration record of a comparable type: its capability, the operators
/// it supplies, and how each of the six operators is evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    name: &'static str,
    capability: Capability,
    operators: Operators,
    routes: [Route; 6],
}

impl Definition {
    /// Starts registering a type that promises `==` and `!=` itself.
    #[must_use]
    pub fn equatable(name: &'static str) -> DefinitionBuilder {
        DefinitionBuilder::new(name, Capability::Equatable, Completion::None)
    }

    /// Starts registering a type that promises all six operators itself.
    #[must_use]
    pub fn orderable(name: &'static str) -> DefinitionBuilder {
        DefinitionBuilder::new(name, Capability::Orderable, Completion::None)
    }

    /// Starts registering an equatable type whose missing equality operator
    /// is synthesized from the one it supplies.
    #[must_use]
    pub fn total_equality(name: &'static str) -> DefinitionBuilder {
        DefinitionBuilder::new(name, Capability::Equatable, Completion::Equality)
    }

    /// Starts registering an orderable type whose missing operators are
    /// synthesized from one equality and one ordering operator.
    #[must_use]
    pub fn total_ordering(name: &'static str) -> DefinitionBuilder {
        DefinitionBuilder::new(name, Capability::Orderable, Completion::Ordering)
    }

    /// Name the type was registered under.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Capability the type declared.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Operator slots as supplied by the type, before completion.
    #[must_use]
    pub fn operators(&self) -> Operators {
        self.operators
    }

    /// Route used for `op`.
    #[must_use]
    pub fn route(&self, op: CompareOp) -> Route {
        self.routes[op.index()]
    }

    /// Evaluates `left <op> right` following this definition's route table.
    pub fn dispatch<L>(&self, left: &L, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray>
    where
        L: Relational + ?Sized,
    {
        match self.route(op) {
            Route::Direct => left.relate(op, right),
            Route::Derived { via } => derive(op, via, left, right),
            Route::Abstract => Err(Error::AbstractOperator {
                op,
                operand: self.name,
            }),
            Route::Unsupported => Err(Error::MissingOperator {
                op,
                operand: left.describe(),
            }),
        }
    }
}

/// Records which operators a comparable type supplies before building its [`Definition`].
#[derive(Clone, Debug)]
pub struct DefinitionBuilder {
    name: &'static str,
    capability: Capability,
    completion: Completion,
    operators: Operators,
}

impl DefinitionBuilder {
    fn new(name: &'static str, capability: Capability, completion: Completion) -> Self {
        let operators = capability
            .required()
            .iter()
            .fold(Operators::new(), |acc, op| acc.with(*op, Slot::Abstract));
        Self {
            name,
            capability,
            completion,
            operators,
        }
    }

    /// Marks `op` as supplied by the type.
    #[must_use]
    pub fn define(mut self, op: CompareOp) -> Self {
        self.operators.set(op, Slot::Defined);
        self
    }

    /// Marks `op` as an abstract placeholder.
    #[must_use]
    pub fn declare(mut self, op: CompareOp) -> Self {
        self.operators.set(op, Slot::Abstract);
        self
    }

    /// Marks `op` as left to the base no-op.
    #[must_use]
    pub fn inherit(mut self, op: CompareOp) -> Self {
        self.operators.set(op, Slot::Unset);
        self
    }

    /// Builds the route table, running completion when the type asked for it.
    ///
    /// Fails with [`Error::Definition`] when the type defines none of the
    /// operators its capability requires, or a completion finds no source operator.
    pub fn build(self) -> Result<Definition> {
        let routes = match self.completion {
            Completion::None => self.plain_routes()?,
            Completion::Equality => self.completed_routes(false)?,
            Completion::Ordering => self.completed_routes(true)?,
        };
        let definition = Definition {
            name: self.name,
            capability: self.capability,
            operators: self.operators,
            routes,
        };
        log_debug!(
            component = "completion",
            event = "definition_completed",
            type_name = definition.name,
            capability = %definition.capability,
            routes = ?definition.routes
        );
        Ok(definition)
    }

    fn plain_routes(&self) -> Result<[Route; 6]> {
        let required = self.capability.required();
        if !required.iter().any(|op| self.operators.is_defined(*op)) {
            return Err(Error::Definition {
                type_name: self.name,
                expected: match self.capability {
                    Capability::Equatable => "eq, ne",
                    Capability::Orderable => "eq, ge, gt, le, lt, ne",
                },
            });
        }
        let routes = CompareOp::ALL.map(|op| match self.operators.slot(op) {
            Slot::Defined => Route::Direct,
            _ if self.capability.requires(op) => Route::Abstract,
            _ => Route::Unsupported,
        });
        if routes.contains(&Route::Abstract) {
            log_warn!(
                component = "completion",
                event = "abstract_operators",
                type_name = self.name,
                routes = ?routes
            );
        }
        Ok(routes)
    }

    fn completed_routes(&self, ordering: bool) -> Result<[Route; 6]> {
        let mut routes = CompareOp::ALL.map(|op| {
            if self.operators.is_defined(op) {
                Route::Direct
            } else {
                Route::Unsupported
            }
        });

        let equality = [CompareOp::Eq, CompareOp::Ne]
            .into_iter()
            .find(|op| self.operators.is_defined(*op))
            .ok_or(Error::Definition {
                type_name: self.name,
                expected: "eq, ne",
            })?;
        fill(&mut routes, &[CompareOp::Eq, CompareOp::Ne], equality);

        if ordering {
            let source = CompareOp::ORDERING
                .into_iter()
                .find(|op| self.operators.is_defined(*op))
                .ok_or(Error::Definition {
                    type_name: self.name,
                    expected: "ge, gt, le, lt",
                })?;
            fill(&mut routes, &CompareOp::ORDERING, source);
        }
        Ok(routes)
    }
}

fn fill(routes: &mut [Route; 6], group: &[CompareOp], via: CompareOp) {
    for op in group {
        let route = &mut routes[op.index()];
        if *route != Route::Direct {
            *route = Route::Derived { via };
        }
    }
}

/// Object that can sit on either side of a relational operator against an
/// Arrow array and yields a boolean array.
pub trait Comparable: fmt::Debug + Send + Sync {
    /// Registration record shared by every value of the type.
    fn definition(&self) -> &Definition;

    /// Evaluates `self <op> right` for an operator the type supplies itself.
    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray>;

    /// Evaluates `self <op> right`, synthesizing `op` when the type's
    /// completion derived it.
    fn compare(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        self.definition().dispatch(self, op, right)
    }
}

impl<T> Relational for T
where
    T: Comparable + ?Sized,
{
    fn operators(&self) -> Operators {
        self.definition().operators()
    }

    fn relate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        self.evaluate(op, right)
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}
