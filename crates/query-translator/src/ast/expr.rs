//! The generic query expression tree consumed by the translator.

use crate::ast::operator::{BinaryOperator, UnaryOperator};
use model::Value;
use serde::{Deserialize, Serialize};

/// One node of a caller-built query expression.
///
/// This crate consumes such trees; it never builds or mutates them. The
/// constructors below exist for the code that does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// The queryable source a method-call chain starts from. Contributes no
    /// SQL text of its own.
    Source,

    /// A literal scalar.
    Constant(Value),

    /// Access to a field of the record under test.
    Member {
        /// Whether the access is directly on the record parameter. Access
        /// through anything deeper (a field of a nested object) is not
        /// translatable.
        on_parameter: bool,
        name: String,
    },

    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A named method call, e.g. `Where`, `OrderBy` or `StartsWith`. The
    /// name stays a plain string so unrecognized methods are representable
    /// and rejected by name.
    Call {
        method: String,
        /// Receiver for instance-style calls (`field.StartsWith(...)`).
        target: Option<Box<Expression>>,
        /// Positional arguments; chainable query operators take the
        /// upstream expression as their first argument.
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    /// A field access directly on the record parameter.
    pub fn member(name: impl Into<String>) -> Self {
        Expression::Member {
            on_parameter: true,
            name: name.into(),
        }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::unary(UnaryOperator::Not, operand)
    }

    pub fn call(
        method: impl Into<String>,
        target: Option<Expression>,
        args: Vec<Expression>,
    ) -> Self {
        Expression::Call {
            method: method.into(),
            target: target.map(Box::new),
            args,
        }
    }
}
