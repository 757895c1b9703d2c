//! Defines the condition-node tree behind a [`Filter`](crate::Filter).

use model::Value;
use serde::{Deserialize, Serialize};

/// A bare column identifier, e.g. `user_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident { name: name.into() }
    }
}

/// One node of a boolean condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionNode {
    /// A single test of a column against a scalar, e.g. `age >= 21`.
    Comparison {
        column: Ident,
        op: CompareOp,
        value: Value,
    },

    /// `column Is Null` / `column Is Not Null`.
    NullCheck { column: Ident, want_null: bool },

    /// An AND/OR combination of child conditions, in insertion order.
    Logical {
        op: LogicalOp,
        children: Vec<ConditionNode>,
    },
}

/// Comparison operators placed between a column and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Like,
}

impl CompareOp {
    /// The operator text as it appears in the rendered clause.
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Like => " Like ",
        }
    }
}

/// Logical operators combining sibling conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "And",
            LogicalOp::Or => "Or",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_op_sql_text() {
        assert_eq!(CompareOp::Eq.as_sql(), "=");
        assert_eq!(CompareOp::NotEq.as_sql(), "<>");
        assert_eq!(CompareOp::Like.as_sql(), " Like ");
    }

    #[test]
    fn logical_op_keywords() {
        assert_eq!(LogicalOp::And.keyword(), "And");
        assert_eq!(LogicalOp::Or.keyword(), "Or");
    }
}
