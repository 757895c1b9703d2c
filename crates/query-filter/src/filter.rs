//! The fluent [`Filter`] builder.

use crate::ast::{CompareOp, ConditionNode, Ident, LogicalOp};
use crate::render::{Render, Renderer};
use model::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Builds a SQL `where` clause from chained column conditions.
///
/// Each combinator consumes and returns the builder, so conditions chain
/// naturally; the unqualified methods combine with AND and every one of them
/// has an `or_` twin that combines with OR instead. A filter with no
/// conditions renders as the empty string.
///
/// ```
/// use query_filter::Filter;
///
/// let filter = Filter::new()
///     .equal_to("ColName", "Value")
///     .or_is_null("ColName");
///
/// assert_eq!(filter.to_string(), "where ColName='Value' Or ColName Is Null");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    top: Option<ConditionNode>,
}

impl Filter {
    /// Creates a filter with no conditions.
    pub fn new() -> Self {
        Self::default()
    }

    // comparisons -----------------------------------------------------------

    /// Keeps only rows whose column equals the value.
    pub fn equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::Eq, value))
    }

    pub fn or_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::Eq, value))
    }

    /// Keeps only rows whose column differs from the value.
    pub fn not_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::NotEq, value))
    }

    pub fn or_not_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::NotEq, value))
    }

    pub fn greater_than(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::Gt, value))
    }

    pub fn or_greater_than(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::Gt, value))
    }

    pub fn greater_than_or_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::GtEq, value))
    }

    pub fn or_greater_than_or_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::GtEq, value))
    }

    pub fn less_than(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::Lt, value))
    }

    pub fn or_less_than(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::Lt, value))
    }

    pub fn less_than_or_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_node(comparison(column, CompareOp::LtEq, value))
    }

    pub fn or_less_than_or_equal_to(self, column: &str, value: impl Into<Value>) -> Self {
        self.or_node(comparison(column, CompareOp::LtEq, value))
    }

    // string matching -------------------------------------------------------

    /// Wildcard match; the pattern is taken verbatim. Patterns commonly use
    /// the `%` symbol as a wildcard.
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.and_node(like_condition(column, pattern.to_string()))
    }

    pub fn or_like(self, column: &str, pattern: &str) -> Self {
        self.or_node(like_condition(column, pattern.to_string()))
    }

    /// Matches the substring anywhere within the column.
    pub fn contains_string(self, column: &str, substring: &str) -> Self {
        self.and_node(like_condition(column, format!("%{substring}%")))
    }

    pub fn or_contains_string(self, column: &str, substring: &str) -> Self {
        self.or_node(like_condition(column, format!("%{substring}%")))
    }

    /// Matches columns starting with the prefix.
    pub fn starts_with_string(self, column: &str, prefix: &str) -> Self {
        self.and_node(like_condition(column, format!("{prefix}%")))
    }

    pub fn or_starts_with_string(self, column: &str, prefix: &str) -> Self {
        self.or_node(like_condition(column, format!("{prefix}%")))
    }

    /// Matches the value as an element of a comma-separated list stored in
    /// the column: the whole list, its first element, its last element, or
    /// an interior element.
    pub fn contains_string_within_csv(self, column: &str, value: &str) -> Self {
        self.and_node(csv_condition(column, value))
    }

    pub fn or_contains_string_within_csv(self, column: &str, value: &str) -> Self {
        self.or_node(csv_condition(column, value))
    }

    // null checks -----------------------------------------------------------

    pub fn is_null(self, column: &str) -> Self {
        self.and_node(null_check(column, true))
    }

    pub fn or_is_null(self, column: &str) -> Self {
        self.or_node(null_check(column, true))
    }

    pub fn is_not_null(self, column: &str) -> Self {
        self.and_node(null_check(column, false))
    }

    pub fn or_is_not_null(self, column: &str) -> Self {
        self.or_node(null_check(column, false))
    }

    // combining filters -----------------------------------------------------

    /// Merges another filter's condition tree into this one with AND.
    /// An empty argument leaves this filter unchanged.
    pub fn and(mut self, other: Filter) -> Self {
        if let Some(node) = other.top {
            self.merge(LogicalOp::And, node);
        }
        self
    }

    /// Merges another filter's condition tree into this one with OR.
    /// An empty argument leaves this filter unchanged.
    pub fn or(mut self, other: Filter) -> Self {
        if let Some(node) = other.top {
            self.merge(LogicalOp::Or, node);
        }
        self
    }

    /// AND-merges every filter in the collection, skipping empty ones.
    pub fn and_all(self, others: impl IntoIterator<Item = Filter>) -> Self {
        others.into_iter().fold(self, Filter::and)
    }

    /// OR-merges every filter in the collection, skipping empty ones.
    pub fn or_all(self, others: impl IntoIterator<Item = Filter>) -> Self {
        others.into_iter().fold(self, Filter::or)
    }

    // rendering -------------------------------------------------------------

    /// Whether any condition has been added, and hence whether rendering
    /// yields a non-empty string.
    pub fn has_expression(&self) -> bool {
        self.top.is_some()
    }

    /// The where clause without the leading `where` keyword. For the full
    /// clause use the `Display` rendering.
    pub fn expression_string(&self) -> String {
        match &self.top {
            None => String::new(),
            Some(node) => {
                let mut r = Renderer::new();
                node.render(&mut r);
                r.finish()
            }
        }
    }

    // internals -------------------------------------------------------------

    fn and_node(mut self, condition: ConditionNode) -> Self {
        self.merge(LogicalOp::And, condition);
        self
    }

    fn or_node(mut self, condition: ConditionNode) -> Self {
        self.merge(LogicalOp::Or, condition);
        self
    }

    /// Merges a condition under the desired logical operator. A top node
    /// already combining with that operator gains the condition as one more
    /// sibling; otherwise the old top is pushed down beside the new
    /// condition under a fresh logical node.
    fn merge(&mut self, desired: LogicalOp, condition: ConditionNode) {
        self.top = Some(match self.top.take() {
            None => condition,
            Some(ConditionNode::Logical { op, mut children }) if op == desired => {
                children.push(condition);
                ConditionNode::Logical { op, children }
            }
            Some(existing) => ConditionNode::Logical {
                op: desired,
                children: vec![existing, condition],
            },
        });
    }
}

/// Renders as `where <conditions>`, or as the empty string when no
/// conditions have been added.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_expression() {
            return Ok(());
        }
        write!(f, "where {}", self.expression_string())
    }
}

/// Two filters are equal when they render to the same expression text,
/// regardless of how either was assembled.
impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.expression_string() == other.expression_string()
    }
}

impl Eq for Filter {}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.expression_string().hash(state);
    }
}

fn comparison(column: &str, op: CompareOp, value: impl Into<Value>) -> ConditionNode {
    ConditionNode::Comparison {
        column: Ident::new(column),
        op,
        value: value.into(),
    }
}

fn like_condition(column: &str, pattern: String) -> ConditionNode {
    comparison(column, CompareOp::Like, pattern)
}

fn null_check(column: &str, want_null: bool) -> ConditionNode {
    ConditionNode::NullCheck {
        column: Ident::new(column),
        want_null,
    }
}

fn csv_condition(column: &str, value: &str) -> ConditionNode {
    ConditionNode::Logical {
        op: LogicalOp::Or,
        children: vec![
            comparison(column, CompareOp::Eq, value),
            like_condition(column, format!("{value},%")),
            like_condition(column, format!("%,{value}")),
            like_condition(column, format!("%,{value},%")),
        ],
    }
}
