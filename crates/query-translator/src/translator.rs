//! Walks a query expression tree and emits SQL fragments.

use crate::ast::expr::Expression;
use crate::ast::operator::{BinaryOperator, UnaryOperator};
use crate::error::{Result, TranslateError};
use model::{ColumnMapping, Value};
use tracing::{debug, trace};

/// Translates a query expression tree into a where clause, an order-by
/// list, and skip/take pagination values.
///
/// One translator handles one query chain. [`translate`](Self::translate)
/// returns the where clause; the ordering and pagination discovered during
/// the same walk stay readable through the accessors afterwards.
#[derive(Debug, Default)]
pub struct Translator {
    sql: String,
    where_clause: String,
    order_by: String,
    skip: Option<i64>,
    take: Option<i64>,
    mapping: Option<ColumnMapping>,
}

impl Translator {
    /// A translator that passes field names through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// A translator resolving field names through the given mapping.
    pub fn with_mapping(mapping: ColumnMapping) -> Self {
        Self {
            mapping: Some(mapping),
            ..Self::default()
        }
    }

    /// Walks the expression once and returns the rendered where clause.
    ///
    /// The binary render rule wraps the whole clause in one redundant pair
    /// of parentheses; the outer pair is stripped before the clause is
    /// retained. An expression carrying no predicate (ordering or
    /// pagination only) yields an empty clause.
    pub fn translate(&mut self, expression: &Expression) -> Result<&str> {
        self.sql.clear();
        self.visit(expression)?;

        let mut inner = self.sql.chars();
        inner.next();
        inner.next_back();
        self.where_clause = inner.as_str().to_string();

        debug!(
            "translated expression: where=[{}], order_by=[{}]",
            self.where_clause, self.order_by
        );
        Ok(&self.where_clause)
    }

    /// The where clause produced by the last [`translate`](Self::translate).
    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// Comma-joined `COLUMN DIRECTION` pairs, in the order they were
    /// discovered while walking the chain.
    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn skip(&self) -> Option<i64> {
        self.skip
    }

    pub fn take(&self) -> Option<i64> {
        self.take
    }

    fn visit(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Source => Ok(()),
            Expression::Constant(value) => self.visit_constant(value),
            Expression::Member { on_parameter, name } => self.visit_member(*on_parameter, name),
            Expression::Unary { op, operand } => self.visit_unary(*op, operand),
            Expression::Binary { left, op, right } => self.visit_binary(left, *op, right),
            Expression::Call {
                method,
                target,
                args,
            } => self.visit_call(method, target.as_deref(), args),
        }
    }

    fn visit_call(
        &mut self,
        method: &str,
        target: Option<&Expression>,
        args: &[Expression],
    ) -> Result<()> {
        match method {
            // A filter step: descend through the data source first, then
            // translate the predicate against it. The call itself emits
            // nothing.
            "Where" => {
                if let [source, predicate] = args {
                    self.visit(source)?;
                    return self.visit(predicate);
                }
            }

            "StartsWith" | "EndsWith" | "Contains" => {
                if let (
                    Some(Expression::Member {
                        on_parameter: true,
                        name,
                    }),
                    [Expression::Constant(value)],
                ) = (target, args)
                {
                    let text = value.raw_text();
                    let pattern = match method {
                        "StartsWith" => format!("{text}%"),
                        "EndsWith" => format!("%{text}"),
                        _ => format!("%{text}%"),
                    };
                    let column = self.map_field(name);
                    self.sql.push_str(&format!("({column} like '{pattern}')"));
                    return Ok(());
                }
            }

            "Take" | "Skip" => {
                if let [upstream, Expression::Constant(Value::Int(count))] = args {
                    if method == "Take" {
                        self.take = Some(*count);
                    } else {
                        self.skip = Some(*count);
                    }
                    trace!("recorded {}({})", method, count);
                    return self.visit(upstream);
                }
            }

            "OrderBy" | "ThenBy" => return self.visit_ordering(method, args, "ASC"),
            "OrderByDescending" | "ThenByDescending" => {
                return self.visit_ordering(method, args, "DESC");
            }

            _ => {}
        }

        Err(TranslateError::UnsupportedMethod(method.to_string()))
    }

    /// Appends the ordering key for this call, then descends into the
    /// upstream chain. The outermost node of a chain is the last operator
    /// chained onto it, so the accumulated list ends up in the reverse of
    /// chaining order.
    fn visit_ordering(&mut self, method: &str, args: &[Expression], direction: &str) -> Result<()> {
        let [upstream, Expression::Member { name, .. }] = args else {
            return Err(TranslateError::UnsupportedMethod(method.to_string()));
        };

        let column = self.map_field(name);
        if self.order_by.is_empty() {
            self.order_by = format!("{column} {direction}");
        } else {
            self.order_by = format!("{}, {column} {direction}", self.order_by);
        }

        self.visit(upstream)
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Expression) -> Result<()> {
        match op {
            UnaryOperator::Not => {
                self.sql.push_str(" NOT ");
                self.visit(operand)
            }
            UnaryOperator::Cast => self.visit(operand),
            UnaryOperator::Negate => Err(TranslateError::UnsupportedUnaryOperator(op)),
        }
    }

    fn visit_binary(
        &mut self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> Result<()> {
        self.sql.push('(');
        self.visit(left)?;

        let symbol = match op {
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
            BinaryOperator::Equal => {
                if is_null_constant(right) {
                    " IS "
                } else {
                    " = "
                }
            }
            BinaryOperator::NotEqual => {
                if is_null_constant(right) {
                    " IS NOT "
                } else {
                    " <> "
                }
            }
            BinaryOperator::LessThan => " < ",
            BinaryOperator::LessOrEqual => " <= ",
            BinaryOperator::GreaterThan => " > ",
            BinaryOperator::GreaterOrEqual => " >= ",
            other => return Err(TranslateError::UnsupportedBinaryOperator(other)),
        };
        self.sql.push_str(symbol);

        self.visit(right)?;
        self.sql.push(')');
        Ok(())
    }

    fn visit_constant(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.sql.push_str("NULL"),
            Value::Boolean(v) => self.sql.push(if *v { '1' } else { '0' }),
            // Quoted verbatim; embedded quotes are not doubled on this path.
            Value::String(v) => {
                self.sql.push('\'');
                self.sql.push_str(v);
                self.sql.push('\'');
            }
            Value::Timestamp(_) => {
                self.sql.push_str(&format!(
                    "TO_DATE('{}', 'MM/DD/YYYY HH:MI:SS AM')",
                    value.raw_text()
                ));
            }
            Value::Json(v) => {
                return Err(TranslateError::UnsupportedConstant(v.to_string()));
            }
            Value::Int(v) => self.sql.push_str(&v.to_string()),
            Value::Float(v) => self.sql.push_str(&v.to_string()),
        }
        Ok(())
    }

    fn visit_member(&mut self, on_parameter: bool, name: &str) -> Result<()> {
        if !on_parameter {
            return Err(TranslateError::UnsupportedMember(name.to_string()));
        }
        let column = self.map_field(name);
        self.sql.push_str(&column);
        Ok(())
    }

    fn map_field(&self, field: &str) -> String {
        match &self.mapping {
            Some(mapping) => mapping.resolve(field).to_string(),
            None => field.to_string(),
        }
    }
}

fn is_null_constant(expression: &Expression) -> bool {
    matches!(expression, Expression::Constant(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn sample_mapping() -> ColumnMapping {
        [
            ("Name", "NAME_COLUMN"),
            ("Description", "DESCRIPTION_COLUMN"),
            ("Count", "COUNT_COLUMN"),
            ("CurrentDate", "CURRENT_DATE"),
            ("IsReady", "IS_READY"),
        ]
        .into_iter()
        .collect()
    }

    fn feb_19_2015() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 2, 19)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn compare(field: &str, op: BinaryOperator, value: impl Into<Value>) -> Expression {
        Expression::binary(Expression::member(field), op, Expression::constant(value))
    }

    fn where_call(source: Expression, predicate: Expression) -> Expression {
        Expression::call("Where", None, vec![source, predicate])
    }

    fn order_call(method: &str, source: Expression, field: &str) -> Expression {
        Expression::call(method, None, vec![source, Expression::member(field)])
    }

    fn page_call(method: &str, source: Expression, count: i64) -> Expression {
        Expression::call(method, None, vec![source, Expression::constant(count)])
    }

    fn match_call(method: &str, field: &str, text: &str) -> Expression {
        Expression::call(
            method,
            Some(Expression::member(field)),
            vec![Expression::constant(text)],
        )
    }

    #[test]
    fn equal_to_string_without_mapping() {
        let predicate = compare("Name", BinaryOperator::Equal, "Test");

        let mut translator = Translator::new();
        let clause = translator.translate(&predicate).unwrap();

        assert_eq!(clause, "Name = 'Test'");
    }

    #[test]
    fn equal_to_string_with_mapping() {
        let predicate = compare("Name", BinaryOperator::Equal, "Test");

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&predicate).unwrap();

        assert_eq!(translator.where_clause(), "NAME_COLUMN = 'Test'");
    }

    #[test]
    fn boolean_constants_render_as_one_and_zero() {
        let mut translator = Translator::with_mapping(sample_mapping());
        translator
            .translate(&compare("IsReady", BinaryOperator::Equal, true))
            .unwrap();
        assert_eq!(translator.where_clause(), "IS_READY = 1");

        let mut translator = Translator::with_mapping(sample_mapping());
        translator
            .translate(&compare("IsReady", BinaryOperator::Equal, false))
            .unwrap();
        assert_eq!(translator.where_clause(), "IS_READY = 0");
    }

    #[test]
    fn datetime_constants_render_as_to_date() {
        let mut translator = Translator::with_mapping(sample_mapping());
        translator
            .translate(&compare(
                "CurrentDate",
                BinaryOperator::GreaterThan,
                feb_19_2015(),
            ))
            .unwrap();
        assert_eq!(
            translator.where_clause(),
            "CURRENT_DATE > TO_DATE('2/19/2015 12:00:00 AM', 'MM/DD/YYYY HH:MI:SS AM')"
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator
            .translate(&compare(
                "CurrentDate",
                BinaryOperator::LessOrEqual,
                feb_19_2015(),
            ))
            .unwrap();
        assert_eq!(
            translator.where_clause(),
            "CURRENT_DATE <= TO_DATE('2/19/2015 12:00:00 AM', 'MM/DD/YYYY HH:MI:SS AM')"
        );
    }

    #[test]
    fn integer_comparisons() {
        let cases = [
            (BinaryOperator::GreaterThan, "COUNT_COLUMN > 20"),
            (BinaryOperator::GreaterOrEqual, "COUNT_COLUMN >= 20"),
            (BinaryOperator::LessThan, "COUNT_COLUMN < 20"),
            (BinaryOperator::LessOrEqual, "COUNT_COLUMN <= 20"),
        ];

        for (op, expected) in cases {
            let mut translator = Translator::with_mapping(sample_mapping());
            translator.translate(&compare("Count", op, 20)).unwrap();
            assert_eq!(translator.where_clause(), expected);
        }
    }

    #[test]
    fn float_constants_render_bare() {
        let mut translator = Translator::new();
        translator
            .translate(&compare("Ratio", BinaryOperator::GreaterThan, 1.5))
            .unwrap();
        assert_eq!(translator.where_clause(), "Ratio > 1.5");
    }

    #[test]
    fn starts_with_renders_prefix_pattern() {
        let expression = where_call(
            Expression::Source,
            match_call("StartsWith", "Description", "start of"),
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.where_clause(),
            "DESCRIPTION_COLUMN like 'start of%'"
        );
    }

    #[test]
    fn ends_with_renders_suffix_pattern() {
        let expression = where_call(
            Expression::Source,
            match_call("EndsWith", "Description", "end of"),
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.where_clause(),
            "DESCRIPTION_COLUMN like '%end of'"
        );
    }

    #[test]
    fn contains_renders_substring_pattern() {
        let expression = where_call(
            Expression::Source,
            match_call("Contains", "Description", "contains this"),
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.where_clause(),
            "DESCRIPTION_COLUMN like '%contains this%'"
        );
    }

    #[test]
    fn string_match_requires_member_target_and_constant_argument() {
        let bad_target = Expression::call(
            "StartsWith",
            Some(Expression::constant("Description")),
            vec![Expression::constant("x")],
        );
        let err = Translator::new().translate(&bad_target).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMethod(ref m) if m == "StartsWith"));

        let bad_argument = Expression::call(
            "Contains",
            Some(Expression::member("Description")),
            vec![Expression::member("Name")],
        );
        let err = Translator::new().translate(&bad_argument).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMethod(ref m) if m == "Contains"));
    }

    #[test]
    fn order_by_single_ascending() {
        let expression = order_call("OrderBy", Expression::Source, "Name");

        let mut translator = Translator::with_mapping(sample_mapping());
        let clause = translator.translate(&expression).unwrap();

        assert_eq!(clause, "");
        assert_eq!(translator.order_by(), "NAME_COLUMN ASC");
    }

    #[test]
    fn order_by_single_descending() {
        let expression = order_call("OrderByDescending", Expression::Source, "Description");

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(translator.order_by(), "DESCRIPTION_COLUMN DESC");
    }

    #[test]
    fn order_by_lists_keys_in_reverse_of_chaining_order() {
        // Chained as Description desc, Name desc, Count desc.
        let expression = order_call(
            "ThenByDescending",
            order_call(
                "ThenByDescending",
                order_call("OrderByDescending", Expression::Source, "Description"),
                "Name",
            ),
            "Count",
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.order_by(),
            "COUNT_COLUMN DESC, NAME_COLUMN DESC, DESCRIPTION_COLUMN DESC"
        );
    }

    #[test]
    fn order_by_multiple_ascending_reverses_too() {
        let expression = order_call(
            "ThenBy",
            order_call(
                "ThenBy",
                order_call("OrderBy", Expression::Source, "Description"),
                "Name",
            ),
            "Count",
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.order_by(),
            "COUNT_COLUMN ASC, NAME_COLUMN ASC, DESCRIPTION_COLUMN ASC"
        );
    }

    #[test]
    fn order_by_mixed_directions() {
        // Chained as Description desc, Name asc.
        let expression = order_call(
            "ThenBy",
            order_call("OrderByDescending", Expression::Source, "Description"),
            "Name",
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&expression).unwrap();

        assert_eq!(
            translator.order_by(),
            "NAME_COLUMN ASC, DESCRIPTION_COLUMN DESC"
        );
    }

    #[test]
    fn order_by_requires_a_member_key() {
        let expression = Expression::call(
            "OrderBy",
            None,
            vec![Expression::Source, Expression::constant(1)],
        );

        let err = Translator::new().translate(&expression).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMethod(ref m) if m == "OrderBy"));
    }

    #[test]
    fn skip_and_take_are_recorded_without_emitting_text() {
        let chain = page_call(
            "Take",
            page_call(
                "Skip",
                where_call(
                    Expression::Source,
                    compare("Count", BinaryOperator::GreaterThan, 20),
                ),
                40,
            ),
            10,
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&chain).unwrap();

        assert_eq!(translator.take(), Some(10));
        assert_eq!(translator.skip(), Some(40));
        assert_eq!(translator.where_clause(), "COUNT_COLUMN > 20");
    }

    #[test]
    fn take_requires_a_constant_count() {
        let expression = Expression::call(
            "Take",
            None,
            vec![Expression::Source, Expression::member("Count")],
        );

        let err = Translator::new().translate(&expression).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMethod(ref m) if m == "Take"));
    }

    #[test]
    fn logical_combination_with_not() {
        let predicate = Expression::binary(
            Expression::not(compare("Name", BinaryOperator::Equal, "Test")),
            BinaryOperator::And,
            compare("Count", BinaryOperator::GreaterThan, 20),
        );

        let mut translator = Translator::new();
        translator.translate(&predicate).unwrap();

        assert_eq!(
            translator.where_clause(),
            " NOT (Name = 'Test') AND (Count > 20)"
        );
    }

    #[test]
    fn cast_nodes_are_transparent() {
        let predicate = Expression::binary(
            Expression::unary(UnaryOperator::Cast, Expression::member("IsReady")),
            BinaryOperator::Equal,
            Expression::constant(true),
        );

        let mut translator = Translator::with_mapping(sample_mapping());
        translator.translate(&predicate).unwrap();

        assert_eq!(translator.where_clause(), "IS_READY = 1");
    }

    #[test]
    fn null_comparisons_render_as_is_and_is_not() {
        let mut translator = Translator::new();
        translator
            .translate(&compare("Name", BinaryOperator::Equal, Value::Null))
            .unwrap();
        assert_eq!(translator.where_clause(), "Name IS NULL");

        let mut translator = Translator::new();
        translator
            .translate(&compare("Name", BinaryOperator::NotEqual, Value::Null))
            .unwrap();
        assert_eq!(translator.where_clause(), "Name IS NOT NULL");
    }

    #[test]
    fn string_constant_is_not_escaped() {
        // Unlike the fluent filter path, embedded quotes pass through
        // untouched here.
        let predicate = compare("Name", BinaryOperator::Equal, "ab'cd");

        let mut translator = Translator::new();
        translator.translate(&predicate).unwrap();

        assert_eq!(translator.where_clause(), "Name = 'ab'cd'");
    }

    #[test]
    fn unknown_method_is_rejected_by_name() {
        let expression = Expression::call("Reverse", None, vec![Expression::Source]);

        let err = Translator::new().translate(&expression).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMethod(ref m) if m == "Reverse"));
        assert_eq!(err.to_string(), "the method 'Reverse' is not supported");
    }

    #[test]
    fn arithmetic_binary_operator_is_rejected() {
        let predicate = Expression::binary(
            Expression::member("Count"),
            BinaryOperator::Add,
            Expression::constant(1),
        );

        let err = Translator::new().translate(&predicate).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedBinaryOperator(BinaryOperator::Add)
        ));
    }

    #[test]
    fn negation_unary_operator_is_rejected() {
        let predicate = Expression::unary(UnaryOperator::Negate, Expression::member("Count"));

        let err = Translator::new().translate(&predicate).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedUnaryOperator(UnaryOperator::Negate)
        ));
    }

    #[test]
    fn nested_member_access_is_rejected() {
        let nested = Expression::Member {
            on_parameter: false,
            name: "Owner".to_string(),
        };
        let predicate = Expression::binary(nested, BinaryOperator::Equal, Expression::constant(1));

        let err = Translator::new().translate(&predicate).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedMember(ref m) if m == "Owner"));
    }

    #[test]
    fn structured_constant_is_rejected() {
        let predicate = compare("Payload", BinaryOperator::Equal, json!({"a": 1}));

        let err = Translator::new().translate(&predicate).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedConstant(_)));
    }

    #[test]
    fn source_alone_yields_an_empty_clause() {
        let mut translator = Translator::new();
        let clause = translator.translate(&Expression::Source).unwrap();
        assert_eq!(clause, "");
    }

    #[test]
    fn where_clause_is_retained_across_reads() {
        let predicate = compare("Name", BinaryOperator::Equal, "Test");

        let mut translator = Translator::new();
        let returned = translator.translate(&predicate).unwrap().to_string();

        assert_eq!(translator.where_clause(), returned);
    }
}
