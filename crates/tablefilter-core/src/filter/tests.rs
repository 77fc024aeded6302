use crate::{
    error::{FilterError, FilterErrorKind, OperandError, RangeBound},
    filter::{
        Condition, FilterFold, Operand, Operator, fold_filter, is_reserved_token, operators_for,
        supports_operator,
    },
    schema::{FieldDef, FieldType, TableSchema},
    value::{CoercionError, Record, Scalar, Value},
};
use serde_json::json;

///
/// Trace
///
/// Fold that renders the walk as a parenthesized string.
///

struct Trace;

impl FilterFold for Trace {
    type Output = String;

    fn leaf(&mut self, condition: Condition<'_>) -> Result<String, FilterError> {
        Ok(format!(
            "{} {} {}",
            condition.field, condition.operator, condition.value
        ))
    }

    fn and(&mut self, left: String, right: String) -> Option<String> {
        Some(format!("({left} AND {right})"))
    }

    fn or(&mut self, left: String, right: String) -> Option<String> {
        Some(format!("({left} OR {right})"))
    }

    fn not(&mut self, inner: String) -> String {
        format!("NOT {inner}")
    }
}

fn trace(filter: serde_json::Value) -> Result<Option<String>, FilterError> {
    let filter = Value::try_from(filter).expect("filter fixture");
    fold_filter(Some(&filter), 64, &mut Trace)
}

fn trace_kind(filter: serde_json::Value) -> FilterErrorKind {
    trace(filter).expect_err("filter should be rejected").kind()
}

fn schema() -> TableSchema {
    TableSchema::new(
        "transaction",
        [
            FieldDef::new("amount", FieldType::Float),
            FieldDef::new("id", FieldType::Int),
            FieldDef::new("name", FieldType::String),
            FieldDef::new("date", FieldType::Timestamp),
            FieldDef::new("active", FieldType::Bool),
        ],
    )
    .expect("schema")
}

fn record(value: serde_json::Value) -> Record {
    let serde_json::Value::Object(object) = value else {
        panic!("record fixture must be an object");
    };
    crate::value::record_from_json(object).expect("record fixture")
}

// ---------------------------------------------------------------------
// grammar
// ---------------------------------------------------------------------

#[test]
fn absent_and_empty_filters_are_universal() {
    assert_eq!(fold_filter(None, 64, &mut Trace), Ok(None));
    assert_eq!(fold_filter(Some(&Value::Null), 64, &mut Trace), Ok(None));
    assert_eq!(trace(json!([])), Ok(None));
}

#[test]
fn non_array_filters_are_rejected() {
    assert_eq!(
        trace(json!("amount")),
        Err(FilterError::InvalidExpressionShape { found: "text" })
    );
    assert_eq!(
        trace_kind(json!([["amount", "=", 1], "and", 5])),
        FilterErrorKind::InvalidExpressionShape
    );
}

#[test]
fn leaf_passes_raw_parts_through() {
    assert_eq!(
        trace(json!(["Amount", "EQUALS", 100])),
        Ok(Some("Amount EQUALS 100".to_string()))
    );
}

#[test]
fn chain_folds_left_to_right_without_precedence() {
    let out = trace(json!([
        ["a", "=", 1],
        "or",
        ["b", "=", 2],
        "AND",
        ["c", "=", 3]
    ]))
    .expect("valid chain");

    assert_eq!(
        out.as_deref(),
        Some("((a = 1 OR b = 2) AND c = 3)")
    );
}

#[test]
fn nested_groups_keep_their_grouping() {
    let out = trace(json!([
        ["a", "=", 1],
        "or",
        [["b", "=", 2], "and", ["c", "=", 3]]
    ]))
    .expect("valid chain");

    assert_eq!(out.as_deref(), Some("(a = 1 OR (b = 2 AND c = 3))"));
}

#[test]
fn negation_wraps_its_operand() {
    assert_eq!(
        trace(json!(["!", ["a", "=", 1]])),
        Ok(Some("NOT a = 1".to_string()))
    );
    assert_eq!(trace(json!(["!", []])), Ok(None));
}

#[test]
fn malformed_negations_are_rejected() {
    assert_eq!(trace_kind(json!(["!"])), FilterErrorKind::MalformedNot);
    assert_eq!(
        trace_kind(json!(["!", ["a", "=", 1], ["b", "=", 2]])),
        FilterErrorKind::MalformedNot
    );
    assert_eq!(trace_kind(json!(["!", "a"])), FilterErrorKind::MalformedNot);
}

#[test]
fn even_length_chains_are_malformed_groups() {
    assert_eq!(
        trace_kind(json!([["amount", "=", 100], "and"])),
        FilterErrorKind::MalformedGroup
    );
    assert_eq!(trace_kind(json!(["amount", "="])), FilterErrorKind::MalformedGroup);
}

#[test]
fn chain_separators_must_be_and_or() {
    assert_eq!(
        trace(json!([["a", "=", 1], "xor", ["b", "=", 2]])),
        Err(FilterError::InvalidLogicalOperator {
            found: "\"xor\"".to_string()
        })
    );
    assert_eq!(
        trace_kind(json!([["a", "=", 1], 7, ["b", "=", 2]])),
        FilterErrorKind::InvalidLogicalOperator
    );
}

#[test]
fn leaf_operator_must_be_a_string() {
    assert_eq!(
        trace(json!(["amount", 5, 100])),
        Err(FilterError::InvalidOperator { found: "number" })
    );
}

#[test]
fn reserved_heads_never_form_a_leaf() {
    assert!(is_reserved_token("AND"));
    assert!(is_reserved_token("or"));
    assert!(is_reserved_token("!"));
    assert!(!is_reserved_token("andrew"));

    // falls into the chain path, where "and" is not a sub-expression
    assert_eq!(
        trace_kind(json!(["and", "=", true])),
        FilterErrorKind::InvalidExpressionShape
    );
}

#[test]
fn universal_subfilters_follow_neutral_rules() {
    assert_eq!(
        trace(json!([[], "and", ["a", "=", 1]])),
        Ok(Some("a = 1".to_string()))
    );
    assert_eq!(
        trace(json!([["a", "=", 1], "and", []])),
        Ok(Some("a = 1".to_string()))
    );
    assert_eq!(trace(json!([["a", "=", 1], "or", []])), Ok(None));
    assert_eq!(
        trace(json!([[], "or", ["a", "=", 1], "and", ["b", "=", 2]])),
        Ok(Some("b = 2".to_string()))
    );
}

#[test]
fn errors_after_a_universal_branch_still_surface() {
    assert_eq!(
        trace_kind(json!([[], "or", ["a", 1, 1]])),
        FilterErrorKind::InvalidOperator
    );
}

#[test]
fn depth_limit_is_enforced() {
    let mut filter = json!(["a", "=", 1]);
    for _ in 0..10 {
        filter = json!(["!", filter]);
    }
    let filter = Value::try_from(filter).expect("fixture");

    // 10 negations + 1 leaf = 11 levels
    assert!(fold_filter(Some(&filter), 11, &mut Trace).is_ok());
    assert_eq!(
        fold_filter(Some(&filter), 10, &mut Trace),
        Err(FilterError::DepthLimitExceeded { limit: 10 })
    );
}

// ---------------------------------------------------------------------
// operator table
// ---------------------------------------------------------------------

#[test]
fn operator_tokens_are_case_insensitive() {
    assert_eq!(Operator::from_token("Contains"), Some(Operator::Contains));
    assert_eq!(Operator::from_token("NOTCONTAINS"), Some(Operator::NotContains));
    assert_eq!(Operator::from_token("<>"), Some(Operator::Ne));
    assert_eq!(Operator::from_token("!="), None);
}

#[test]
fn operator_table_matches_declared_types() {
    assert!(supports_operator(FieldType::Text, Operator::StartsWith));
    assert!(supports_operator(FieldType::Timestamp, Operator::Between));
    assert!(!supports_operator(FieldType::String, Operator::Gt));
    assert!(!supports_operator(FieldType::Bool, Operator::Lt));
    assert!(!supports_operator(FieldType::Bool, Operator::Between));
    assert!(!supports_operator(FieldType::Int, Operator::Contains));

    let bool_ops: Vec<_> = operators_for(FieldType::Bool).collect();
    assert_eq!(bool_ops, vec![Operator::Eq, Operator::Ne]);
}

#[test]
fn apply_is_undefined_across_domains() {
    assert_eq!(Operator::Gt.apply(&Scalar::Int(2), &Scalar::Int(1)), Some(true));
    assert_eq!(Operator::Gt.apply(&Scalar::Int(2), &Scalar::Float(1.0)), None);
    assert_eq!(
        Operator::NotContains.apply(&Scalar::Text("Alpha".into()), &Scalar::Text("ph".into())),
        Some(false)
    );
}

// ---------------------------------------------------------------------
// condition resolution
// ---------------------------------------------------------------------

fn resolve(field: &str, op: &str, value: serde_json::Value) -> Result<Operand, FilterError> {
    let value = Value::try_from(value).expect("fixture");
    Condition::new(field, op, &value)
        .resolve(&schema())
        .map(|resolved| resolved.operand)
}

#[test]
fn resolution_checks_field_then_operator_then_operand() {
    assert_eq!(
        resolve("nope", "bogus", json!("x")),
        Err(FilterError::UnknownField {
            field: "nope".to_string(),
            entity: "transaction".to_string()
        })
    );
    assert_eq!(
        resolve("name", ">", json!("x")),
        Err(FilterError::UnsupportedOperator {
            operator: ">".to_string(),
            field: "name".to_string(),
            field_type: FieldType::String
        })
    );
    assert_eq!(
        resolve("id", "=", json!("abc")).map_err(|err| err.kind()),
        Err(FilterErrorKind::InvalidOperandType)
    );
}

#[test]
fn resolution_is_case_insensitive_on_field_and_operator() {
    let value = Value::from(100);
    let resolved = Condition::new("AMOUNT", "<=", &value)
        .resolve(&schema())
        .expect("resolves");

    assert_eq!(resolved.field, "AMOUNT");
    assert_eq!(resolved.column, "amount");
    assert_eq!(resolved.operand, Operand::Single(Scalar::Float(100.0)));
}

#[test]
fn fractional_int_operands_are_rejected() {
    assert_eq!(
        resolve("id", "=", json!(1.5)),
        Err(FilterError::InvalidOperandType {
            field: "id".to_string(),
            field_type: FieldType::Int,
            source: OperandError::Coercion(CoercionError::FractionalInt { value: 1.5 }),
        })
    );
}

#[test]
fn between_checks_type_before_shape() {
    assert_eq!(
        resolve("name", "between", json!(1)).map_err(|err| err.kind()),
        Err(FilterErrorKind::UnsupportedOperator)
    );
    assert_eq!(
        resolve("active", "between", json!([true, false])).map_err(|err| err.kind()),
        Err(FilterErrorKind::UnsupportedOperator)
    );
}

#[test]
fn between_requires_two_coercible_bounds() {
    assert!(matches!(
        resolve("amount", "between", json!([100])),
        Err(FilterError::InvalidOperandType {
            source: OperandError::RangeShape { .. },
            ..
        })
    ));
    assert!(matches!(
        resolve("amount", "between", json!(100)),
        Err(FilterError::InvalidOperandType {
            source: OperandError::RangeShape { .. },
            ..
        })
    ));
    assert!(matches!(
        resolve("amount", "between", json!([100, "lots"])),
        Err(FilterError::InvalidOperandType {
            source: OperandError::RangeBound {
                bound: RangeBound::Upper,
                ..
            },
            ..
        })
    ));
    assert_eq!(
        resolve("amount", "between", json!([200, 400])),
        Ok(Operand::Range {
            lower: Scalar::Float(200.0),
            upper: Scalar::Float(400.0)
        })
    );
}

#[test]
fn resolved_leaf_treats_missing_and_uncoercible_cells_as_non_matches() {
    let value = Value::from(100);
    let cond = Condition::new("amount", "<>", &value)
        .resolve(&schema())
        .expect("resolves");

    assert!(cond.matches(&record(json!({"amount": 200}))));
    assert!(!cond.matches(&record(json!({"other": 200}))));
    assert!(!cond.matches(&record(json!({"amount": "n/a"}))));
    assert!(!cond.matches(&record(json!({"amount": null}))));
}

#[test]
fn record_lookup_uses_the_filter_spelling() {
    let value = Value::from(100);
    let cond = Condition::new("Amount", "=", &value)
        .resolve(&schema())
        .expect("resolves");

    assert!(cond.matches(&record(json!({"Amount": 100}))));
    assert!(!cond.matches(&record(json!({"amount": 100}))));
}

#[test]
fn between_is_inclusive_and_never_swaps_bounds() {
    let range = Value::from(vec![200, 400]);
    let cond = Condition::new("amount", "between", &range)
        .resolve(&schema())
        .expect("resolves");

    for (amount, expected) in [(199, false), (200, true), (300, true), (400, true), (401, false)] {
        assert_eq!(
            cond.matches(&record(json!({ "amount": amount }))),
            expected,
            "amount {amount}"
        );
    }

    let reversed = Value::from(vec![200, 100]);
    let cond = Condition::new("amount", "between", &reversed)
        .resolve(&schema())
        .expect("resolves");
    assert!(!cond.matches(&record(json!({"amount": 150}))));
}

#[test]
fn timestamp_cells_are_parsed_with_the_same_layouts() {
    let value = Value::from("2024-01-10");
    let cond = Condition::new("date", ">=", &value)
        .resolve(&schema())
        .expect("resolves");

    assert!(cond.matches(&record(json!({"date": "2024-01-10T00:00:00Z"}))));
    assert!(cond.matches(&record(json!({"date": "2024-01-11T08:00:00"}))));
    assert!(!cond.matches(&record(json!({"date": "2024-01-09"}))));
    assert!(!cond.matches(&record(json!({"date": "yesterday"}))));
}

#[test]
fn bool_cells_accept_string_spellings() {
    let value = Value::from("TRUE");
    let cond = Condition::new("active", "=", &value)
        .resolve(&schema())
        .expect("resolves");

    assert!(cond.matches(&record(json!({"active": true}))));
    assert!(cond.matches(&record(json!({"active": "true"}))));
    assert!(!cond.matches(&record(json!({"active": false}))));
}
