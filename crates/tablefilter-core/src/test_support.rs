//! Test-only helpers: JSON fixtures and a reference interpreter for SQL predicates.

use crate::{
    predicate::{SqlCompare, SqlOp, SqlPredicate},
    schema::FieldType,
    value::{Record, Scalar, TextMode, Value, coerce, record_from_json},
};
use time::{Duration, Time, format_description::well_known::Rfc3339, macros::datetime};

const LOCATIONS: [&str; 5] = ["Testville", "Sampleburg", "Demo City", "Alpha Town", "Beta Village"];
const CATEGORIES: [&str; 5] = ["Test Cat A", "Sample Cat B", "Demo Cat C", "Alpha Cat D", "Beta Cat E"];
const TYPES: [&str; 2] = ["Test Debit", "Sample Credit"];

/// Convert a JSON fixture into a filter value.
pub(crate) fn filter(json: serde_json::Value) -> Value {
    Value::try_from(json).expect("filter fixture")
}

/// Convert a JSON object fixture into a record.
pub(crate) fn record(json: serde_json::Value) -> Record {
    let serde_json::Value::Object(object) = json else {
        panic!("record fixture must be an object");
    };

    record_from_json(object).expect("record fixture")
}

/// The seeded transaction set: amount cycles 100..=1000, one row per day.
pub(crate) fn transactions(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let part = |n: usize| u8::try_from(n).expect("time component fits u8");
            let day = datetime!(2024-01-01 0:00 UTC)
                + Duration::days(i64::try_from(i).expect("day offset"));
            let at = day.replace_time(
                Time::from_hms(part(i % 24), part((i * 13) % 60), part((i * 7) % 60))
                    .expect("valid time"),
            );

            record(serde_json::json!({
                "id": i + 1,
                "date": at.format(&Rfc3339).expect("rfc3339"),
                "amount": (i % 10 + 1) * 100,
                "name": format!("Test Trans {i}"),
                "location": LOCATIONS[i % LOCATIONS.len()],
                "category": CATEGORIES[i % CATEGORIES.len()],
                "type": TYPES[i % TYPES.len()],
            }))
        })
        .collect()
}

/// Reference engine: would a SQL store select `record` for `predicate`?
///
/// Uses SQL three-valued logic; a missing or uncoercible column is NULL.
pub(crate) fn sql_selects(predicate: &SqlPredicate, record: &Record) -> bool {
    eval3(predicate, record) == Some(true)
}

fn eval3(predicate: &SqlPredicate, record: &Record) -> Option<bool> {
    match predicate {
        SqlPredicate::Compare(cmp) => compare(cmp, record),
        SqlPredicate::And(children) => {
            let mut unknown = false;
            for child in children {
                match eval3(child, record) {
                    Some(false) => return Some(false),
                    None => unknown = true,
                    Some(true) => {}
                }
            }
            if unknown { None } else { Some(true) }
        }
        SqlPredicate::Or(children) => {
            let mut unknown = false;
            for child in children {
                match eval3(child, record) {
                    Some(true) => return Some(true),
                    None => unknown = true,
                    Some(false) => {}
                }
            }
            if unknown { None } else { Some(false) }
        }
        SqlPredicate::Not(inner) => eval3(inner, record).map(|b| !b),
    }
}

fn compare(cmp: &SqlCompare, record: &Record) -> Option<bool> {
    let cell = record.get(&cmp.column)?;
    let domain = if cmp.op.is_fold() {
        FieldType::String
    } else {
        domain_of(&cmp.arg)
    };
    let cell = coerce(cell, domain).ok()?;
    let arg = &cmp.arg;

    match cmp.op {
        SqlOp::Eq => cell.equals(arg),
        SqlOp::Ne => cell.equals(arg).map(|eq| !eq),
        SqlOp::Gt => cell.compare(arg).map(std::cmp::Ordering::is_gt),
        SqlOp::Gte => cell.compare(arg).map(std::cmp::Ordering::is_ge),
        SqlOp::Lt => cell.compare(arg).map(std::cmp::Ordering::is_lt),
        SqlOp::Lte => cell.compare(arg).map(std::cmp::Ordering::is_le),
        SqlOp::EqFold => cell.equals(arg),
        SqlOp::NeFold => cell.equals(arg).map(|eq| !eq),
        SqlOp::ContainsFold => cell.text_contains(arg, TextMode::Ci),
        SqlOp::HasPrefixFold => cell.text_starts_with(arg, TextMode::Ci),
        SqlOp::HasSuffixFold => cell.text_ends_with(arg, TextMode::Ci),
    }
}

const fn domain_of(arg: &Scalar) -> FieldType {
    match arg {
        Scalar::Bool(_) => FieldType::Bool,
        Scalar::Float(_) => FieldType::Float,
        Scalar::Int(_) => FieldType::Int,
        Scalar::Text(_) => FieldType::String,
        Scalar::Timestamp(_) => FieldType::Timestamp,
    }
}
