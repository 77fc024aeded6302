//! Module: predicate::sql
//! Responsibility: the SQL predicate handle produced by entity adapters.
//! Does not own: query execution or connection handling.
//! Boundary: rendered as a parameterized WHERE fragment; values never inlined.

use crate::value::Scalar;
use derive_more::Display;
use std::fmt;

///
/// SqlOp
///
/// Comparison emitted for one column. `*Fold` variants compare the
/// lower-cased column against an already lower-cased argument.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum SqlOp {
    #[display("=")]
    Eq,
    #[display("<>")]
    Ne,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display("EQ_FOLD")]
    EqFold,
    #[display("NE_FOLD")]
    NeFold,
    #[display("CONTAINS_FOLD")]
    ContainsFold,
    #[display("PREFIX_FOLD")]
    HasPrefixFold,
    #[display("SUFFIX_FOLD")]
    HasSuffixFold,
}

impl SqlOp {
    #[must_use]
    pub const fn is_fold(self) -> bool {
        matches!(
            self,
            Self::EqFold | Self::NeFold | Self::ContainsFold | Self::HasPrefixFold | Self::HasSuffixFold
        )
    }
}

///
/// SqlCompare
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlCompare {
    pub column: String,
    pub op: SqlOp,
    pub arg: Scalar,
}

///
/// SqlPredicate
///
/// Composite WHERE-clause predicate. `And` / `Or` always hold two or
/// more children; adapters pass single operands through unwrapped.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SqlPredicate {
    Compare(SqlCompare),
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
}

impl SqlPredicate {
    #[must_use]
    pub fn compare(column: impl Into<String>, op: SqlOp, arg: Scalar) -> Self {
        Self::Compare(SqlCompare {
            column: column.into(),
            op,
            arg,
        })
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Render as `(sql, args)` with `?` placeholders in argument order.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<Scalar>) {
        let mut sql = String::new();
        let mut args = Vec::new();
        self.render(&mut sql, &mut args);

        (sql, args)
    }

    fn render(&self, sql: &mut String, args: &mut Vec<Scalar>) {
        match self {
            Self::Compare(cmp) => render_compare(cmp, sql, args),
            Self::And(children) => render_junction(children, " AND ", sql, args),
            Self::Or(children) => render_junction(children, " OR ", sql, args),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, args);
                sql.push(')');
            }
        }
    }
}

impl fmt::Display for SqlPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql().0)
    }
}

fn render_junction(children: &[SqlPredicate], sep: &str, sql: &mut String, args: &mut Vec<Scalar>) {
    sql.push('(');
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        child.render(sql, args);
    }
    sql.push(')');
}

fn render_compare(cmp: &SqlCompare, sql: &mut String, args: &mut Vec<Scalar>) {
    let column = quote_ident(&cmp.column);

    match cmp.op {
        SqlOp::Eq | SqlOp::Ne | SqlOp::Gt | SqlOp::Gte | SqlOp::Lt | SqlOp::Lte => {
            sql.push_str(&format!("{column} {} ?", cmp.op));
            args.push(cmp.arg.clone());
        }
        SqlOp::EqFold => {
            sql.push_str(&format!("LOWER({column}) = ?"));
            args.push(cmp.arg.clone());
        }
        SqlOp::NeFold => {
            sql.push_str(&format!("LOWER({column}) <> ?"));
            args.push(cmp.arg.clone());
        }
        SqlOp::ContainsFold | SqlOp::HasPrefixFold | SqlOp::HasSuffixFold => {
            let needle = match &cmp.arg {
                Scalar::Text(text) => escape_like(text),
                other => escape_like(&other.to_string()),
            };
            let pattern = match cmp.op {
                SqlOp::HasPrefixFold => format!("{needle}%"),
                SqlOp::HasSuffixFold => format!("%{needle}"),
                _ => format!("%{needle}%"),
            };

            sql.push_str(&format!("LOWER({column}) LIKE ? ESCAPE '\\'"));
            args.push(Scalar::Text(pattern));
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }

    out
}
