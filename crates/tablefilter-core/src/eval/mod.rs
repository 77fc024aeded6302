//! Module: eval
//! Responsibility: in-memory evaluation of filters over record sets.
//! Does not own: the grammar (see `filter`) or where records come from.
//! Boundary: compiles a filter once per schema, then evaluates per record without errors.


use crate::{
    MAX_FILTER_DEPTH,
    error::FilterError,
    filter::{Condition, FilterFold, ResolvedCondition, fold_filter},
    obs::sink::{self, MetricsEvent},
    schema::TableSchema,
    value::{Record, Value},
};

///
/// RecordFilter
///
/// A filter resolved against one schema. Field names, operators and
/// operands are checked up front so evaluation itself cannot fail.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RecordFilter {
    entity: String,
    root: Option<Node>,
}

impl RecordFilter {
    /// Compile with the default nesting limit.
    pub fn compile(schema: &TableSchema, filter: Option<&Value>) -> Result<Self, FilterError> {
        Self::compile_with_depth(schema, filter, MAX_FILTER_DEPTH)
    }

    pub fn compile_with_depth(
        schema: &TableSchema,
        filter: Option<&Value>,
        max_depth: usize,
    ) -> Result<Self, FilterError> {
        let entity = schema.entity_name();

        match fold_filter(filter, max_depth, &mut Compile { schema }) {
            Ok(root) => {
                sink::record(MetricsEvent::FilterCompiled { entity });

                Ok(Self {
                    entity: entity.to_string(),
                    root,
                })
            }
            Err(err) => {
                sink::record(MetricsEvent::FilterRejected {
                    entity,
                    kind: err.kind(),
                });

                Err(err)
            }
        }
    }

    /// True when the filter matches every record.
    #[must_use]
    pub const fn is_universal(&self) -> bool {
        self.root.is_none()
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.root.as_ref().is_none_or(|node| node.eval(record))
    }

    /// Keep matching records, preserving their relative order.
    #[must_use]
    pub fn filter_records(&self, records: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut scanned = 0u64;
        let kept: Vec<Record> = records
            .into_iter()
            .inspect(|_| scanned += 1)
            .filter(|record| self.matches(record))
            .collect();

        sink::record(MetricsEvent::RecordsEvaluated {
            entity: &self.entity,
            scanned,
            matched: kept.len() as u64,
        });

        kept
    }

    /// Borrowing variant of [`Self::filter_records`].
    #[must_use]
    pub fn select<'r>(&self, records: &'r [Record]) -> Vec<&'r Record> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Evaluate `filter` against a single record.
pub fn evaluate(
    schema: &TableSchema,
    filter: Option<&Value>,
    record: &Record,
) -> Result<bool, FilterError> {
    RecordFilter::compile(schema, filter).map(|compiled| compiled.matches(record))
}

/// Filter a record set, preserving relative order.
pub fn filter_records(
    schema: &TableSchema,
    filter: Option<&Value>,
    records: Vec<Record>,
) -> Result<Vec<Record>, FilterError> {
    RecordFilter::compile(schema, filter).map(|compiled| compiled.filter_records(records))
}

///
/// Node
///

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Leaf(ResolvedCondition),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
}

impl Node {
    fn eval(&self, record: &Record) -> bool {
        match self {
            Self::Leaf(condition) => condition.matches(record),
            Self::And(left, right) => left.eval(record) && right.eval(record),
            Self::Or(left, right) => left.eval(record) || right.eval(record),
            Self::Not(inner) => !inner.eval(record),
        }
    }
}

///
/// Compile
///

struct Compile<'s> {
    schema: &'s TableSchema,
}

impl FilterFold for Compile<'_> {
    type Output = Node;

    fn leaf(&mut self, condition: Condition<'_>) -> Result<Node, FilterError> {
        condition.resolve(self.schema).map(Node::Leaf)
    }

    fn and(&mut self, left: Node, right: Node) -> Option<Node> {
        Some(Node::And(Box::new(left), Box::new(right)))
    }

    fn or(&mut self, left: Node, right: Node) -> Option<Node> {
        Some(Node::Or(Box::new(left), Box::new(right)))
    }

    fn not(&mut self, inner: Node) -> Node {
        Node::Not(Box::new(inner))
    }
}
