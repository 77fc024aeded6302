use crate::{
    MAX_FILTER_DEPTH,
    error::FilterError,
    filter::{Condition, FilterFold, fold_filter},
    obs::sink::{self, MetricsEvent},
    predicate::adapter::EntityAdapter,
    value::Value,
};

/// Build an engine predicate for `filter` through `adapter`.
///
/// `Ok(None)` means no filtering at all (absent, empty or universal filter).
pub fn build_predicate<A>(adapter: &A, filter: Option<&Value>) -> Result<Option<A::Predicate>, FilterError>
where
    A: EntityAdapter + ?Sized,
{
    build_predicate_with_depth(adapter, filter, MAX_FILTER_DEPTH)
}

pub fn build_predicate_with_depth<A>(
    adapter: &A,
    filter: Option<&Value>,
    max_depth: usize,
) -> Result<Option<A::Predicate>, FilterError>
where
    A: EntityAdapter + ?Sized,
{
    let entity = adapter.entity_name();

    match fold_filter(filter, max_depth, &mut Lower { adapter }) {
        Ok(predicate) => {
            sink::record(MetricsEvent::PredicateBuilt {
                entity,
                universal: predicate.is_none(),
            });

            Ok(predicate)
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

///
/// Lower
///

struct Lower<'a, A: ?Sized> {
    adapter: &'a A,
}

impl<A: EntityAdapter + ?Sized> FilterFold for Lower<'_, A> {
    type Output = A::Predicate;

    fn leaf(&mut self, condition: Condition<'_>) -> Result<A::Predicate, FilterError> {
        self.adapter
            .predicate_for_field(condition.field, condition.operator, condition.value)
    }

    fn and(&mut self, left: A::Predicate, right: A::Predicate) -> Option<A::Predicate> {
        self.adapter.and_predicate(vec![left, right])
    }

    fn or(&mut self, left: A::Predicate, right: A::Predicate) -> Option<A::Predicate> {
        self.adapter.or_predicate(vec![left, right])
    }

    fn not(&mut self, inner: A::Predicate) -> A::Predicate {
        self.adapter.not_predicate(inner)
    }
}
