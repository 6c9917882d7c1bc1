use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::{Key, P, Scope, Traversal},
    protocol::value::Value,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// A single graph operation. Steps are immutable once built; sequences of them are
/// kept in a [`Traversal`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Passes every traverser through unchanged.
    Identity,
    /// Filters out every traverser. Also used to mute a query.
    None,

    // sources
    V(Vec<Value>),
    E(Vec<Value>),
    Inject(Vec<Value>),
    AddV {
        label: String,
        properties: Vec<PropertyBinding>,
    },
    AddE {
        label: String,
        properties: Vec<PropertyBinding>,
    },
    From(EdgeEndpoint),
    To(EdgeEndpoint),

    // navigation
    Out(Vec<String>),
    In(Vec<String>),
    Both(Vec<String>),
    OutE(Vec<String>),
    InE(Vec<String>),
    BothE(Vec<String>),
    OutV,
    InV,
    OtherV,
    BothV,

    // filters
    HasLabel(Vec<String>),
    Has {
        key: Key,
        predicate: P,
    },
    HasKey(Key),
    HasNot(Key),
    HasTraversal {
        key: Key,
        body: Traversal,
    },
    Is(P),
    WherePredicate(P),
    FilterTraversal(Traversal),
    Logical(LogicalStep),
    Not(Traversal),

    // ranges
    Range(RangeStep),
    Limit(LimitStep),
    Skip(SkipStep),
    Tail(TailStep),

    // shape
    Values(Vec<Key>),
    Properties(Vec<Key>),
    ValueMap(Vec<Key>),
    Id,
    Label,
    Project(IndexMap<String, ProjectBy>),
    /// `group().by(keys)[.by(values)]`
    Group {
        keys: GroupBy,
        values: Option<GroupBy>,
    },
    As(String),
    SelectLabel(String),
    Count(Scope),
    Fold,
    Unfold,
    Dedup(Scope),
    Order(Vec<OrderBy>),
    Sum(Scope),
    Min(Scope),
    Max(Scope),
    Mean(Scope),
    Constant(Value),
    Drop,
}

impl Step {
    /// Steps that only remove traversers and never change what flows through.
    /// A body made only of these can be inlined instead of wrapped in `where`.
    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            Step::Identity
                | Step::None
                | Step::HasLabel(_)
                | Step::Has { .. }
                | Step::HasKey(_)
                | Step::HasNot(_)
                | Step::HasTraversal { .. }
                | Step::Is(_)
                | Step::WherePredicate(_)
                | Step::FilterTraversal(_)
                | Step::Logical(_)
                | Step::Not(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBinding {
    pub key: Key,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeEndpoint {
    Label(String),
    Traversal(Traversal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    Key(Key),
    Traversal(Traversal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectBy {
    Identity,
    Key(Key),
    Traversal(Traversal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderTarget {
    Value,
    Key(Key),
    Traversal(Traversal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub target: OrderTarget,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKind {
    And,
    Or,
}

/// An `and(...)`/`or(...)` over two or more branches. Built only by
/// [`crate::gremlinc::optimizer::logical`], which keeps branches flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalStep {
    kind: LogicalKind,
    branches: Arc<[Traversal]>,
}

impl LogicalStep {
    pub(crate) fn new(kind: LogicalKind, branches: Vec<Traversal>) -> Self {
        Self {
            kind,
            branches: branches.into(),
        }
    }

    pub fn kind(&self) -> LogicalKind {
        self.kind
    }

    pub fn branches(&self) -> &[Traversal] {
        &self.branches
    }
}

/// Composed counts and bounds saturate here so they stay representable on the wire.
const MAX_COUNT: u64 = i64::MAX as u64;

fn non_negative(argument: &'static str, value: i64) -> QueryResult<u64> {
    u64::try_from(value)
        .map_err(|_| QueryError::invalid_argument(argument, format!("{value} is negative")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeStep {
    lower: u64,
    upper: i64,
    scope: Scope,
}

impl RangeStep {
    /// `upper == -1` means unbounded.
    pub fn new(lower: i64, upper: i64, scope: Scope) -> QueryResult<Self> {
        let lower = non_negative("lower", lower)?;
        if upper < -1 {
            return Err(QueryError::invalid_argument(
                "upper",
                format!("{upper} is below -1"),
            ));
        }
        Ok(Self {
            lower,
            upper,
            scope,
        })
    }

    pub fn lower(&self) -> u64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Applying `self` and then `next` over the same scope as a single range.
    pub(crate) fn then(&self, next: &RangeStep) -> RangeStep {
        let lower = self.lower.saturating_add(next.lower).min(MAX_COUNT);
        let shifted = if next.upper == -1 {
            -1
        } else {
            i64::try_from(self.lower)
                .unwrap_or(i64::MAX)
                .saturating_add(next.upper)
        };
        let upper = match (self.upper, shifted) {
            (-1, s) => s,
            (u, -1) => u,
            (u, s) => u.min(s),
        };
        // an exhausted range stays empty instead of going negative
        let upper = match u64::try_from(upper) {
            Ok(bound) if bound < lower => i64::try_from(lower).unwrap_or(i64::MAX),
            _ => upper,
        };
        RangeStep {
            lower,
            upper,
            scope: self.scope,
        }
    }
}

macro_rules! counted_step {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            count: u64,
            scope: Scope,
        }

        impl $name {
            pub fn new(count: i64, scope: Scope) -> QueryResult<Self> {
                Ok(Self {
                    count: non_negative("count", count)?,
                    scope,
                })
            }

            pub(crate) fn with_count(count: u64, scope: Scope) -> Self {
                Self {
                    count: count.min(MAX_COUNT),
                    scope,
                }
            }

            pub fn count(&self) -> u64 {
                self.count
            }

            pub fn scope(&self) -> Scope {
                self.scope
            }
        }
    };
}

counted_step!(LimitStep);
counted_step!(SkipStep);
counted_step!(TailStep);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_bounds_are_rejected() {
        assert!(matches!(
            RangeStep::new(-1, 5, Scope::Global),
            Err(QueryError::InvalidArgument { argument: "lower", .. })
        ));
        assert!(matches!(
            RangeStep::new(0, -2, Scope::Global),
            Err(QueryError::InvalidArgument { argument: "upper", .. })
        ));
        assert!(RangeStep::new(0, -1, Scope::Local).is_ok());
        assert!(LimitStep::new(-1, Scope::Global).is_err());
        assert!(SkipStep::new(-3, Scope::Local).is_err());
        assert!(TailStep::new(-1, Scope::Global).is_err());
        assert_eq!(TailStep::new(1, Scope::Local).unwrap().count(), 1);
    }

    #[test]
    fn chained_ranges_compose() {
        let first = RangeStep::new(2, 10, Scope::Global).unwrap();
        let second = RangeStep::new(1, 3, Scope::Global).unwrap();
        let composed = first.then(&second);
        assert_eq!((composed.lower(), composed.upper()), (3, 5));

        let unbounded = RangeStep::new(2, -1, Scope::Global).unwrap();
        let composed = unbounded.then(&second);
        assert_eq!((composed.lower(), composed.upper()), (3, 5));

        let composed = first.then(&RangeStep::new(20, -1, Scope::Global).unwrap());
        assert_eq!((composed.lower(), composed.upper()), (22, 22));
    }
}
