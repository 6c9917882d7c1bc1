use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::{LogicalKind, LogicalStep, Step, Traversal},
};
use tracing::trace;

/// Builds `and(...)`/`or(...)` over `branches`, returning the simplest equivalent
/// traversal.
///
/// - branches that are themselves a single logical step of the same kind are flattened
/// - identity branches are dropped from `and` and make `or` the identity
/// - none branches are dropped from `or` and make `and` none
/// - a combinator left with one branch becomes that branch
pub fn logical(kind: LogicalKind, branches: Vec<Traversal>) -> QueryResult<Traversal> {
    if branches.is_empty() {
        return Err(QueryError::invalid_argument(
            "branches",
            format!("{kind:?} requires at least one branch"),
        ));
    }

    let mut flattened = Vec::with_capacity(branches.len());
    for branch in branches {
        flatten_into(kind, branch, &mut flattened);
    }

    let (absorbing, neutral): (fn(&Traversal) -> bool, fn(&Traversal) -> bool) = match kind {
        LogicalKind::And => (Traversal::is_none, Traversal::is_identity),
        LogicalKind::Or => (Traversal::is_identity, Traversal::is_none),
    };

    if flattened.iter().any(absorbing) {
        trace!(?kind, "logical step absorbed by a branch");
        return Ok(match kind {
            LogicalKind::And => Traversal::none(),
            LogicalKind::Or => Traversal::identity(),
        });
    }

    flattened.retain(|branch| !neutral(branch));
    match flattened.len() {
        0 => Ok(match kind {
            LogicalKind::And => Traversal::identity(),
            LogicalKind::Or => Traversal::none(),
        }),
        1 => Ok(flattened.remove(0)),
        _ => Ok(Traversal::single(Step::Logical(LogicalStep::new(
            kind, flattened,
        )))),
    }
}

fn flatten_into(kind: LogicalKind, branch: Traversal, into: &mut Vec<Traversal>) {
    match branch.single_step() {
        Some(Step::Logical(inner)) if inner.kind() == kind => {
            trace!(?kind, "flattening nested logical step");
            for nested in inner.branches() {
                flatten_into(kind, nested.clone(), into);
            }
        }
        _ => into.push(branch),
    }
}

/// Builds `not(body)`: `not(identity)` is none, `not(none)` is identity and a double
/// negation cancels out.
pub fn not(body: Traversal) -> Traversal {
    if body.is_identity() {
        return Traversal::none();
    }
    if body.is_none() {
        return Traversal::identity();
    }
    match body.single_step() {
        Some(Step::Not(inner)) => {
            trace!("cancelling double negation");
            inner.clone()
        }
        _ => Traversal::single(Step::Not(body)),
    }
}
