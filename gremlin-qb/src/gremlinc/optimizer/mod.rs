//! Append-time rewriting of step sequences.
//!
//! Every step enters a query through [`append`], which looks at most one step back and
//! re-appends any merged result until no rule fires. Logical and `not` combinators are
//! normalized when they are constructed, see [`logical`] and [`not`].

mod logical;

pub use logical::{logical, not};

use crate::gremlinc::steps::{LimitStep, SkipStep, Step, StepStack, TailStep};
use tracing::trace;

/// Appends `step` to `stack`, applying every local rewrite.
pub fn append(stack: &StepStack, step: Step) -> StepStack {
    match (stack.peek(), step) {
        (Some(_), Step::Identity) => {
            trace!("eliding identity step");
            stack.clone()
        }
        // a lone identity is only the placeholder for an empty traversal
        (Some(Step::Identity), step) if stack.len() == 1 => {
            trace!("replacing placeholder identity");
            append(&stack.pop(), step)
        }
        (Some(Step::None), Step::None) => {
            trace!("dropping repeated none step");
            stack.clone()
        }
        (Some(Step::HasLabel(previous)), Step::HasLabel(labels)) => {
            if previous.iter().all(|label| labels.contains(label)) {
                trace!(?labels, "type filter already satisfied");
                return stack.clone();
            }
            let narrowed: Vec<String> = previous
                .iter()
                .filter(|label| labels.contains(label))
                .cloned()
                .collect();
            let merged = if narrowed.is_empty() {
                trace!("disjoint type filters collapse to none");
                Step::None
            } else {
                trace!(?narrowed, "narrowing type filter");
                Step::HasLabel(narrowed)
            };
            append(&stack.pop(), merged)
        }
        (Some(Step::Limit(previous)), Step::Limit(next)) if previous.scope() == next.scope() => {
            trace!("composing limit steps");
            let merged = LimitStep::with_count(previous.count().min(next.count()), next.scope());
            append(&stack.pop(), Step::Limit(merged))
        }
        (Some(Step::Tail(previous)), Step::Tail(next)) if previous.scope() == next.scope() => {
            trace!("composing tail steps");
            let merged = TailStep::with_count(previous.count().min(next.count()), next.scope());
            append(&stack.pop(), Step::Tail(merged))
        }
        (Some(Step::Skip(previous)), Step::Skip(next)) if previous.scope() == next.scope() => {
            trace!("composing skip steps");
            let merged = SkipStep::with_count(
                previous.count().saturating_add(next.count()),
                next.scope(),
            );
            append(&stack.pop(), Step::Skip(merged))
        }
        (Some(Step::Range(previous)), Step::Range(next)) if previous.scope() == next.scope() => {
            trace!("composing range steps");
            let merged = previous.then(&next);
            append(&stack.pop(), Step::Range(merged))
        }
        (_, step) => stack.push(step),
    }
}

/// Appends a filter body: bodies made only of filter steps are spliced in,
/// anything else is wrapped in a `where` step.
pub fn append_filter(stack: &StepStack, body: &crate::gremlinc::steps::Traversal) -> StepStack {
    if body.is_identity() {
        return stack.clone();
    }
    if body.is_filter() {
        trace!(steps = body.len(), "inlining filter body");
        return body
            .iter()
            .fold(stack.clone(), |stack, step| append(&stack, step.clone()));
    }
    append(stack, Step::FilterTraversal(body.clone()))
}
