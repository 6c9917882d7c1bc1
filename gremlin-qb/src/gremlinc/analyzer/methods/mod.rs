//! Method-call rules. Each rule receives `negated` so it can emit a directly negated
//! predicate where one exists; otherwise it wraps its result in `not`.

pub mod collection;
pub mod comparison;
pub mod text;

use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::{
        analyzer::Translator,
        expression::{Expression, Method, MethodCall},
        optimizer,
        steps::{TextPredicateKind, Traversal},
    },
};

impl<'a> Translator<'a> {
    pub(crate) fn translate_method(
        &self,
        expr: &Expression,
        call: &MethodCall,
        negated: bool,
    ) -> QueryResult<Traversal> {
        match &call.method {
            Method::Contains => self.translate_contains(expr, call, negated),
            Method::StartsWith => self.translate_text(expr, call, TextPredicateKind::StartingWith, negated),
            Method::EndsWith => self.translate_text(expr, call, TextPredicateKind::EndingWith, negated),
            Method::Any => self.translate_any(expr, call, negated),
            Method::CompareTo | Method::Intersect | Method::Other(_) => {
                Err(QueryError::unsupported(expr))
            }
        }
    }
}

/// Wraps `positive` in `not` when the caller asked for the negation.
pub(crate) fn negate_if(negated: bool, positive: Traversal) -> Traversal {
    if negated {
        optimizer::not(positive)
    } else {
        positive
    }
}
