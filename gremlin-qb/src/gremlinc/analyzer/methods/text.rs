use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::{
        analyzer::{Binding, Operand, Translator, methods::negate_if},
        expression::{Expression, MethodCall},
        steps::{P, Step, TextPredicateKind, Traversal},
    },
    model::MemberKind,
    protocol::value::Value,
};
use tracing::trace;

impl<'a> Translator<'a> {
    /// `StartsWith`, `EndsWith` and string `Contains`.
    ///
    /// `"+49123".StartsWith(t.Code)` is the reverse form: the member must be one of the
    /// prefixes of the constant, which needs no text predicate at all.
    pub(crate) fn translate_text(
        &self,
        expr: &Expression,
        call: &MethodCall,
        kind: TextPredicateKind,
        negated: bool,
    ) -> QueryResult<Traversal> {
        let [argument] = call.args.as_slice() else {
            return Err(QueryError::unsupported(expr));
        };
        let target = self.classify(&call.target)?;
        let argument = self.classify(argument)?;

        match (target, argument) {
            (Operand::Member(member), Operand::Constant(Value::String(text)))
                if member.kind != MemberKind::Collection =>
            {
                let empty = text.is_empty();
                let predicate = self.text_predicate(expr, kind, negated, text)?;
                if empty {
                    return Ok(negate_if(negated, Traversal::single(Step::HasKey(member.key))));
                }
                Ok(Traversal::single(Step::Has {
                    key: member.key,
                    predicate,
                }))
            }
            (Operand::Parameter(Binding::Scalar), Operand::Constant(Value::String(text))) => {
                let empty = text.is_empty();
                let predicate = self.text_predicate(expr, kind, negated, text)?;
                if empty {
                    return Ok(negate_if(negated, Traversal::identity()));
                }
                Ok(Traversal::single(Step::Is(predicate)))
            }
            (Operand::Constant(Value::String(text)), subject)
                if kind != TextPredicateKind::Containing =>
            {
                let candidates = match kind {
                    TextPredicateKind::StartingWith => prefixes(&text),
                    _ => suffixes(&text),
                };
                trace!(?kind, candidates = candidates.len(), "reverse text predicate");
                self.translate_within(expr, subject, candidates, negated)
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    fn text_predicate(
        &self,
        expr: &Expression,
        kind: TextPredicateKind,
        negated: bool,
        text: String,
    ) -> QueryResult<P> {
        let kind = if negated { kind.negate() } else { kind };
        if self.options().disabled_text_predicates.is_disabled(kind) {
            return Err(QueryError::DisabledTextPredicate {
                predicate: kind,
                expression: Box::new(expr.clone()),
            });
        }
        Ok(P::Text(kind, text))
    }
}

fn prefixes(text: &str) -> Vec<Value> {
    (0..=text.len())
        .filter(|i| text.is_char_boundary(*i))
        .map(|i| Value::from(&text[..i]))
        .collect()
}

fn suffixes(text: &str) -> Vec<Value> {
    (0..=text.len())
        .filter(|i| text.is_char_boundary(*i))
        .map(|i| Value::from(&text[i..]))
        .collect()
}
