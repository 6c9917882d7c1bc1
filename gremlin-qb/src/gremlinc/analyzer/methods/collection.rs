use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::{
        analyzer::{Binding, Operand, Translator, methods::negate_if},
        expression::{Expression, ExpressionType, Method, MethodCall},
        steps::{P, Step, TextPredicateKind, Traversal},
    },
    model::MemberKind,
    protocol::value::Value,
};

impl<'a> Translator<'a> {
    /// `t.Coll.Contains(v)`, `array.Contains(t.Member)` and `$label.Contains(t.Member)`.
    /// A scalar-member `Contains(string)` is a text predicate.
    pub(crate) fn translate_contains(
        &self,
        expr: &Expression,
        call: &MethodCall,
        negated: bool,
    ) -> QueryResult<Traversal> {
        let [argument] = call.args.as_slice() else {
            return Err(QueryError::unsupported(expr));
        };
        let target = self.classify(&call.target)?;
        let argument = self.classify(argument)?;

        match (target, argument) {
            (Operand::Member(member), argument) if member.kind == MemberKind::Collection => {
                let positive = match argument {
                    Operand::Constant(value) if !value.is_null() => Step::Has {
                        key: member.key,
                        predicate: P::Eq(value),
                    },
                    Operand::Label(label) => Step::HasTraversal {
                        key: member.key,
                        body: Traversal::single(Step::WherePredicate(P::Eq(Value::String(label)))),
                    },
                    _ => return Err(QueryError::unsupported(expr)),
                };
                Ok(negate_if(negated, Traversal::single(positive)))
            }
            (
                Operand::Member(_) | Operand::Parameter(Binding::Scalar),
                Operand::Constant(Value::String(_)),
            ) => self.translate_text(expr, call, TextPredicateKind::Containing, negated),
            (Operand::Constant(Value::Array(values)), subject) => {
                self.translate_within(expr, subject, values, negated)
            }
            (Operand::Label(label), subject) => {
                self.translate_within_label(expr, subject, label, negated)
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    /// `t.Coll.Any()`, `t.Coll.Any(x => ...)` and `a.Intersect(b).Any()`.
    pub(crate) fn translate_any(
        &self,
        expr: &Expression,
        call: &MethodCall,
        negated: bool,
    ) -> QueryResult<Traversal> {
        match call.args.as_slice() {
            [] => {
                if let ExpressionType::MethodCall(inner) = &call.target.unwrap_convert().expr {
                    if inner.method == Method::Intersect {
                        return self.translate_intersect(expr, inner, negated);
                    }
                }
                match self.classify(&call.target)? {
                    Operand::Member(member) => Ok(Traversal::single(if negated {
                        Step::HasNot(member.key)
                    } else {
                        Step::HasKey(member.key)
                    })),
                    Operand::Constant(Value::Array(values)) => {
                        Ok(if values.is_empty() == negated {
                            Traversal::identity()
                        } else {
                            Traversal::none()
                        })
                    }
                    _ => Err(QueryError::unsupported(expr)),
                }
            }
            [predicate] => {
                let ExpressionType::Lambda(lambda) = &predicate.unwrap_convert().expr else {
                    return Err(QueryError::unsupported(expr));
                };
                let Operand::Member(member) = self.classify(&call.target)? else {
                    return Err(QueryError::unsupported(expr));
                };
                let inner = self
                    .with_parameter(&lambda.parameter, Binding::Scalar)
                    .translate(&lambda.body)?;
                let positive = if inner.is_identity() {
                    Traversal::single(Step::HasKey(member.key))
                } else if inner.is_none() {
                    Traversal::none()
                } else if let Some(Step::Is(predicate)) = inner.single_step() {
                    Traversal::single(Step::Has {
                        key: member.key,
                        predicate: predicate.clone(),
                    })
                } else {
                    Traversal::single(Step::HasTraversal {
                        key: member.key,
                        body: inner,
                    })
                };
                Ok(negate_if(negated, positive))
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    fn translate_intersect(
        &self,
        expr: &Expression,
        intersect: &MethodCall,
        negated: bool,
    ) -> QueryResult<Traversal> {
        let [other] = intersect.args.as_slice() else {
            return Err(QueryError::unsupported(expr));
        };
        let left = self.classify(&intersect.target)?;
        let right = self.classify(other)?;
        let (subject, object) = if left.rank() <= right.rank() {
            (left, right)
        } else {
            (right, left)
        };
        match object {
            Operand::Constant(Value::Array(values)) => {
                self.translate_within(expr, subject, values, negated)
            }
            Operand::Label(label) => self.translate_within_label(expr, subject, label, negated),
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    /// Membership of `subject` in a constant set. Empty sets never match.
    pub(crate) fn translate_within(
        &self,
        expr: &Expression,
        subject: Operand,
        values: Vec<Value>,
        negated: bool,
    ) -> QueryResult<Traversal> {
        if values.is_empty() {
            return Ok(negate_if(negated, Traversal::none()));
        }
        match subject {
            Operand::Member(member) => {
                // `without` on a multi-valued property would match any other value
                if negated && member.kind != MemberKind::Collection {
                    return Ok(Traversal::single(Step::Has {
                        key: member.key,
                        predicate: P::Without(values),
                    }));
                }
                Ok(negate_if(
                    negated,
                    Traversal::single(Step::Has {
                        key: member.key,
                        predicate: P::Within(values),
                    }),
                ))
            }
            Operand::Parameter(Binding::Scalar) => Ok(Traversal::single(Step::Is(if negated {
                P::Without(values)
            } else {
                P::Within(values)
            }))),
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    fn translate_within_label(
        &self,
        expr: &Expression,
        subject: Operand,
        label: String,
        negated: bool,
    ) -> QueryResult<Traversal> {
        let predicate = Step::WherePredicate(P::Within(vec![Value::String(label)]));
        let positive = match subject {
            Operand::Member(member) => Step::HasTraversal {
                key: member.key,
                body: Traversal::single(predicate),
            },
            Operand::Parameter(_) => predicate,
            _ => return Err(QueryError::unsupported(expr)),
        };
        Ok(negate_if(negated, Traversal::single(positive)))
    }
}
