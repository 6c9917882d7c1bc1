//! Translation of expression trees into filter traversals and projection keys.
//!
//! The translator is a pure function of the expression, the graph model, the options and
//! the step labels bound so far. Every node kind has exactly one rule; anything without
//! a rule fails with [`QueryError::ExpressionNotSupported`] before any step is produced.

pub mod methods;

use crate::{
    config::QueryOptions,
    errors::{QueryError, QueryResult},
    gremlinc::{
        expression::{Expression, ExpressionType, Lambda},
        optimizer,
        steps::{Key, LogicalKind, P, Step, Traversal},
    },
    model::{MemberCache, MemberKind},
    protocol::value::Value,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Step labels visible to a query, with the element type each one captures.
pub type BoundLabels = BTreeMap<String, Option<&'static str>>;

/// What a lambda parameter stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A vertex or edge of the given model type; members resolve to property keys.
    Element(String),
    /// A value already projected out of an element.
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedMember {
    pub key: Key,
    pub kind: MemberKind,
}

/// An expression classified by the role it can play in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Member(ResolvedMember),
    Parameter(Binding),
    LabelMember { label: String, member: ResolvedMember },
    Label(String),
    Constant(Value),
    Other,
}

impl Operand {
    /// Subjects sort before labels, labels before constants.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Operand::Member(_) | Operand::Parameter(_) | Operand::LabelMember { .. } => 0,
            Operand::Label(_) => 1,
            Operand::Constant(_) => 2,
            Operand::Other => 3,
        }
    }
}

#[derive(Clone)]
pub struct Translator<'a> {
    members: &'a MemberCache,
    options: &'a QueryOptions,
    labels: &'a BoundLabels,
    parameters: Vec<(String, Binding)>,
}

impl<'a> Translator<'a> {
    pub fn new(members: &'a MemberCache, options: &'a QueryOptions, labels: &'a BoundLabels) -> Self {
        Self {
            members,
            options,
            labels,
            parameters: Vec::new(),
        }
    }

    /// Translates a predicate lambda into a filter traversal.
    pub fn translate_predicate(&self, expr: &Expression, binding: Binding) -> QueryResult<Traversal> {
        debug!(expression = %expr, ?binding, "translating predicate");
        let lambda = Self::lambda(expr)?;
        let traversal = self
            .with_parameter(&lambda.parameter, binding)
            .translate(&lambda.body)?;
        debug!(steps = traversal.len(), "translated predicate");
        Ok(traversal)
    }

    /// Translates a member-selecting lambda (`x => x.Name`) into the key it reads.
    pub fn translate_projection(&self, expr: &Expression, binding: Binding) -> QueryResult<Key> {
        let lambda = Self::lambda(expr)?;
        let translator = self.with_parameter(&lambda.parameter, binding);
        match translator.classify(&lambda.body)? {
            Operand::Member(member) => Ok(member.key),
            _ => Err(QueryError::unsupported(&lambda.body)),
        }
    }

    pub(crate) fn options(&self) -> &QueryOptions {
        self.options
    }

    fn lambda(expr: &Expression) -> QueryResult<&Lambda> {
        match &expr.unwrap_convert().expr {
            ExpressionType::Lambda(lambda) => Ok(lambda),
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    pub(crate) fn with_parameter(&self, name: &str, binding: Binding) -> Translator<'a> {
        let mut translator = self.clone();
        translator.parameters.push((name.to_string(), binding));
        translator
    }

    fn parameter(&self, name: &str) -> Option<&Binding> {
        self.parameters
            .iter()
            .rev()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, binding)| binding)
    }

    pub(crate) fn translate(&self, expr: &Expression) -> QueryResult<Traversal> {
        let expr = expr.unwrap_convert();
        match &expr.expr {
            ExpressionType::Constant(Value::Boolean(true)) => Ok(Traversal::identity()),
            ExpressionType::Constant(Value::Boolean(false)) => Ok(Traversal::none()),
            ExpressionType::And(left, right) => optimizer::logical(
                LogicalKind::And,
                vec![self.translate(left)?, self.translate(right)?],
            ),
            ExpressionType::Or(left, right) => optimizer::logical(
                LogicalKind::Or,
                vec![self.translate(left)?, self.translate(right)?],
            ),
            ExpressionType::Not(inner) => self.translate_not(inner),
            ExpressionType::Comparison(comparison) => self.translate_comparison(expr, comparison),
            ExpressionType::MethodCall(call) => self.translate_method(expr, call, false),
            ExpressionType::Member(_) | ExpressionType::Parameter(_) => {
                self.translate_boolean(expr)
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    fn translate_not(&self, inner: &Expression) -> QueryResult<Traversal> {
        let inner = inner.unwrap_convert();
        match &inner.expr {
            ExpressionType::Not(operand) => self.translate(operand),
            ExpressionType::Constant(Value::Boolean(b)) => Ok(if *b {
                Traversal::none()
            } else {
                Traversal::identity()
            }),
            ExpressionType::MethodCall(call) => self.translate_method(inner, call, true),
            ExpressionType::Comparison(comparison) if comparison.is_null_check() => {
                self.translate_comparison(inner, &comparison.negated_null_check())
            }
            _ => Ok(optimizer::not(self.translate(inner)?)),
        }
    }

    /// A boolean member or parameter used directly as a predicate.
    fn translate_boolean(&self, expr: &Expression) -> QueryResult<Traversal> {
        match self.classify(expr)? {
            Operand::Member(member) if member.kind != MemberKind::Collection => {
                Ok(Traversal::single(Step::Has {
                    key: member.key,
                    predicate: P::Eq(Value::Boolean(true)),
                }))
            }
            Operand::Parameter(Binding::Scalar) => {
                Ok(Traversal::single(Step::Is(P::Eq(Value::Boolean(true)))))
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    /// Classifies an expression for use as a comparison operand.
    pub(crate) fn classify(&self, expr: &Expression) -> QueryResult<Operand> {
        let expr = expr.unwrap_convert();
        match &expr.expr {
            ExpressionType::Parameter(name) => self
                .parameter(name)
                .cloned()
                .map(Operand::Parameter)
                .ok_or_else(|| QueryError::unsupported(expr)),
            ExpressionType::Member(access) => {
                match self.classify(&access.target)? {
                    Operand::Parameter(Binding::Element(element)) => {
                        let member = self.resolve_member(&element, &access.member, expr)?;
                        Ok(Operand::Member(member))
                    }
                    Operand::Member(member) if Self::is_property_value(&member, &access.member) => {
                        Ok(Operand::Member(member))
                    }
                    Operand::Label(label) => {
                        let element = self.labels.get(&label).copied().flatten().ok_or_else(
                            || QueryError::unsupported(expr),
                        )?;
                        let member = self.resolve_member(element, &access.member, expr)?;
                        Ok(Operand::LabelMember { label, member })
                    }
                    Operand::LabelMember { label, member }
                        if Self::is_property_value(&member, &access.member) =>
                    {
                        Ok(Operand::LabelMember { label, member })
                    }
                    _ => Err(QueryError::unsupported(expr)),
                }
            }
            ExpressionType::Constant(value) => Ok(Operand::Constant(value.clone())),
            ExpressionType::Null => Ok(Operand::Constant(Value::Null)),
            ExpressionType::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| match self.classify(item)? {
                        Operand::Constant(value) => Ok(value),
                        _ => Err(QueryError::unsupported(item)),
                    })
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(Operand::Constant(Value::Array(values)))
            }
            ExpressionType::StepLabel(name) => {
                if self.labels.contains_key(name) {
                    Ok(Operand::Label(name.clone()))
                } else {
                    Err(QueryError::UnboundStepLabel(name.clone()))
                }
            }
            _ => Ok(Operand::Other),
        }
    }

    /// `t.Name.Value` on a vertex property reads the property itself.
    fn is_property_value(member: &ResolvedMember, accessed: &str) -> bool {
        member.kind == MemberKind::VertexProperty && accessed == "Value"
    }

    fn resolve_member(
        &self,
        element: &str,
        member: &str,
        expr: &Expression,
    ) -> QueryResult<ResolvedMember> {
        self.members
            .resolve_member(element, member)
            .map(|metadata| ResolvedMember {
                key: metadata.key,
                kind: metadata.kind,
            })
            .ok_or_else(|| QueryError::unsupported(expr))
    }
}
