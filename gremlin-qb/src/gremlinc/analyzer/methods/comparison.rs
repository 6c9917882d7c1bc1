use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::{
        analyzer::{Binding, Operand, ResolvedMember, Translator},
        expression::{Comparison, ComparisonOp, Expression, ExpressionType, Method, MethodCall},
        steps::{P, Step, Traversal},
    },
    protocol::value::Value,
};
use tracing::trace;

/// The comparison `signum <op> c` reduces to, over the signum results {-1, 0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignumReduction {
    Never,
    Always,
    Compare(ComparisonOp),
}

/// Reduces `a.CompareTo(b) <op> c` to a comparison between `a` and `b`.
pub fn reduce_signum(op: ComparisonOp, c: i64) -> SignumReduction {
    let satisfied: Vec<i64> = [-1i64, 0, 1]
        .into_iter()
        .filter(|signum| op.holds(signum.cmp(&c)))
        .collect();
    match satisfied.as_slice() {
        [] => SignumReduction::Never,
        [-1, 0, 1] => SignumReduction::Always,
        [-1] => SignumReduction::Compare(ComparisonOp::Lt),
        [0] => SignumReduction::Compare(ComparisonOp::Eq),
        [1] => SignumReduction::Compare(ComparisonOp::Gt),
        [-1, 0] => SignumReduction::Compare(ComparisonOp::Lte),
        [0, 1] => SignumReduction::Compare(ComparisonOp::Gte),
        _ => SignumReduction::Compare(ComparisonOp::Neq),
    }
}

impl<'a> Translator<'a> {
    pub(crate) fn translate_comparison(
        &self,
        expr: &Expression,
        comparison: &Comparison,
    ) -> QueryResult<Traversal> {
        if let Some(traversal) = self.translate_compare_to(expr, comparison)? {
            return Ok(traversal);
        }
        let left = self.classify(&comparison.left)?;
        let right = self.classify(&comparison.right)?;
        self.compare_operands(expr, left, comparison.op, right)
    }

    /// `a.CompareTo(b) <op> c` with an integer constant `c`, on either side.
    fn translate_compare_to(
        &self,
        expr: &Expression,
        comparison: &Comparison,
    ) -> QueryResult<Option<Traversal>> {
        let (call, op, constant) = match (
            as_compare_to(&comparison.left),
            as_compare_to(&comparison.right),
        ) {
            (Some(call), None) => (call, comparison.op, &comparison.right),
            (None, Some(call)) => (call, comparison.op.flip(), &comparison.left),
            _ => return Ok(None),
        };
        let c = match self.classify(constant)? {
            Operand::Constant(value) => value
                .as_i64()
                .ok_or_else(|| QueryError::unsupported(expr))?,
            _ => return Err(QueryError::unsupported(expr)),
        };
        let [argument] = call.args.as_slice() else {
            return Err(QueryError::unsupported(expr));
        };

        let reduction = reduce_signum(op, c);
        trace!(?op, c, ?reduction, "reduced CompareTo");
        match reduction {
            SignumReduction::Never => Ok(Some(Traversal::none())),
            SignumReduction::Always => Ok(Some(Traversal::identity())),
            SignumReduction::Compare(op) => {
                let left = self.classify(&call.target)?;
                let right = self.classify(argument)?;
                self.compare_operands(expr, left, op, right).map(Some)
            }
        }
    }

    /// Puts the subject on the left, then emits the filter for `left <op> right`.
    pub(crate) fn compare_operands(
        &self,
        expr: &Expression,
        left: Operand,
        op: ComparisonOp,
        right: Operand,
    ) -> QueryResult<Traversal> {
        let (subject, op, object) = if left.rank() > right.rank() {
            (right, op.flip(), left)
        } else {
            (left, op, right)
        };

        match (subject, object) {
            (Operand::Member(member), object) => self.compare_member(expr, &member, op, object),
            (Operand::Parameter(Binding::Scalar), Operand::Constant(value)) => {
                // projected values keep explicit null checks instead of has/hasNot
                Ok(Traversal::single(Step::Is(P::compare(op, value))))
            }
            (Operand::Parameter(_), Operand::Label(label)) => Ok(Traversal::single(
                Step::WherePredicate(P::compare(op, Value::String(label))),
            )),
            (Operand::LabelMember { label, member }, object) => {
                let inner = self.compare_member(expr, &member, op, object)?;
                Ok(select_then(label, inner))
            }
            (Operand::Label(label), Operand::Label(other)) => Ok(select_then(
                label,
                Traversal::single(Step::WherePredicate(P::compare(op, Value::String(other)))),
            )),
            (Operand::Label(label), Operand::Constant(value)) => Ok(select_then(
                label,
                Traversal::single(Step::Is(P::compare(op, value))),
            )),
            (Operand::Constant(left), Operand::Constant(right)) => {
                fold_constants(expr, &left, op, &right)
            }
            _ => Err(QueryError::unsupported(expr)),
        }
    }

    fn compare_member(
        &self,
        expr: &Expression,
        member: &ResolvedMember,
        op: ComparisonOp,
        object: Operand,
    ) -> QueryResult<Traversal> {
        let key = member.key.clone();
        let step = match (object, op) {
            (Operand::Constant(Value::Null), ComparisonOp::Eq) => Step::HasNot(key),
            (Operand::Constant(Value::Null), ComparisonOp::Neq) => Step::HasKey(key),
            (Operand::Constant(Value::Null), _) => return Err(QueryError::unsupported(expr)),
            (Operand::Constant(value), op) => Step::Has {
                key,
                predicate: P::compare(op, value),
            },
            (Operand::Label(label), op) => Step::HasTraversal {
                key,
                body: Traversal::single(Step::WherePredicate(P::compare(op, Value::String(label)))),
            },
            _ => return Err(QueryError::unsupported(expr)),
        };
        Ok(Traversal::single(step))
    }
}

fn as_compare_to(expr: &Expression) -> Option<&MethodCall> {
    match &expr.unwrap_convert().expr {
        ExpressionType::MethodCall(call) if call.method == Method::CompareTo => Some(call),
        _ => None,
    }
}

/// `where(__.select(label).<inner>)`
fn select_then(label: String, inner: Traversal) -> Traversal {
    let mut steps = vec![Step::SelectLabel(label)];
    steps.extend(inner.iter().cloned());
    Traversal::single(Step::FilterTraversal(Traversal::from_steps(steps)))
}

fn fold_constants(
    expr: &Expression,
    left: &Value,
    op: ComparisonOp,
    right: &Value,
) -> QueryResult<Traversal> {
    let holds = match left.compare(right) {
        Some(ordering) => op.holds(ordering),
        None => match op {
            ComparisonOp::Eq => false,
            ComparisonOp::Neq => true,
            _ => return Err(QueryError::unsupported(expr)),
        },
    };
    trace!(%left, %right, holds, "folded constant comparison");
    Ok(if holds {
        Traversal::identity()
    } else {
        Traversal::none()
    })
}
