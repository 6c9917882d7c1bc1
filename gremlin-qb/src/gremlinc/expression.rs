//! The closed expression tree handed to the translator.
//!
//! Expressions are either parsed from lambda text (`t => t.Age == 36`) or built in code
//! with the constructors below. Every node keeps the [`Loc`] it was parsed from so
//! errors can point back at the offending fragment.

use crate::{
    gremlinc::{location::Loc, steps::StepLabel},
    protocol::value::Value,
};
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub loc: Loc,
    pub expr: ExpressionType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Lambda(Lambda),
    Parameter(String),
    Member(MemberAccess),
    Constant(Value),
    Null,
    StepLabel(String),
    Array(Vec<Expression>),
    Comparison(Comparison),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Convert(Convert),
    MethodCall(MethodCall),
    FunctionCall(FunctionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameter: String,
    pub body: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub target: Box<Expression>,
    pub member: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: ComparisonOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl Comparison {
    /// `x == null` or `x != null`, in either operand order.
    pub fn is_null_check(&self) -> bool {
        matches!(self.op, ComparisonOp::Eq | ComparisonOp::Neq)
            && (self.left.unwrap_convert().expr == ExpressionType::Null
                || self.right.unwrap_convert().expr == ExpressionType::Null)
    }

    /// The same null check with `==` and `!=` swapped.
    pub fn negated_null_check(&self) -> Comparison {
        let op = match self.op {
            ComparisonOp::Eq => ComparisonOp::Neq,
            _ => ComparisonOp::Eq,
        };
        Comparison {
            op,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Convert {
    pub type_name: String,
    pub inner: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub target: Box<Expression>,
    pub method: Method,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    /// The operator that holds after swapping both operands (`c < m` is `m > c`).
    pub fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Neq => Self::Neq,
            Self::Lt => Self::Gt,
            Self::Lte => Self::Gte,
            Self::Gt => Self::Lt,
            Self::Gte => Self::Lte,
        }
    }

    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Self::Eq => ordering == Equal,
            Self::Neq => ordering != Equal,
            Self::Lt => ordering == Less,
            Self::Lte => ordering != Greater,
            Self::Gt => ordering == Greater,
            Self::Gte => ordering != Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    CompareTo,
    StartsWith,
    EndsWith,
    Contains,
    Intersect,
    Any,
    Other(String),
}

impl Method {
    /// Accepts both `StartsWith` and `starts_with` spellings.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.replace('_', "").to_ascii_lowercase();
        match normalized.as_str() {
            "compareto" => Self::CompareTo,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "contains" => Self::Contains,
            "intersect" => Self::Intersect,
            "any" => Self::Any,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CompareTo => "CompareTo",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::Contains => "Contains",
            Self::Intersect => "Intersect",
            Self::Any => "Any",
            Self::Other(name) => name,
        }
    }
}

#[allow(clippy::should_implement_trait)]
impl Expression {
    pub fn new(expr: ExpressionType) -> Self {
        Self {
            loc: Loc::empty(),
            expr,
        }
    }

    pub fn with_loc(loc: Loc, expr: ExpressionType) -> Self {
        Self { loc, expr }
    }

    pub fn lambda(parameter: impl Into<String>, body: Expression) -> Self {
        Self::new(ExpressionType::Lambda(Lambda {
            parameter: parameter.into(),
            body: Box::new(body),
        }))
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(ExpressionType::Parameter(name.into()))
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(ExpressionType::Constant(value.into()))
    }

    pub fn null() -> Self {
        Self::new(ExpressionType::Null)
    }

    pub fn label<E, S>(label: &StepLabel<E, S>) -> Self {
        Self::new(ExpressionType::StepLabel(label.name().to_string()))
    }

    pub fn array<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(ExpressionType::Array(
            values.into_iter().map(Self::constant).collect(),
        ))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::new(ExpressionType::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        }))
    }

    pub fn member(self, member: impl Into<String>) -> Self {
        Self::new(ExpressionType::Member(MemberAccess {
            target: Box::new(self),
            member: member.into(),
        }))
    }

    pub fn call(self, method: &str, args: Vec<Expression>) -> Self {
        Self::new(ExpressionType::MethodCall(MethodCall {
            target: Box::new(self),
            method: Method::from_name(method),
            args,
        }))
    }

    pub fn convert(self, type_name: impl Into<String>) -> Self {
        Self::new(ExpressionType::Convert(Convert {
            type_name: type_name.into(),
            inner: Box::new(self),
        }))
    }

    pub fn compare(self, op: ComparisonOp, other: Expression) -> Self {
        Self::new(ExpressionType::Comparison(Comparison {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }))
    }

    pub fn eq(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Eq, other.into_operand())
    }

    pub fn neq(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Neq, other.into_operand())
    }

    pub fn lt(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Lt, other.into_operand())
    }

    pub fn lte(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Lte, other.into_operand())
    }

    pub fn gt(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Gt, other.into_operand())
    }

    pub fn gte(self, other: impl IntoOperand) -> Self {
        self.compare(ComparisonOp::Gte, other.into_operand())
    }

    pub fn and(self, other: Expression) -> Self {
        Self::new(ExpressionType::And(Box::new(self), Box::new(other)))
    }

    pub fn or(self, other: Expression) -> Self {
        Self::new(ExpressionType::Or(Box::new(self), Box::new(other)))
    }

    pub fn not(self) -> Self {
        Self::new(ExpressionType::Not(Box::new(self)))
    }

    /// Strips any number of `Convert` wrappers.
    pub fn unwrap_convert(&self) -> &Expression {
        match &self.expr {
            ExpressionType::Convert(convert) => convert.inner.unwrap_convert(),
            _ => self,
        }
    }
}

/// Right-hand sides accepted by the comparison constructors.
pub trait IntoOperand {
    fn into_operand(self) -> Expression;
}

impl IntoOperand for Expression {
    fn into_operand(self) -> Expression {
        self
    }
}

macro_rules! constant_operand {
    ($($ty:ty),*) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self) -> Expression {
                    Expression::constant(self)
                }
            }
        )*
    };
}

constant_operand!(Value, &str, String, bool, i32, i64, f32, f64);

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expression]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            ExpressionType::Lambda(lambda) => write!(f, "{} => {}", lambda.parameter, lambda.body),
            ExpressionType::Parameter(name) => write!(f, "{name}"),
            ExpressionType::Member(access) => write!(f, "{}.{}", access.target, access.member),
            ExpressionType::Constant(value) => write!(f, "{value}"),
            ExpressionType::Null => write!(f, "null"),
            ExpressionType::StepLabel(name) => write!(f, "${name}"),
            ExpressionType::Array(items) => {
                write!(f, "[")?;
                write_args(f, items)?;
                write!(f, "]")
            }
            ExpressionType::Comparison(cmp) => {
                write!(f, "{} {} {}", cmp.left, cmp.op.symbol(), cmp.right)
            }
            ExpressionType::And(l, r) => write!(f, "({l} && {r})"),
            ExpressionType::Or(l, r) => write!(f, "({l} || {r})"),
            ExpressionType::Not(inner) => write!(f, "!({inner})"),
            ExpressionType::Convert(convert) => {
                write!(f, "({}){}", convert.type_name, convert.inner)
            }
            ExpressionType::MethodCall(call) => {
                write!(f, "{}.{}(", call.target, call.method.name())?;
                write_args(f, &call.args)?;
                write!(f, ")")
            }
            ExpressionType::FunctionCall(call) => {
                write!(f, "{}(", call.name)?;
                write_args(f, &call.args)?;
                write!(f, ")")
            }
        }
    }
}
