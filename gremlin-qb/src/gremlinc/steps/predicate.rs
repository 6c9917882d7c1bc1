use crate::{gremlinc::expression::ComparisonOp, protocol::value::Value};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Gremlin `P`/`TextP` predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum P {
    Eq(Value),
    Neq(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Within(Vec<Value>),
    Without(Vec<Value>),
    Text(TextPredicateKind, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextPredicateKind {
    StartingWith,
    EndingWith,
    Containing,
    NotStartingWith,
    NotEndingWith,
    NotContaining,
}

impl TextPredicateKind {
    pub fn negate(self) -> Self {
        match self {
            Self::StartingWith => Self::NotStartingWith,
            Self::EndingWith => Self::NotEndingWith,
            Self::Containing => Self::NotContaining,
            Self::NotStartingWith => Self::StartingWith,
            Self::NotEndingWith => Self::EndingWith,
            Self::NotContaining => Self::Containing,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Self::StartingWith => "startingWith",
            Self::EndingWith => "endingWith",
            Self::Containing => "containing",
            Self::NotStartingWith => "notStartingWith",
            Self::NotEndingWith => "notEndingWith",
            Self::NotContaining => "notContaining",
        }
    }
}

impl Display for TextPredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextP.{}", self.operator())
    }
}

impl P {
    pub fn compare(op: ComparisonOp, value: Value) -> Self {
        match op {
            ComparisonOp::Eq => Self::Eq(value),
            ComparisonOp::Neq => Self::Neq(value),
            ComparisonOp::Lt => Self::Lt(value),
            ComparisonOp::Lte => Self::Lte(value),
            ComparisonOp::Gt => Self::Gt(value),
            ComparisonOp::Gte => Self::Gte(value),
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            Self::Eq(_) => "eq",
            Self::Neq(_) => "neq",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Within(_) => "within",
            Self::Without(_) => "without",
            Self::Text(kind, _) => kind.operator(),
        }
    }
}
