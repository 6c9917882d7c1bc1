use crate::gremlinc::{expression::Expression, steps::TextPredicateKind};
#[cfg(feature = "compiler")]
use crate::gremlinc::parser::errors::ParserError;
use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("expression `{expression}` cannot be translated into a traversal")]
    ExpressionNotSupported { expression: Box<Expression> },

    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("text predicate {predicate} is disabled, cannot translate `{expression}`")]
    DisabledTextPredicate {
        predicate: TextPredicateKind,
        expression: Box<Expression>,
    },

    #[error("step label `{0}` is not bound in this query")]
    UnboundStepLabel(String),

    #[error("element type `{0}` is not registered in the graph model")]
    UnknownElement(String),

    #[cfg(feature = "compiler")]
    #[error("{0}")]
    Parse(#[from] ParserError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no executor configured for this environment")]
    NoExecutor,

    #[error("execution failed: {0}")]
    Execution(String),
}

impl QueryError {
    pub fn unsupported(expression: &Expression) -> Self {
        Self::ExpressionNotSupported {
            expression: Box::new(expression.clone()),
        }
    }

    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}
