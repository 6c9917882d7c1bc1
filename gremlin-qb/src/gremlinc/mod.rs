//! The expression compiler: expression AST, lambda parser, translator, step model,
//! step-sequence optimizer and serializers.

pub mod analyzer;
pub mod expression;
pub mod location;
pub mod optimizer;
#[cfg(feature = "compiler")]
pub mod parser;
pub mod serializer;
pub mod steps;

#[cfg(test)]
mod tests;
