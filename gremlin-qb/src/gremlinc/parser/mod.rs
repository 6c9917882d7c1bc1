// Copyright 2025 HelixDB Inc.
// SPDX-License-Identifier: AGPL-3.0

//! Parser for lambda expressions such as `t => t.Age == 36 && t.Name.Value.StartsWith("A")`.
//! The grammar lives in `grammar.pest`; the parse methods build the [`Expression`] tree.

use crate::gremlinc::{expression::Expression, parser::errors::ParserError};
use pest::Parser as PestParser;
use pest_derive::Parser;
use utils::PairsTools;

pub mod errors;
pub mod expression_parse_methods;
pub mod utils;

#[derive(Parser)]
#[grammar = "gremlinc/parser/grammar.pest"]
pub struct LambdaParser;

impl LambdaParser {
    /// Parses a whole lambda, `parameter => body`.
    pub fn parse_lambda_source(input: &str) -> Result<Expression, ParserError> {
        let mut pairs = LambdaParser::parse(Rule::source, input)?;
        let source = pairs.try_next("lambda source")?;
        let lambda = source.into_inner().try_next("lambda")?;
        Self::parse_lambda(lambda)
    }
}
