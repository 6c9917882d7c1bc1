use crate::gremlinc::parser::{ParserError, Rule};
use pest::iterators::{Pair, Pairs};

pub trait PairTools<'a> {
    /// First inner pair, or an error naming the rule that was expected to contain it.
    fn try_inner_next(self) -> Result<Pair<'a, Rule>, ParserError>;
}

impl<'a> PairTools<'a> for Pair<'a, Rule> {
    fn try_inner_next(self) -> Result<Pair<'a, Rule>, ParserError> {
        let rule = self.as_rule();
        self.into_inner()
            .next()
            .ok_or_else(|| ParserError::from(format!("Expected inner pair in {rule:?}")))
    }
}

pub trait PairsTools<'a> {
    fn try_next(&mut self, expected: &str) -> Result<Pair<'a, Rule>, ParserError>;
}

impl<'a> PairsTools<'a> for Pairs<'a, Rule> {
    fn try_next(&mut self, expected: &str) -> Result<Pair<'a, Rule>, ParserError> {
        self.next()
            .ok_or_else(|| ParserError::from(format!("Expected {expected}")))
    }
}
