#[cfg(feature = "compiler")]
use crate::gremlinc::parser::Rule;
#[cfg(feature = "compiler")]
use pest::{Position, iterators::Pair};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub start: Span,
    pub end: Span,
    pub span: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column: column + 1,
            byte_offset: 0,
        }
    }

    #[cfg(feature = "compiler")]
    pub fn from_pos(pos: &Position) -> Self {
        let (line, column) = pos.line_col();
        Self {
            line,
            column: column + 1,
            byte_offset: pos.pos(),
        }
    }
}

impl Loc {
    pub fn new(start: Span, end: Span, span: String) -> Self {
        Self { start, end, span }
    }

    /// Location of nodes built in code rather than parsed from text.
    pub fn empty() -> Self {
        Self::new(Span::new(1, 1), Span::new(1, 1), "".to_string())
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start.byte_offset..self.end.byte_offset
    }
}

impl Default for Loc {
    fn default() -> Self {
        Self::empty()
    }
}

pub trait HasLoc {
    fn loc(&self) -> Loc;
}

#[cfg(feature = "compiler")]
impl<'a> HasLoc for Pair<'a, Rule> {
    fn loc(&self) -> Loc {
        Loc::new(
            Span::from_pos(&self.as_span().start_pos()),
            Span::from_pos(&self.as_span().end_pos()),
            self.as_span().as_str().to_string(),
        )
    }
}
