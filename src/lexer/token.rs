use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,

    // Keywords
    Def,
    Extern,

    // Complex Types
    Identifier,
    Number,
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text for identifiers, numbers and symbols; empty otherwise.
    pub value: String,
    pub line: usize,
    /// Byte range of the token in the source.
    pub span: (usize, usize),
}

impl Token {
    pub fn new(
        kind: TokenKind,
        value: impl Into<String>,
        line: usize,
        span: (usize, usize),
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            span,
        }
    }

    /// The symbol carried by a `Symbol` token.
    pub fn symbol(&self) -> Option<char> {
        match self.kind {
            TokenKind::Symbol => self.value.chars().next(),
            _ => None,
        }
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.symbol() == Some(symbol)
    }

    /// The text this token was read from.
    pub fn lexeme(&self) -> &str {
        match self.kind {
            TokenKind::Def => "def",
            TokenKind::Extern => "extern",
            _ => &self.value,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::Def | TokenKind::Extern => write!(f, "keyword '{}'", self.lexeme()),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.value),
            TokenKind::Number => write!(f, "number '{}'", self.value),
            TokenKind::Symbol => write!(f, "symbol '{}'", self.value),
        }
    }
}
