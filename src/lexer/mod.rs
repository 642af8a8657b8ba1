pub mod cursor;
pub mod token;

pub use cursor::{Checkpoint, LexError, RuneCursor};
pub use token::{Token, TokenKind};

use tracing::trace;

/// Splits source text into tokens on demand.
///
/// Tokenizing never fails: running out of input is reported as an
/// `EndOfInput` token, and anything that is not a word, a number or a comment
/// becomes a one code point `Symbol`.
pub struct Tokenizer<'a> {
    cursor: RuneCursor<'a>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: RuneCursor::new(source),
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.cursor.skip_whitespace();

            let start = self.cursor.offset();
            let line = self.cursor.line();

            let next = match self.cursor.peek() {
                Ok(next) => next,
                Err(_) => return self.emit(TokenKind::EndOfInput, "", start, line),
            };

            if next == '#' {
                self.cursor.consume_while(|c| c != '\n');
                continue;
            }

            if is_alphabetic(next) {
                let word = self.cursor.consume_while(is_alphanumeric);
                return match word {
                    "def" => self.emit(TokenKind::Def, "", start, line),
                    "extern" => self.emit(TokenKind::Extern, "", start, line),
                    _ => self.emit(TokenKind::Identifier, word, start, line),
                };
            }

            if is_numeral(next) {
                // Accepts things like "1.2.3"; whoever turns the text into a float validates it.
                let number = self.cursor.consume_while(is_number_rune);
                return self.emit(TokenKind::Number, number, start, line);
            }

            return match self.cursor.consume() {
                Ok(symbol) => self.emit(TokenKind::Symbol, symbol.to_string(), start, line),
                Err(_) => self.emit(TokenKind::EndOfInput, "", start, line),
            };
        }
    }

    fn emit(&self, kind: TokenKind, value: impl Into<String>, start: usize, line: usize) -> Token {
        let token = Token::new(kind, value, line, (start, self.cursor.offset()));
        trace!(kind = ?token.kind, value = %token.value, line, "token");
        token
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    /// Yields every token up to and including a single `EndOfInput`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::EndOfInput {
            self.finished = true;
        }

        Some(token)
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).collect()
}

fn is_alphabetic(val: char) -> bool {
    val.is_ascii_alphabetic()
}

fn is_alphanumeric(val: char) -> bool {
    val.is_ascii_alphanumeric()
}

fn is_numeral(val: char) -> bool {
    val.is_ascii_digit()
}

fn is_number_rune(val: char) -> bool {
    is_numeral(val) || val == '.'
}
