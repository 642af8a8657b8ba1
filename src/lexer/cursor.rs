use nom::{bytes::complete::take_while, error::Error as NomError, IResult};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("end of buffer reached")]
    EndOfInput,

    #[error("looked for {expected:?} but found {found:?}")]
    UnexpectedRune { expected: char, found: char },
}

/// A saved cursor position, see [`RuneCursor::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: usize,
    line: usize,
}

/// Reads a source buffer one code point at a time.
///
/// The cursor knows nothing about the language; it only tracks a byte offset
/// and the current line so tokens can report where they came from.
pub struct RuneCursor<'a> {
    buffer: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> RuneCursor<'a> {
    pub fn new(buffer: &'a str) -> Self {
        Self {
            buffer,
            pos: 0,
            line: 1,
        }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn rest(&self) -> &'a str {
        &self.buffer[self.pos..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
        }
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
    }

    pub fn peek(&self) -> Result<char, LexError> {
        self.rest().chars().next().ok_or(LexError::EndOfInput)
    }

    pub fn consume(&mut self) -> Result<char, LexError> {
        let next = self.peek()?;
        self.advance(next);
        Ok(next)
    }

    /// Consumes `expected` only if it is the next code point.
    pub fn consume_exact(&mut self, expected: char) -> Result<(), LexError> {
        let found = self.peek()?;
        if found != expected {
            return Err(LexError::UnexpectedRune { expected, found });
        }
        self.advance(found);
        Ok(())
    }

    /// Consumes `text` verbatim. On a mismatch the code points matched so far
    /// stay consumed and the cursor sits on the offending one.
    pub fn consume_literal(&mut self, text: &str) -> Result<(), LexError> {
        text.chars().try_for_each(|expected| self.consume_exact(expected))
    }

    pub fn skip_whitespace(&mut self) {
        self.consume_while(is_whitespace);
    }

    /// Greedily consumes code points matching `predicate` and returns them.
    pub fn consume_while<P>(&mut self, predicate: P) -> &'a str
    where
        P: Fn(char) -> bool,
    {
        let result: IResult<&'a str, &'a str, NomError<&'a str>> =
            take_while(predicate)(self.rest());

        let run = match result {
            Ok((_, run)) => run,
            Err(_) => "",
        };

        self.line += run.matches('\n').count();
        self.pos += run.len();
        run
    }

    fn advance(&mut self, consumed: char) {
        if consumed == '\n' {
            self.line += 1;
        }
        self.pos += consumed.len_utf8();
    }
}

pub fn is_whitespace(val: char) -> bool {
    matches!(val, ' ' | '\t' | '\n' | '\x0c' | '\r')
}
