use thiserror::Error;

pub mod eval;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod util;

pub use eval::{EvalError, Evaluator};
pub use parser::{parse_program, ParseError, ENTRY_FUNCTION_NAME};

/// Anything that can go wrong between reading a line of source and getting values back.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
