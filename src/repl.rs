use std::{
    io,
    io::{stdin, stdout, BufRead, Write},
};

use crate::{eval::Evaluator, util::render_error, Error};

pub const PROMPT: &str = "kaleido> ";

pub fn start() -> io::Result<()> {
    let mut buffer = String::new();
    let mut evaluator = Evaluator::new();

    let stdin = stdin();

    let mut stdout = stdout();

    loop {
        write!(stdout, "{}", PROMPT)?;

        stdout.flush()?;

        if stdin.lock().read_line(&mut buffer)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }

        match evaluator.eval_source(&buffer) {
            Ok(values) => {
                for value in values {
                    writeln!(stdout, "{}", value)?;
                }
            }
            Err(Error::Parse(e)) => writeln!(stdout, "{}", render_error(&buffer, &e))?,
            Err(Error::Eval(e)) => writeln!(stdout, "error: {}", e)?,
        }

        buffer.clear();
    }
}
