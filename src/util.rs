use crate::{lexer::TokenKind, parser::ParseError};

/// Renders a parse error with the offending source line and a caret under the token.
///
/// Falls back to the bare message when the error's token does not belong to `source`.
pub fn render_error(source: &str, error: &ParseError) -> String {
    let token = error.token();
    if source.get(..token.span.0).is_none() {
        return error.to_string();
    }

    let (start, end) = match token.kind {
        // Trailing whitespace, such as the newline a REPL line ends with, is skipped.
        TokenKind::EndOfInput => {
            let anchor = source.trim_end_matches(|c: char| c.is_ascii_whitespace()).len();
            (anchor, anchor)
        }
        _ => token.span,
    };

    let (before, at) = match (source.get(..start), source.get(start..end)) {
        (Some(before), Some(at)) => (before, at),
        _ => return error.to_string(),
    };

    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[start..]
        .find('\n')
        .map_or(source.len(), |i| start + i);
    let column = before[line_start..].chars().count();
    let width = at.chars().count().max(1);

    format!(
        "line {}: {}\n  {}\n  {}{}",
        line,
        error,
        &source[line_start..line_end],
        " ".repeat(column),
        "^".repeat(width)
    )
}
