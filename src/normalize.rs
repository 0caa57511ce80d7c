//! Raw text → logical lines.
//!
//! Raw text is split on single line-break characters with the delimiters kept
//! as tokens, so a `\r\n` terminator shows up as two delimiter tokens with an
//! empty content token between them. [`normalize`] folds that token stream back
//! into exactly one string per logical line.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r|\n").expect("line break pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Content(&'a str),
    Break(&'a str),
}

fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in LINE_BREAK.find_iter(raw) {
        tokens.push(Token::Content(&raw[last..m.start()]));
        tokens.push(Token::Break(m.as_str()));
        last = m.end();
    }
    tokens.push(Token::Content(&raw[last..]));
    tokens
}

/// Split `raw` into logical lines.
///
/// `\n`, `\r` and `\r\n` each end one line. Empty lines are preserved, and a
/// trailing terminator yields a trailing empty line. `""` is one empty line.
pub fn normalize(raw: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    // Set after a `\r` break; a directly following `\n` belongs to it.
    let mut charged = false;

    for token in tokenize(raw) {
        match token {
            Token::Content("") => {}
            Token::Content(text) => {
                charged = false;
                current.push_str(text);
            }
            Token::Break("\n") if charged => charged = false,
            Token::Break(delimiter) => {
                lines.push(std::mem::take(&mut current));
                charged = delimiter == "\r";
            }
        }
    }
    lines.push(current);
    lines
}

/// Whether `text` contains a line-break character.
pub fn has_line_break(text: &str) -> bool {
    text.contains(['\r', '\n'])
}
