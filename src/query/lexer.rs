use std::sync::LazyLock;

use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::CATALOG;

const IDENT_MIN: usize = 2;
const IDENT_MAX: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    EmoteRef(String),
    Number(f64),
    Operator(String),
    Separator,
}

/// What to do with input that matches no token pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexMode {
    /// Whitespace is skipped; anything else unmatched is a [`EmoteError::Lex`].
    #[default]
    Strict,
    /// Unmatched characters are skipped and reported in [`Lexed::skipped`].
    Lenient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    /// Byte ranges dropped in lenient mode, whitespace included.
    pub skipped: Vec<Span>,
}

/// Operator symbols, longest first so that the longest literal wins.
static OPERATOR_SYMBOLS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut symbols: Vec<&'static str> = CATALOG.iter().map(|op| op.symbol).collect();
    symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    symbols
});

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'(' | b')' | b':')
}

fn ident_len(bytes: &[u8]) -> Option<usize> {
    let n = bytes
        .iter()
        .take(IDENT_MAX)
        .take_while(|&&b| is_ident_byte(b))
        .count();
    (n >= IDENT_MIN).then_some(n)
}

/// `[0-9]+\.?[0-9]*`
fn number_len(bytes: &[u8]) -> Option<usize> {
    let int = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if int == 0 {
        return None;
    }
    if bytes.get(int) != Some(&b'.') {
        return Some(int);
    }
    let frac = bytes[int + 1..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    Some(int + 1 + frac)
}

fn operator_at(rest: &str) -> Option<&'static str> {
    OPERATOR_SYMBOLS
        .iter()
        .copied()
        .find(|sym| rest.starts_with(sym))
}

/// Split a query into tokens, scanning left to right and taking the first pattern that
/// matches at each position: identifier, number, separator, operator.
///
/// An identifier candidate made only of digits (or a prefix of a decimal) loses to the number
/// pattern when the number match is at least as long.
pub fn lex(input: &str, mode: LexMode) -> EmoteResult<Lexed> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut skipped: Vec<Span> = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let start = i;
        let rest = &bytes[i..];

        let ident = ident_len(rest);
        let number = number_len(rest);
        let kind = match (ident, number) {
            (Some(il), Some(nl)) if nl >= il => {
                i += nl;
                Some(TokenKind::Number(parse_number(&input[start..i], start)?))
            }
            (Some(il), _) => {
                i += il;
                Some(TokenKind::EmoteRef(input[start..i].to_owned()))
            }
            (None, Some(nl)) => {
                i += nl;
                Some(TokenKind::Number(parse_number(&input[start..i], start)?))
            }
            (None, None) if rest[0] == b',' => {
                i += 1;
                Some(TokenKind::Separator)
            }
            (None, None) => operator_at(&input[start..]).map(|sym| {
                i += sym.len();
                TokenKind::Operator(sym.to_owned())
            }),
        };

        match kind {
            Some(kind) => tokens.push(Token {
                kind,
                span: Span { start, end: i },
            }),
            None => {
                let c = input[start..].chars().next().unwrap_or('\u{fffd}');
                if mode == LexMode::Strict && !c.is_whitespace() {
                    return Err(EmoteError::lex(
                        start,
                        format!("unexpected character '{c}'"),
                    ));
                }
                i += c.len_utf8();
                match skipped.last_mut() {
                    Some(last) if last.end == start => last.end = i,
                    _ => skipped.push(Span { start, end: i }),
                }
            }
        }
    }

    Ok(Lexed { tokens, skipped })
}

fn parse_number(s: &str, offset: usize) -> EmoteResult<f64> {
    s.parse()
        .map_err(|_| EmoteError::lex(offset, format!("invalid number '{s}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/query/lexer.rs"]
mod tests;
