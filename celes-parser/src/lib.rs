//! The celes token tree: a second pass over the base lexer that groups
//! matched brackets into nested tokens and strips comments.

use celes_common::Pos;
use celes_lexer::{Lexer, TokenKind, Whitespace, WsKind};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CelTokenKind {
    Ident,
    Number,
    String,
    Block,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CelToken<'a> {
    /// The full source span; for a block this covers the entire delimited
    /// region including the brackets.
    pub text: &'a str,
    pub kind: CelTokenKind,
    pub pos: Pos,
    pub passed_whitespace: bool,
    /// Nested tokens; non-empty for blocks only.
    pub children: Vec<CelToken<'a>>,
}

impl<'a> CelToken<'a> {
    fn leaf(text: &'a str, kind: CelTokenKind, pos: Pos, passed_whitespace: bool) -> Self {
        Self {
            text,
            kind,
            pos,
            passed_whitespace,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TokenTree<'a> {
    pub tokens: Vec<CelToken<'a>>,
}

impl<'a> TokenTree<'a> {
    pub fn build(input: &'a str) -> Self {
        let mut lex = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = next_token(&mut lex) {
            tokens.push(token);
        }
        Self { tokens }
    }
}

// Byte offset of `part` within `source`; both must come from the same
// buffer.
fn span_start(source: &str, part: &str) -> usize {
    part.as_ptr() as usize - source.as_ptr() as usize
}

fn next_token<'a>(lex: &mut Lexer<'a>) -> Option<CelToken<'a>> {
    let bt = lex.peek_token(Whitespace::Ignore)?;
    let rest = lex.rest_of(&bt).as_bytes();

    match bt.kind {
        TokenKind::Alpha => ident_or_number(lex, CelTokenKind::Ident),
        TokenKind::Digit => ident_or_number(lex, CelTokenKind::Number),
        TokenKind::Other => match rest.first() {
            Some(b'.') if rest.get(1).is_some_and(u8::is_ascii_digit) => {
                ident_or_number(lex, CelTokenKind::Number)
            }
            Some(b'/') => match rest.get(1) {
                Some(b'/') => line_comment_then_token(lex),
                Some(b'*') => {
                    if block_comment(lex) {
                        next_token(lex)
                    } else {
                        None
                    }
                }
                _ => other(lex),
            },
            Some(b'_') => ident_or_number(lex, CelTokenKind::Ident),
            Some(b'{') | Some(b'(') | Some(b'[') => block(lex),
            Some(b'\'') | Some(b'"') => string(lex),
            _ => other(lex),
        },
        // whitespace never surfaces in ignore mode
        _ => None,
    }
}

/// Collects a run of alpha/digit/underscore base tokens with no intervening
/// whitespace. A number run additionally accepts one interior `.`.
fn ident_or_number<'a>(lex: &mut Lexer<'a>, kind: CelTokenKind) -> Option<CelToken<'a>> {
    let mut found_decimal = false;
    let mut run: Option<(usize, usize, Pos, bool)> = None;

    while let Some(bt) = lex.peek_token(Whitespace::Ignore) {
        if bt.kind != TokenKind::Alpha && bt.kind != TokenKind::Digit && !bt.text.starts_with('_') {
            let decimal_start =
                kind == CelTokenKind::Number && !found_decimal && bt.text.starts_with('.');
            if decimal_start {
                found_decimal = true;
            } else {
                break;
            }
        }

        match &mut run {
            None => run = Some((bt.offset, bt.next_offset, bt.pos, bt.passed_whitespace)),
            Some((_, end, _, _)) => {
                if bt.passed_whitespace {
                    break;
                }
                *end = bt.next_offset;
            }
        }
        let _ = lex.get_token(Whitespace::Ignore);
    }

    let (start, end, pos, passed_whitespace) = run?;
    Some(CelToken::leaf(
        &lex.source()[start..end],
        kind,
        pos,
        passed_whitespace,
    ))
}

fn block<'a>(lex: &mut Lexer<'a>) -> Option<CelToken<'a>> {
    let open = lex.get_token(Whitespace::Ignore)?;
    let start = open.offset;
    let mut end = open.next_offset;

    let closer = match open.text.as_bytes().first() {
        Some(b'{') => b'}',
        Some(b'[') => b']',
        _ => b')',
    };

    let mut children = Vec::new();
    let mut closed = false;
    while let Some(sub) = next_token(lex) {
        end = span_start(lex.source(), sub.text) + sub.text.len();
        if sub.text.as_bytes().first() == Some(&closer) {
            closed = true;
            break;
        }
        children.push(sub);
    }
    if !closed {
        return None;
    }

    Some(CelToken {
        text: &lex.source()[start..end],
        kind: CelTokenKind::Block,
        pos: open.pos,
        passed_whitespace: open.passed_whitespace,
        children,
    })
}

fn string<'a>(lex: &mut Lexer<'a>) -> Option<CelToken<'a>> {
    let open = lex.get_token(Whitespace::Ignore)?;
    let start = open.offset;
    let mut end = open.next_offset;
    let delimiter = *open.text.as_bytes().first()?;

    while let Some(bt) = lex.get_token(Whitespace::Parse) {
        end = bt.next_offset;
        if bt.text.as_bytes().first() == Some(&delimiter) {
            return Some(CelToken::leaf(
                &lex.source()[start..end],
                CelTokenKind::String,
                open.pos,
                open.passed_whitespace,
            ));
        } else if bt.text.starts_with('\\') {
            // the escaped token is taken verbatim, delimiters included
            let escaped = lex.get_token(Whitespace::Parse)?;
            end = escaped.next_offset;
        }
    }

    None
}

fn other<'a>(lex: &mut Lexer<'a>) -> Option<CelToken<'a>> {
    let bt = lex.get_token(Whitespace::Ignore)?;
    Some(CelToken::leaf(
        bt.text,
        CelTokenKind::Other,
        bt.pos,
        bt.passed_whitespace,
    ))
}

fn line_comment_then_token<'a>(lex: &mut Lexer<'a>) -> Option<CelToken<'a>> {
    let _ = lex.get_token(Whitespace::Ignore); // /
    let _ = lex.get_token(Whitespace::Ignore); // /

    while let Some(bt) = lex.get_token(Whitespace::Parse) {
        if bt.kind == TokenKind::Whitespace && bt.ws == Some(WsKind::Newline) {
            return next_token(lex);
        }
    }

    None
}

// Consumes a `/* */` comment, recursing on nested ones. Returns false when
// the input ends before the comment closes.
fn block_comment(lex: &mut Lexer<'_>) -> bool {
    let _ = lex.get_token(Whitespace::Ignore); // /
    let _ = lex.get_token(Whitespace::Ignore); // *

    while let Some(bt) = lex.peek_token(Whitespace::Ignore) {
        if bt.kind == TokenKind::Other {
            let rest = lex.rest_of(&bt);
            if rest.starts_with("/*") {
                if !block_comment(lex) {
                    return false;
                }
                continue;
            } else if rest.starts_with("*/") {
                let _ = lex.get_token(Whitespace::Ignore); // *
                let _ = lex.get_token(Whitespace::Ignore); // /
                return true;
            }
        }
        let _ = lex.get_token(Whitespace::Ignore);
    }

    false
}
