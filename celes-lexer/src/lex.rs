use celes_common::Pos;

use crate::utf8;


/*
 * A base token is one of four things:
 *   1.) a run of alphabetic characters
 *   2.) a run of numeric characters
 *   3.) a single whitespace character if whitespace is not ignored
 *   4.) a single character that does not fall into the above categories
 */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Alpha,
    Digit,
    Whitespace,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WsKind {
    Tab,
    Space,
    Newline,
}

/// Whether runs of whitespace collapse into separators (`Ignore`) or
/// surface as their own tokens (`Parse`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whitespace {
    Parse,
    Ignore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// The decoded code point iff the token is a single code point.
    pub ch: Option<char>,
    pub kind: TokenKind,
    /// Set only when the token itself is whitespace.
    pub ws: Option<WsKind>,
    /// Whitespace was skipped immediately before this token.
    pub passed_whitespace: bool,
    /// Any of that skipped whitespace was a newline.
    pub passed_newline: bool,
    pub pos: Pos,
    /// Byte offset of the token's first byte.
    pub offset: usize,
    /// Cursor state to restore when committing this token.
    pub next_offset: usize,
    pub next_pos: Pos,
}

fn is_newline(ch: char) -> bool {
    ch == '\r' || ch == '\n'
}

fn is_newline_pair(ch1: char, ch2: char) -> bool {
    (ch1 == '\r' && ch2 == '\n') || (ch1 == '\n' && ch2 == '\r')
}

fn kind_of(ch: char) -> TokenKind {
    if ch.is_whitespace() {
        TokenKind::Whitespace
    } else if ch.is_ascii_digit() {
        TokenKind::Digit
    } else if ch.is_ascii_alphabetic() || ch as u32 >= 0x80 {
        TokenKind::Alpha
    } else {
        TokenKind::Other
    }
}

/// A cursor over UTF-8 text with memoized look-ahead: `peek_*` runs the
/// scanner and restores the cursor, `get_*` commits, and the returned token
/// carries the committed cursor state so callers can peek, inspect, and
/// then [`pass`](Lexer::pass) without rescanning.
#[derive(Debug)]
pub struct Lexer<'a> {
    text: &'a str,
    offset: usize,
    pos: Pos,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            pos: Pos::START,
        }
    }

    pub fn source(&self) -> &'a str {
        self.text
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rewinds the cursor to the start of the input.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.pos = Pos::START;
    }

    /// Moves the cursor back to the token's first byte.
    pub fn reset_to(&mut self, token: &Token<'a>) {
        self.offset = token.offset;
        self.pos = token.pos;
    }

    /// Jumps the cursor to the token's committed end.
    pub fn pass(&mut self, token: &Token<'a>) {
        self.offset = token.next_offset;
        self.pos = token.next_pos;
    }

    /// Raw text from the token's first byte to the end of the input.
    pub fn rest_of(&self, token: &Token<'a>) -> &'a str {
        &self.text[token.offset..]
    }

    pub fn peek_token(&mut self, ws: Whitespace) -> Option<Token<'a>> {
        self.scan_token(ws, false)
    }

    pub fn get_token(&mut self, ws: Whitespace) -> Option<Token<'a>> {
        self.scan_token(ws, true)
    }

    pub fn peek_char(&mut self) -> Option<Token<'a>> {
        self.scan_char(false)
    }

    pub fn get_char(&mut self) -> Option<Token<'a>> {
        self.scan_char(true)
    }

    fn scan_token(&mut self, ws_mode: Whitespace, commit: bool) -> Option<Token<'a>> {
        let bytes = self.text.as_bytes();
        let mut offset = self.offset;
        let mut prev = offset;
        let mut pos = self.pos;

        let mut token_start = None;
        let mut start_pos = pos;
        let mut out_ch = '\0';
        let mut kind = None;
        let mut ws_kind = None;
        let mut passed_whitespace = false;
        let mut passed_newline = false;
        let ignore_whitespace = ws_mode == Whitespace::Ignore;
        let mut stop = false;
        let mut count = 0usize;

        while !stop {
            let Some((ch, len)) = utf8::next(bytes, offset) else {
                break;
            };
            offset += len;
            let new_kind = kind_of(ch);

            match kind {
                None => {
                    let mut skip = false;

                    if new_kind == TokenKind::Whitespace {
                        passed_whitespace = true;
                        if is_newline(ch) {
                            passed_newline = true;
                        }

                        if ignore_whitespace {
                            skip = true;
                        } else {
                            ws_kind = if is_newline(ch) {
                                Some(WsKind::Newline)
                            } else if ch == '\t' {
                                Some(WsKind::Tab)
                            } else if ch == ' ' {
                                Some(WsKind::Space)
                            } else {
                                None
                            };
                        }
                    }

                    if !skip {
                        out_ch = ch;
                        token_start = Some(prev);
                        kind = Some(new_kind);
                        start_pos = pos;

                        if new_kind != TokenKind::Digit && new_kind != TokenKind::Alpha {
                            stop = true;
                        }
                        count += 1;
                    }
                }
                Some(k) if k != new_kind => {
                    offset = prev;
                    break;
                }
                Some(_) => count += 1,
            }

            if is_newline(ch) {
                if let Some((next_ch, next_len)) = utf8::next(bytes, offset) {
                    if is_newline_pair(ch, next_ch) {
                        offset += next_len;
                    }
                }
                pos.row += 1;
                pos.col = 1;
            } else {
                pos.col += 1;
            }

            prev = offset;
        }

        if commit {
            self.offset = offset;
            self.pos = pos;
        }

        let start = token_start?;
        if offset <= start {
            return None;
        }
        Some(Token {
            text: &self.text[start..offset],
            ch: (count == 1).then_some(out_ch),
            kind: kind?,
            ws: ws_kind,
            passed_whitespace,
            passed_newline,
            pos: start_pos,
            offset: start,
            next_offset: offset,
            next_pos: pos,
        })
    }

    fn scan_char(&mut self, commit: bool) -> Option<Token<'a>> {
        let bytes = self.text.as_bytes();
        let start = self.offset;
        let start_pos = self.pos;

        let (ch, len) = utf8::next(bytes, start)?;
        let mut offset = start + len;
        let mut pos = start_pos;
        pos.col += 1;

        let kind = kind_of(ch);
        let mut ws_kind = None;
        if kind == TokenKind::Whitespace {
            if is_newline(ch) {
                if let Some((next_ch, next_len)) = utf8::next(bytes, offset) {
                    if is_newline_pair(ch, next_ch) {
                        offset += next_len;
                    }
                }
                ws_kind = Some(WsKind::Newline);
                pos = Pos::new(start_pos.row + 1, 1);
            } else if ch == '\t' {
                ws_kind = Some(WsKind::Tab);
            } else if ch == ' ' {
                ws_kind = Some(WsKind::Space);
            }
        }

        if commit {
            self.offset = offset;
            self.pos = pos;
        }

        Some(Token {
            text: &self.text[start..offset],
            ch: Some(ch),
            kind,
            ws: ws_kind,
            passed_whitespace: false,
            passed_newline: false,
            pos: start_pos,
            offset: start,
            next_offset: offset,
            next_pos: pos,
        })
    }
}
