use celes_common::{Pos, Report, Severity};
use celes_lexer::{Lexer, TokenKind, Whitespace, WsKind};

use crate::value::{Array, Table, Value};


/// First failure of a parse. Sub-parsers return the kind immediately and
/// outer parsers propagate without recovery; the [`Report`] keeps every
/// diagnostic emitted along the way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    Eof,
    Eol,
    UnexpectedText,
    Unimplemented,
    InvalidIdentifier,
    KeyExists,
}

type PResult<T> = Result<T, ParseError>;

const MSG_EOF: &str = "Unexpected end of file";
const MSG_EOL: &str = "Unexpected end of line";
const MSG_UNEXPECTED_TEXT: &str = "Unexpected text";
const MSG_UNICODE_ESCAPE: &str = "Unicode escape codes currently unsupported";
const MSG_INF: &str = "inf is unsupported";
const MSG_NAN: &str = "nan is unsupported";
const MSG_INVALID_IDENT: &str = "Invalid identifier, name already in use by a key of the same name";
const MSG_INVALID_TABLE: &str = "Invalid table assignment, key already in use by non-table";
const MSG_KEY_EXISTS: &str = "Key already exists";

#[derive(Debug)]
pub struct ParseOutcome {
    /// The root table; partially populated when `error` is set.
    pub root: Table,
    pub error: Option<ParseError>,
    pub report: Report,
}

pub fn parse_str(file: &str, input: &str) -> ParseOutcome {
    Parser::new(file, input).parse()
}

pub struct Parser<'a> {
    file: &'a str,
    lex: Lexer<'a>,
    cur_path: Vec<String>,
    /// Table opened by the most recent header; `None` while assignments
    /// still target the root.
    cur_table: Option<Table>,
    root: Table,
    is_table_array: bool,
    report: Report,
}

impl<'a> Parser<'a> {
    pub fn new(file: &'a str, input: &'a str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            file,
            lex: Lexer::new(input),
            cur_path: Vec::new(),
            cur_table: None,
            root: Table::new(),
            is_table_array: false,
            report: Report::new(),
        }
    }

    pub fn parse(mut self) -> ParseOutcome {
        let error = self.parse_all().err();
        ParseOutcome {
            root: self.root,
            error,
            report: self.report,
        }
    }

    fn parse_all(&mut self) -> PResult<()> {
        while let Some(tok) = self.lex.peek_token(Whitespace::Ignore) {
            if tok.ch == Some('[') {
                self.parse_table_header()?;
            } else if tok.ch == Some('#') {
                self.parse_comment();
            } else {
                self.parse_key_pair()?;
            }
        }

        let pos = self.lex.pos();
        match self.commit_current_table() {
            Ok(()) => Ok(()),
            Err(e) => self.error_at(pos, e, MSG_INVALID_TABLE),
        }
    }

    fn error_at<T>(&mut self, pos: Pos, error: ParseError, message: &str) -> PResult<T> {
        self.report.add(self.file, pos, Severity::Error, message);
        Err(error)
    }

    fn fail_eof<T>(&mut self) -> PResult<T> {
        let pos = self.lex.pos();
        self.error_at(pos, ParseError::Eof, MSG_EOF)
    }

    fn fail_eol<T>(&mut self, pos: Pos) -> PResult<T> {
        self.error_at(pos, ParseError::Eol, MSG_EOL)
    }

    fn fail_text<T>(&mut self, pos: Pos) -> PResult<T> {
        self.error_at(pos, ParseError::UnexpectedText, MSG_UNEXPECTED_TEXT)
    }

    /// Skips leading whitespace without consuming the token after it.
    fn pass_whitespace(&mut self) -> bool {
        match self.lex.peek_token(Whitespace::Ignore) {
            Some(tok) => {
                self.lex.reset_to(&tok);
                true
            }
            None => false,
        }
    }

    fn next_char_is_digit(&mut self, base: u32) -> PResult<()> {
        let Some(tok) = self.lex.peek_char() else {
            return self.fail_eof();
        };
        let is_digit = tok.kind == TokenKind::Digit
            || (base == 16 && tok.ch.is_some_and(|c| c.is_ascii_hexdigit()));
        if !is_digit {
            return self.fail_text(tok.pos);
        }
        Ok(())
    }

    fn expect_next_char(&mut self, ch: char, ws: Whitespace) -> PResult<()> {
        let Some(tok) = self.lex.get_token(ws) else {
            return self.fail_eof();
        };
        if tok.passed_newline {
            return self.fail_eol(tok.pos);
        }
        if tok.ch == Some(ch) {
            Ok(())
        } else {
            self.fail_text(tok.pos)
        }
    }

    fn parse_escape_code(&mut self, out: &mut String) -> PResult<()> {
        let Some(tok) = self.lex.get_char() else {
            return self.fail_eof();
        };
        match tok.ch {
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{C}'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('u') | Some('U') => {
                return self.error_at(tok.pos, ParseError::Unimplemented, MSG_UNICODE_ESCAPE)
            }
            _ => return self.fail_text(tok.pos),
        }
        Ok(())
    }

    fn parse_string(&mut self, out: &mut String) -> PResult<()> {
        let Some(open) = self.lex.get_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };
        if self.lex.rest_of(&open).starts_with("\"\"\"") {
            return self.parse_multiline_string(out);
        }

        while let Some(tok) = self.lex.get_token(Whitespace::Parse) {
            if tok.ws == Some(WsKind::Newline) {
                return self.fail_eol(tok.pos);
            }
            if tok.ch == Some('\\') {
                self.parse_escape_code(out)?;
            } else if tok.ch == Some('"') {
                return Ok(());
            } else {
                out.push_str(tok.text);
            }
        }

        self.fail_eof()
    }

    fn parse_multiline_string(&mut self, out: &mut String) -> PResult<()> {
        let _ = self.lex.get_token(Whitespace::Parse); // "
        let _ = self.lex.get_token(Whitespace::Parse); // "

        while let Some(tok) = self.lex.get_token(Whitespace::Parse) {
            if tok.ch == Some('\\') {
                self.parse_escape_code(out)?;
            } else if self.lex.rest_of(&tok).starts_with("\"\"\"") {
                let _ = self.lex.get_char(); // "
                let _ = self.lex.get_char(); // "
                return Ok(());
            } else {
                out.push_str(tok.text);
            }
        }

        self.fail_eof()
    }

    fn parse_string_literal(&mut self, out: &mut String) -> PResult<()> {
        let Some(open) = self.lex.get_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };
        if self.lex.rest_of(&open).starts_with("'''") {
            return self.parse_multiline_string_literal(out);
        }

        while let Some(tok) = self.lex.get_token(Whitespace::Parse) {
            if tok.ws == Some(WsKind::Newline) {
                return self.fail_eol(tok.pos);
            }
            if tok.ch == Some('\'') {
                return Ok(());
            }
            out.push_str(tok.text);
        }

        self.fail_eof()
    }

    fn parse_multiline_string_literal(&mut self, out: &mut String) -> PResult<()> {
        let _ = self.lex.get_token(Whitespace::Parse); // '
        let _ = self.lex.get_token(Whitespace::Parse); // '

        while let Some(tok) = self.lex.get_token(Whitespace::Parse) {
            if self.lex.rest_of(&tok).starts_with("'''") {
                let _ = self.lex.get_char(); // '
                let _ = self.lex.get_char(); // '
                return Ok(());
            }
            out.push_str(tok.text);
        }

        self.fail_eof()
    }

    fn parse_number(&mut self) -> PResult<Value> {
        let mut digits = String::new();
        let mut found_decimal = false;
        let mut found_exponent = false;
        let mut found_number = false;
        let mut base = 10u32;

        let Some(mut tok) = self.lex.peek_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };

        if tok.ch == Some('-') || tok.ch == Some('+') {
            self.lex.pass(&tok);
            if tok.ch == Some('-') {
                digits.push('-');
            }
            match self.lex.peek_token(Whitespace::Parse) {
                Some(t) => tok = t,
                None => return self.fail_eof(),
            }
        }

        let prefix = self.lex.rest_of(&tok).get(0..2).unwrap_or("");
        if prefix.eq_ignore_ascii_case("0b") {
            base = 2;
        } else if prefix.eq_ignore_ascii_case("0o") {
            base = 8;
        } else if prefix.eq_ignore_ascii_case("0x") {
            base = 16;
        }

        if base != 10 {
            self.lex.pass(&tok);
            let _ = self.lex.get_char(); // the radix letter
        } else if tok.text == "inf" {
            return self.error_at(tok.pos, ParseError::Unimplemented, MSG_INF);
        } else if tok.text == "nan" {
            return self.error_at(tok.pos, ParseError::Unimplemented, MSG_NAN);
        }

        while let Some(tok) = self.lex.peek_char() {
            match tok.kind {
                TokenKind::Whitespace => {
                    if !digits.is_empty() {
                        break;
                    }
                }
                TokenKind::Digit => {
                    found_number = true;
                    digits.push_str(tok.text);

                    let digit = tok.ch.map_or(0, |c| c as u32).wrapping_sub('0' as u32);
                    if digit >= base {
                        return self.fail_text(tok.pos);
                    }
                }
                TokenKind::Alpha => {
                    let lower = tok.ch.map(|c| c.to_ascii_lowercase());
                    if base == 10 && found_number && !found_exponent && lower == Some('e') {
                        found_exponent = true;
                        digits.push('e');
                        self.lex.pass(&tok);

                        let Some(sign) = self.lex.peek_char() else {
                            return self.fail_eof();
                        };
                        if sign.ch == Some('+') || sign.ch == Some('-') {
                            self.lex.pass(&sign);
                            digits.push_str(sign.text);
                        }

                        self.next_char_is_digit(10)?;
                        continue;
                    } else if base == 16 {
                        match lower {
                            Some('a'..='f') => digits.push_str(tok.text),
                            _ => return self.fail_text(tok.pos),
                        }
                    } else {
                        return self.fail_text(tok.pos);
                    }
                }
                TokenKind::Other => {
                    if tok.ch == Some('.')
                        && base == 10
                        && found_number
                        && !found_decimal
                        && !found_exponent
                    {
                        found_decimal = true;
                        digits.push('.');
                        self.lex.pass(&tok);
                        self.next_char_is_digit(10)?;
                        continue;
                    } else if tok.ch == Some('_') {
                        self.lex.pass(&tok);
                        self.next_char_is_digit(base)?;
                        continue;
                    } else {
                        return self.fail_text(tok.pos);
                    }
                }
            }

            self.lex.pass(&tok);
        }

        if digits.is_empty() {
            return self.fail_eof();
        }

        if found_decimal || found_exponent {
            Ok(Value::Real(digits.parse().unwrap_or(0.0)))
        } else {
            Ok(Value::Integer(
                i64::from_str_radix(&digits, base).unwrap_or(0),
            ))
        }
    }

    fn parse_comment(&mut self) {
        while let Some(tok) = self.lex.get_token(Whitespace::Parse) {
            if tok.ws == Some(WsKind::Newline) {
                return;
            }
        }
    }

    fn parse_singular_identifier(&mut self, delimiter: char) -> PResult<String> {
        let mut id = String::new();
        let mut first = true;

        let Some(tok) = self.lex.peek_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };

        if tok.ch == Some('"') {
            self.parse_string(&mut id)?;
            return Ok(id);
        } else if tok.ch == Some('\'') {
            self.parse_string_literal(&mut id)?;
            return Ok(id);
        }

        while let Some(tok) = self.lex.peek_token(Whitespace::Ignore) {
            if tok.passed_newline {
                return self.fail_eol(tok.pos);
            }
            if !first && tok.passed_whitespace {
                return Ok(id);
            }
            if tok.ch == Some(delimiter) {
                return Ok(id);
            }
            if tok.ch == Some('.') {
                return Ok(id);
            }

            if tok.kind != TokenKind::Alpha
                && tok.kind != TokenKind::Digit
                && tok.ch != Some('_')
                && tok.ch != Some('-')
            {
                return self.fail_text(tok.pos);
            }

            first = false;
            let _ = self.lex.get_token(Whitespace::Ignore);
            id.push_str(tok.text);
        }

        self.fail_eof()
    }

    fn parse_identifier(&mut self, delimiter: char) -> PResult<Vec<String>> {
        let mut path = Vec::new();

        if delimiter == '=' && !self.pass_whitespace() {
            return self.fail_eof();
        }

        loop {
            let segment = self.parse_singular_identifier(delimiter)?;
            path.push(segment);

            let Some(tok) = self.lex.peek_token(Whitespace::Ignore) else {
                return self.fail_eof();
            };
            if tok.passed_newline {
                return self.fail_eol(tok.pos);
            }

            if tok.ch == Some('.') {
                let _ = self.lex.get_token(Whitespace::Ignore);
                let Some(next) = self.lex.peek_token(Whitespace::Ignore) else {
                    return self.fail_eof();
                };
                if next.passed_newline {
                    return self.fail_eol(next.pos);
                }
            } else {
                if tok.passed_whitespace && tok.ch != Some(delimiter) {
                    return self.fail_text(tok.pos);
                }
                return Ok(path);
            }
        }
    }

    fn parse_value(&mut self) -> PResult<Value> {
        let Some(tok) = self.lex.peek_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };
        if tok.passed_newline {
            return self.fail_eol(tok.pos);
        }

        if tok.text == "true" {
            self.lex.pass(&tok);
            return Ok(Value::Boolean(true));
        }
        if tok.text == "false" {
            self.lex.pass(&tok);
            return Ok(Value::Boolean(false));
        }
        if tok.ch == Some('[') || tok.ch == Some('{') {
            // inline arrays and tables
            return Err(ParseError::Unimplemented);
        }
        if tok.ch == Some('"') {
            let mut s = String::new();
            self.parse_string(&mut s)?;
            return Ok(Value::String(s));
        }
        if tok.ch == Some('\'') {
            let mut s = String::new();
            self.parse_string_literal(&mut s)?;
            return Ok(Value::String(s));
        }
        if tok.ch == Some('+') || tok.ch == Some('-') {
            return self.parse_number();
        }
        if tok.text == "inf" {
            return self.error_at(tok.pos, ParseError::Unimplemented, MSG_INF);
        }
        if tok.text == "nan" {
            return self.error_at(tok.pos, ParseError::Unimplemented, MSG_NAN);
        }
        if tok.kind == TokenKind::Digit {
            return self.parse_number();
        }

        self.fail_text(tok.pos)
    }

    fn parse_key_pair(&mut self) -> PResult<()> {
        let path = self.parse_identifier('=')?;

        self.expect_next_char('=', Whitespace::Ignore)?;

        let Some(tok) = self.lex.peek_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };
        if tok.passed_newline {
            return self.fail_eol(tok.pos);
        }
        let pos = tok.pos;

        let value = self.parse_value()?;

        let target = match self.cur_table.as_mut() {
            Some(table) => table,
            None => &mut self.root,
        };
        match insert_key_value(target, &path, value) {
            Ok(()) => Ok(()),
            Err(e @ ParseError::KeyExists) => self.error_at(pos, e, MSG_KEY_EXISTS),
            Err(e) => self.error_at(pos, e, MSG_INVALID_IDENT),
        }
    }

    fn parse_table_header(&mut self) -> PResult<()> {
        let _ = self.lex.get_token(Whitespace::Ignore); // [

        let Some(tok) = self.lex.peek_token(Whitespace::Ignore) else {
            return self.fail_eof();
        };
        let header_pos = tok.pos;

        let table_array = tok.ch == Some('[');
        if table_array && self.lex.get_token(Whitespace::Ignore).is_none() {
            return self.fail_eof();
        }

        let path = self.parse_identifier(']')?;

        if table_array {
            self.expect_next_char(']', Whitespace::Ignore)?;
        }
        self.expect_next_char(']', Whitespace::Ignore)?;

        if let Err(e) = self.commit_current_table() {
            return self.error_at(header_pos, e, MSG_INVALID_TABLE);
        }

        self.cur_table = Some(Table::new());
        self.cur_path = path;
        self.is_table_array = table_array;
        Ok(())
    }

    /// Inserts the table opened by the previous header into the root at its
    /// recorded path. A no-op while assignments still target the root.
    fn commit_current_table(&mut self) -> Result<(), ParseError> {
        let Some(table) = self.cur_table.take() else {
            return Ok(());
        };
        let Some((leaf, parents)) = self.cur_path.split_last() else {
            return Err(ParseError::InvalidIdentifier);
        };

        let mut cur = &mut self.root;
        for key in parents {
            cur = match header_child(cur, key) {
                Some(next) => next,
                None => return Err(ParseError::InvalidIdentifier),
            };
        }

        if self.is_table_array {
            match cur.get_mut(leaf) {
                None => {
                    let mut array = Array::default();
                    array.push(Value::Table(table));
                    cur.insert(leaf, Value::Array(array));
                }
                Some(Value::Array(array)) => {
                    if !matches!(array.first(), Some(Value::Table(_))) {
                        return Err(ParseError::InvalidIdentifier);
                    }
                    array.push(Value::Table(table));
                }
                Some(_) => return Err(ParseError::InvalidIdentifier),
            }
        } else {
            if cur.get(leaf).is_some() {
                return Err(ParseError::InvalidIdentifier);
            }
            cur.insert(leaf, Value::Table(table));
        }

        Ok(())
    }
}

/// Walks `parents` from `table`, creating empty tables along any missing
/// prefix, and assigns `value` under the final path segment. Fails when a
/// prefix resolves to a non-table or the leaf is already bound.
fn insert_key_value(table: &mut Table, path: &[String], value: Value) -> Result<(), ParseError> {
    let Some((leaf, parents)) = path.split_last() else {
        return Err(ParseError::InvalidIdentifier);
    };

    let mut cur = table;
    for key in parents {
        cur = match child_table(cur, key) {
            Some(next) => next,
            None => return Err(ParseError::InvalidIdentifier),
        };
    }

    if cur.get(leaf).is_some() {
        return Err(ParseError::KeyExists);
    }
    cur.insert(leaf, value);
    Ok(())
}

fn child_table<'t>(table: &'t mut Table, key: &str) -> Option<&'t mut Table> {
    if table.get(key).is_none() {
        table.insert(key, Value::Table(Table::new()));
    }
    match table.get_mut(key) {
        Some(Value::Table(sub)) => Some(sub),
        _ => None,
    }
}

// Like `child_table`, but a table-array prefix resolves to its most
// recently appended element.
fn header_child<'t>(table: &'t mut Table, key: &str) -> Option<&'t mut Table> {
    if table.get(key).is_none() {
        table.insert(key, Value::Table(Table::new()));
    }
    match table.get_mut(key) {
        Some(Value::Table(sub)) => Some(sub),
        Some(Value::Array(array)) => match array.last_mut() {
            Some(Value::Table(sub)) => Some(sub),
            _ => None,
        },
        _ => None,
    }
}
