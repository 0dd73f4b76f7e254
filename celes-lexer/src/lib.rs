pub use lex::{Lexer, Token, TokenKind, Whitespace, WsKind};

mod lex;
pub mod utf8;
