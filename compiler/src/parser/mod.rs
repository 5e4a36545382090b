/// Parser for Strata
///
/// Hand-written lexer and recursive descent parser producing `ast::Program`.
mod lexer;
mod parse;

pub use lexer::{Lexer, Token};
pub use parse::{ParseError, ParseResult, Parser};
