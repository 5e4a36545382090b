/// Lexer for Strata
///
/// Tokenizes Strata source code into a stream of located tokens. Tokens
/// carry only their text: keywords, identifiers and operators are told
/// apart by the parser.
use crate::ast::SourceLoc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub loc: SourceLoc,
}

impl Token {
    /// String literal tokens keep their quotes so the parser can spot them
    pub fn is_string_literal(&self) -> bool {
        self.text.starts_with('"')
    }

    pub fn is_number_literal(&self) -> bool {
        self.text.starts_with(|c: char| c.is_ascii_digit())
    }

    pub fn is_identifier(&self) -> bool {
        let mut chars = self.text.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

const TWO_CHAR_OPERATORS: [&str; 9] = ["==", "!=", "<=", ">=", "=>", "||", "&&", "++", "--"];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Byte offset of `position` in the original source
    offset: usize,
    line: usize,
    column: usize,
    filename: Arc<str>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::new_with_filename(input, Arc::from("<input>"))
    }

    pub fn new_with_filename(input: &str, filename: Arc<str>) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            filename,
        }
    }

    /// The next token, or `None` once the input is exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            return None;
        }

        let loc = self.current_loc();
        let c = self.peek();

        if c == '"' {
            return Some(self.string_literal(loc));
        }
        if c.is_ascii_digit() {
            return Some(self.number_literal(loc));
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Some(self.identifier(loc));
        }

        if let Some(next) = self.peek_next() {
            let pair: String = [c, next].iter().collect();
            if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                self.advance();
                self.advance();
                return Some(Token { text: pair, loc });
            }
        }

        self.advance();
        Some(Token {
            text: c.to_string(),
            loc,
        })
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn current_loc(&self) -> SourceLoc {
        SourceLoc::new(
            self.line,
            self.column,
            self.offset,
            Arc::clone(&self.filename),
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek_next() == Some('/') {
                // Comment until end of line
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    /// An unterminated string runs to end of input rather than failing.
    fn string_literal(&mut self, loc: SourceLoc) -> Token {
        self.advance(); // consume opening "

        let mut value = String::from('"');
        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if !self.is_at_end() {
                    let escaped = match self.peek() {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        c => c,
                    };
                    value.push(escaped);
                    self.advance();
                }
            } else {
                value.push(self.advance());
            }
        }

        if !self.is_at_end() {
            self.advance(); // consume closing "
        }
        value.push('"');

        Token { text: value, loc }
    }

    fn number_literal(&mut self, loc: SourceLoc) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        // A trailing '.' is only part of the number when digits follow it
        if !self.is_at_end()
            && self.peek() == '.'
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            value.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        Token { text: value, loc }
    }

    fn identifier(&mut self, loc: SourceLoc) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == '_' {
                value.push(self.advance());
            } else {
                break;
            }
        }

        Token { text: value, loc }
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.position += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        Lexer::new(input).map(|t| t.text).collect()
    }

    #[test]
    fn test_let_statement() {
        assert_eq!(
            texts("let x: int = 2 + 3"),
            vec!["let", "x", ":", "int", "=", "2", "+", "3"]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            texts("a==b!=c<=d>=e=>f||g&&h++i--"),
            vec![
                "a", "==", "b", "!=", "c", "<=", "d", ">=", "e", "=>", "f", "||", "g", "&&",
                "h", "++", "i", "--"
            ]
        );
    }

    #[test]
    fn test_double_colon_is_two_tokens() {
        assert_eq!(texts("std::io"), vec!["std", ":", ":", "io"]);
    }

    #[test]
    fn test_single_chars_verbatim() {
        assert_eq!(
            texts("(){}[];,.@"),
            vec!["(", ")", "{", "}", "[", "]", ";", ",", ".", "@"]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(texts("a // comment\nb // trailing"), vec!["a", "b"]);
        assert_eq!(texts("a / b"), vec!["a", "/", "b"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("42 3.14"), vec!["42", "3.14"]);
        // trailing dot without digits stays a separate token
        assert_eq!(texts("7.x"), vec!["7", ".", "x"]);
        assert_eq!(texts("1.2.3"), vec!["1.2", ".", "3"]);
    }

    #[test]
    fn test_no_signed_literals() {
        assert_eq!(texts("-5"), vec!["-", "5"]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(texts(r#""a\nb\tc\rd\"e\qf""#), vec!["\"a\nb\tc\rd\"eqf\""]);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens: Vec<Token> = Lexer::new("let s = \"abc\ndef").collect();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].text, "\"abc\ndef\"");
        assert!(tokens[3].is_string_literal());
    }

    #[test]
    fn test_locations_captured_before_token() {
        let tokens: Vec<Token> = Lexer::new("let x\n  = 5").collect();
        assert_eq!((tokens[0].loc.line, tokens[0].loc.column), (1, 1));
        assert_eq!((tokens[1].loc.line, tokens[1].loc.column), (1, 5));
        assert_eq!((tokens[2].loc.line, tokens[2].loc.column), (2, 3));
        assert_eq!(tokens[3].loc.offset, 10);
    }

    #[test]
    fn test_offsets_are_bytes() {
        let tokens: Vec<Token> = Lexer::new("\"é\" x").collect();
        assert_eq!(tokens[1].loc.offset, 5);
        assert_eq!(tokens[1].loc.column, 5);
    }

    #[test]
    fn test_token_classification() {
        let tokens: Vec<Token> = Lexer::new("foo_1 12 \"s\" +").collect();
        assert!(tokens[0].is_identifier());
        assert!(tokens[1].is_number_literal());
        assert!(tokens[2].is_string_literal());
        assert!(!tokens[3].is_identifier());
    }

    #[test]
    fn test_non_ascii_identifier_chars_are_single_tokens() {
        assert_eq!(texts("aé"), vec!["a", "é"]);
    }
}
