/// Recursive descent parser for Strata
///
/// Statements are recognised by their leading keyword; binary operators
/// are parsed by precedence climbing over `binary_precedence`.
use crate::ast::types::parse_type_annotation;
use crate::ast::{Callee, Expr, FunctionDecl, Literal, Param, Program, SourceLoc, Stmt, TypeDef};
use crate::parser::lexer::{Lexer, Token};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

pub type ParseResult<T> = Result<T, ParseError>;

const MAX_NESTING_DEPTH: usize = 100;

const KEYWORDS: [&str; 14] = [
    "import", "let", "const", "var", "func", "if", "else", "while", "for", "return", "break",
    "continue", "true", "false",
];

const UNARY_OPERATORS: [&str; 4] = ["!", "-", "+", "~"];

/// Binding power of a binary operator; higher binds tighter
fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "==" | "!=" => Some(3),
        "<" | ">" | "<=" | ">=" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    nesting_depth: usize,
    /// Where "end of input" errors point
    end_loc: SourceLoc,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self::new_with_filename(input, "<input>")
    }

    pub fn new_with_filename(input: &str, filename: &str) -> Self {
        let filename: Arc<str> = Arc::from(filename);
        let tokens = Lexer::new_with_filename(input, Arc::clone(&filename)).tokenize();
        Self::from_tokens(tokens, filename, input)
    }

    fn from_tokens(tokens: Vec<Token>, filename: Arc<str>, input: &str) -> Self {
        let line = input.matches('\n').count() + 1;
        let column = input.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Parser {
            tokens,
            current: 0,
            nesting_depth: 0,
            end_loc: SourceLoc::new(line, column, input.len(), filename),
        }
    }

    /// Parse the whole token stream; the first syntax error aborts.
    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.check(";") {
                self.advance();
                continue;
            }
            if self.check("}") {
                return Err(self.error("Unexpected '}' outside of a block"));
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_text() {
            Some("import") => self.parse_import(),
            Some("let") | Some("const") | Some("var") => self.parse_let(),
            Some("func") => self.parse_function(),
            Some("if") => self.parse_if(),
            Some("while") => self.parse_while(),
            Some("for") => self.parse_for(),
            Some("return") => self.parse_return(),
            Some("break") => {
                let loc = self.advance_loc();
                Ok(Stmt::Break { loc })
            }
            Some("continue") => {
                let loc = self.advance_loc();
                Ok(Stmt::Continue { loc })
            }
            _ => self.parse_simple_statement(),
        }
    }

    /// `import NAME from a::b::c`
    fn parse_import(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        let (binding, _) = self.expect_identifier("module binding name")?;
        self.expect("from")?;

        let (mut module_path, _) = self.expect_identifier("module path")?;
        while self.check(":") && self.check_at(1, ":") {
            self.advance();
            self.advance();
            let (segment, _) = self.expect_identifier("module path segment")?;
            module_path.push_str("::");
            module_path.push_str(&segment);
        }

        Ok(Stmt::Import {
            binding,
            module_path,
            loc,
        })
    }

    /// `let|const|var NAME [: TYPE] [= EXPR]`
    fn parse_let(&mut self) -> ParseResult<Stmt> {
        let loc = self.current_loc();
        let mutable = self.advance().is_some_and(|t| t.text == "var");
        let (name, _) = self.expect_identifier("variable name")?;

        let ty = if self.check(":") {
            self.advance();
            self.parse_type()?
        } else {
            TypeDef::ANY
        };

        let value = if self.check("=") {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Stmt::Let {
            name,
            ty,
            value,
            mutable,
            loc,
        })
    }

    /// `func NAME(p: T, ...) [=> RET] { ... }`
    fn parse_function(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        let (name, _) = self.expect_identifier("function name")?;

        self.expect("(")?;
        let mut params = Vec::new();
        while !self.check(")") {
            let (param_name, _) = self.expect_identifier("parameter name")?;
            let ty = if self.check(":") {
                self.advance();
                self.parse_type()?
            } else {
                TypeDef::ANY
            };
            params.push(Param {
                name: param_name,
                ty,
            });

            if self.check(",") {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(")")?;

        let return_type = if self.check("=>") {
            self.advance();
            self.parse_type()?
        } else {
            TypeDef::ANY
        };

        let body = self.parse_block()?;

        Ok(Stmt::Function(Arc::new(FunctionDecl {
            name,
            params,
            return_type,
            body,
            loc,
        })))
    }

    /// `if COND { ... } [else if ... | else { ... }]`
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.check("else") {
            self.advance();
            if self.check("if") {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            loc,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            loc,
        })
    }

    /// `for ([init]; [cond]; [update]) { ... }`
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        self.expect("(")?;

        let init = if self.check(";") {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(";")?;

        let condition = if self.check(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(";")?;

        let update = if self.check(")") {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(")")?;

        let body = self.parse_block()?;

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            loc,
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let loc = self.advance_loc();
        let value = if self.is_at_end() || self.check("}") || self.check(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Stmt::Return { value, loc })
    }

    /// A declaration, an assignment, or a bare expression statement
    fn parse_simple_statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self.peek_text(), Some("let") | Some("const") | Some("var")) {
            return self.parse_let();
        }

        let loc = self.current_loc();
        let expr = self.parse_expression()?;

        if self.check("=") {
            let target = self.assignment_target(&expr, "=")?;
            self.advance();
            let value = self.parse_expression()?;
            return Ok(Stmt::Assignment { target, value, loc });
        }

        // x++ / x-- are sugar for x = x + 1 / x = x - 1
        if self.check("++") || self.check("--") {
            let op = if self.check("++") { "+" } else { "-" };
            let target = self.assignment_target(&expr, op)?;
            let op_loc = self.advance_loc();
            let value = Expr::Binary {
                op: op.to_string(),
                left: Box::new(expr),
                right: Box::new(Expr::Literal {
                    value: Literal::Int(1),
                    loc: op_loc.clone(),
                }),
                loc: op_loc,
            };
            return Ok(Stmt::Assignment { target, value, loc });
        }

        Ok(Stmt::Expression { expr, loc })
    }

    fn assignment_target(&self, expr: &Expr, op: &str) -> ParseResult<String> {
        match expr {
            Expr::Identifier { name, .. } => Ok(name.clone()),
            other => Err(Self::error_at(
                other.loc(),
                &format!("Invalid target for '{}': only plain variables can be assigned", op),
            )),
        }
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.enter_nesting()?;
        let result = self.parse_block_inner();
        self.exit_nesting();
        result
    }

    fn parse_block_inner(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect("{")?;
        let mut statements = Vec::new();
        while !self.check("}") {
            if self.is_at_end() {
                return Err(self.error("Expected '}', found end of input"));
            }
            if self.check(";") {
                self.advance();
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect("}")?;
        Ok(statements)
    }

    /// A type name with optional `?` suffixes, `|`-separated for unions
    fn parse_type(&mut self) -> ParseResult<TypeDef> {
        let mut annotation = String::new();
        loop {
            let (name, _) = self.expect_identifier("type name")?;
            annotation.push_str(&name);
            while self.check("?") {
                self.advance();
                annotation.push('?');
            }
            if self.check("|") {
                self.advance();
                annotation.push('|');
            } else {
                break;
            }
        }
        Ok(parse_type_annotation(&annotation))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.enter_nesting()?;
        let result = self.parse_binary(0);
        self.exit_nesting();
        result
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = self
            .peek_text()
            .and_then(|op| binary_precedence(op).map(|p| (op.to_string(), p)))
        {
            if precedence <= min_precedence {
                break;
            }
            let loc = self.advance_loc();
            let right = self.parse_binary(precedence)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                loc,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        // The lexer's `--` and `++` are two prefix operators in a row
        let ops: Option<Vec<String>> = match self.peek_text() {
            Some("--") => Some(vec!["-".to_string(), "-".to_string()]),
            Some("++") => Some(vec!["+".to_string(), "+".to_string()]),
            Some(op) if UNARY_OPERATORS.contains(&op) => Some(vec![op.to_string()]),
            _ => None,
        };
        let Some(ops) = ops else {
            return self.parse_primary();
        };

        let loc = self.advance_loc();
        self.enter_nesting()?;
        let operand = self.parse_unary();
        self.exit_nesting();

        Ok(ops.into_iter().rev().fold(operand?, |inner, op| Expr::Unary {
            op,
            operand: Box::new(inner),
            loc: loc.clone(),
        }))
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("Expected expression, found end of input"));
        };

        if token.text == "(" {
            self.advance();
            let expr = self.parse_expression()?;
            self.expect(")")?;
            return Ok(expr);
        }

        if token.is_number_literal() {
            self.advance();
            return Self::number(&token);
        }

        if token.is_string_literal() {
            self.advance();
            let text = &token.text;
            let inner = if text.len() >= 2 {
                &text[1..text.len() - 1]
            } else {
                ""
            };
            return Ok(Expr::Literal {
                value: Literal::Str(inner.to_string()),
                loc: token.loc,
            });
        }

        if token.text == "true" || token.text == "false" {
            self.advance();
            return Ok(Expr::Literal {
                value: Literal::Bool(token.text == "true"),
                loc: token.loc,
            });
        }

        if token.is_identifier() && !KEYWORDS.contains(&token.text.as_str()) {
            self.advance();
            return self.parse_identifier_chain(token);
        }

        Err(Self::error_at(
            &token.loc,
            &format!("Expected expression, found '{}'", token.text),
        ))
    }

    /// `name`, `name(args)`, and `.prop` / `.method(args)` chains after it
    fn parse_identifier_chain(&mut self, head: Token) -> ParseResult<Expr> {
        let mut expr = if self.check("(") {
            let args = self.parse_arguments()?;
            Expr::Call {
                callee: Callee::Name(head.text),
                args,
                loc: head.loc,
            }
        } else {
            Expr::Identifier {
                name: head.text,
                loc: head.loc,
            }
        };

        while self.check(".") {
            let dot_loc = self.advance_loc();
            let (property, _) = self.expect_identifier("property name after '.'")?;
            expr = if self.check("(") {
                let args = self.parse_arguments()?;
                Expr::Call {
                    callee: Callee::Member {
                        object: Box::new(expr),
                        property,
                    },
                    args,
                    loc: dot_loc,
                }
            } else {
                Expr::Member {
                    object: Box::new(expr),
                    property,
                    loc: dot_loc,
                }
            };
        }

        if self.check("(") {
            return Err(self.error("Only names and members can be called"));
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect("(")?;
        let mut args = Vec::new();
        while !self.check(")") {
            args.push(self.parse_expression()?);
            if self.check(",") {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn number(token: &Token) -> ParseResult<Expr> {
        let value = if token.text.contains('.') {
            token
                .text
                .parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| Self::error_at(&token.loc, &format!("Invalid number '{}'", token.text)))?
        } else {
            token.text.parse::<i64>().map(Literal::Int).map_err(|_| {
                Self::error_at(
                    &token.loc,
                    &format!("Integer literal '{}' is out of range", token.text),
                )
            })?
        };
        Ok(Expr::Literal {
            value,
            loc: token.loc.clone(),
        })
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_text(&self) -> Option<&str> {
        self.peek().map(|t| t.text.as_str())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.current);
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    /// Consume the current token and return where it started
    fn advance_loc(&mut self) -> SourceLoc {
        let loc = self.current_loc();
        self.advance();
        loc
    }

    fn check(&self, text: &str) -> bool {
        self.peek_text() == Some(text)
    }

    fn check_at(&self, ahead: usize, text: &str) -> bool {
        self.tokens
            .get(self.current + ahead)
            .is_some_and(|t| t.text == text)
    }

    fn current_loc(&self) -> SourceLoc {
        self.peek()
            .map(|t| t.loc.clone())
            .unwrap_or_else(|| self.end_loc.clone())
    }

    fn expect(&mut self, text: &str) -> ParseResult<Token> {
        match self.peek() {
            Some(token) if token.text == text => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            Some(token) => Err(Self::error_at(
                &token.loc,
                &format!("Expected '{}', found '{}'", text, token.text),
            )),
            None => Err(self.error(&format!("Expected '{}', found end of input", text))),
        }
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<(String, SourceLoc)> {
        match self.peek() {
            Some(token) if token.is_identifier() && !KEYWORDS.contains(&token.text.as_str()) => {
                let result = (token.text.clone(), token.loc.clone());
                self.advance();
                Ok(result)
            }
            Some(token) => Err(Self::error_at(
                &token.loc,
                &format!("Expected {}, found '{}'", what, token.text),
            )),
            None => Err(self.error(&format!("Expected {}, found end of input", what))),
        }
    }

    fn error(&self, message: &str) -> ParseError {
        Self::error_at(&self.current_loc(), message)
    }

    fn error_at(loc: &SourceLoc, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            line: loc.line,
            column: loc.column,
        }
    }

    /// Fails without changing the depth, so callers only pair
    /// `exit_nesting` with a successful enter
    fn enter_nesting(&mut self) -> ParseResult<()> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            return Err(self.error(&format!(
                "Maximum nesting depth of {} exceeded",
                MAX_NESTING_DEPTH
            )));
        }
        self.nesting_depth += 1;
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_depth_restored_after_overflow() {
        let source = format!("{}1", "!".repeat(MAX_NESTING_DEPTH + 5));
        let mut parser = Parser::new(&source);
        assert!(parser.parse_expression().is_err());
        assert_eq!(parser.nesting_depth, 0);
    }

    #[test]
    fn test_enter_nesting_fails_at_limit_without_counting() {
        let mut parser = Parser::new("");
        parser.nesting_depth = MAX_NESTING_DEPTH;
        assert!(parser.enter_nesting().is_err());
        assert_eq!(parser.nesting_depth, MAX_NESTING_DEPTH);
    }
}
