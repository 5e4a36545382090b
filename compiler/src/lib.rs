/// Strata - a small statically annotated scripting language
///
/// This crate implements the Strata pipeline:
/// - Lexer and recursive descent parser producing the AST
/// - Structural type checker over declared annotations
/// - Tree-walking interpreter backed by the `strata-runtime` modules
/// - C code generator for a translatable subset
pub mod ast;
pub mod codegen;
pub mod config;
pub mod interpreter;
pub mod parser;
pub mod typechecker;

pub use ast::{Expr, Program, SourceLoc, Stmt, TypeDef};
pub use codegen::{CGenerator, CodegenError};
pub use config::{Config, ConfigError};
pub use interpreter::{Interpreter, RuntimeError};
pub use parser::{Lexer, ParseError, Parser, Token};
pub use typechecker::{TypeChecker, TypeError, TypeErrors};

use std::io::Write;
use strata_runtime::ModuleRegistry;
use thiserror::Error;

/// Any failure of the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Type(#[from] TypeErrors),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse()
}

/// Collects every type error in the program
pub fn check(program: &Program) -> Result<(), TypeErrors> {
    TypeChecker::new().check_program(program)
}

pub fn generate_c(program: &Program) -> String {
    CGenerator::new().generate(program)
}

/// Parse, type check and run `source`, writing program output to `out`
pub fn run_source<W: Write>(
    source: &str,
    registry: &ModuleRegistry,
    out: &mut W,
) -> Result<(), Error> {
    let program = parse(source)?;
    check(&program)?;
    Interpreter::with_output(registry, out).run(&program)?;
    Ok(())
}
