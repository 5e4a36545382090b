/**
Abstract Syntax Tree definitions for Strata

A program is a flat list of statements. Expressions and statements own
their children; nothing in the tree is shared or mutated after parsing.
*/
pub mod types;

use std::fmt;
use std::sync::Arc;

pub use types::TypeDef;

/// Source code location for debugging and error messages
///
/// Uses Arc<str> for the filename to avoid duplicating it across the AST.
/// `offset` is the byte offset of the token start, which is enough to
/// recover the source slice of the line for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub file: Arc<str>,
}

impl SourceLoc {
    pub fn new(line: usize, column: usize, offset: usize, file: impl Into<Arc<str>>) -> Self {
        Self {
            line,
            column,
            offset,
            file: file.into(),
        }
    }

    /// Create an unknown/synthetic location (for generated code or tests)
    pub fn unknown() -> Self {
        Self {
            line: 0,
            column: 0,
            offset: 0,
            file: Arc::from("<unknown>"),
        }
    }

    /// The full text of the line this location points into
    pub fn line_slice<'s>(&self, source: &'s str) -> &'s str {
        let offset = self.offset.min(source.len());
        let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        source[start..end].trim_end_matches('\r')
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A complete Strata program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Literal {
    /// The primitive type a literal is tagged with
    pub fn type_def(&self) -> TypeDef {
        match self {
            Literal::Int(_) => TypeDef::INT,
            Literal::Float(_) => TypeDef::FLOAT,
            Literal::Str(_) => TypeDef::STRING,
            Literal::Bool(_) => TypeDef::BOOL,
        }
    }
}

/// Target of a call: `f(..)` or `obj.f(..)`
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Name(String),
    Member { object: Box<Expr>, property: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Literal,
        loc: SourceLoc,
    },
    Identifier {
        name: String,
        loc: SourceLoc,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
        loc: SourceLoc,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
        loc: SourceLoc,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
        loc: SourceLoc,
    },
    Member {
        object: Box<Expr>,
        property: String,
        loc: SourceLoc,
    },
}

impl Expr {
    pub fn loc(&self) -> &SourceLoc {
        match self {
            Expr::Literal { loc, .. } => loc,
            Expr::Identifier { loc, .. } => loc,
            Expr::Binary { loc, .. } => loc,
            Expr::Unary { loc, .. } => loc,
            Expr::Call { loc, .. } => loc,
            Expr::Member { loc, .. } => loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeDef,
}

/// A function declaration; shared by reference with the interpreter's
/// function tables once declared
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeDef,
    pub body: Vec<Stmt>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import io from std::io`
    Import {
        binding: String,
        module_path: String,
        loc: SourceLoc,
    },
    /// `let`/`const` are immutable, `var` is mutable
    Let {
        name: String,
        ty: TypeDef,
        value: Option<Expr>,
        mutable: bool,
        loc: SourceLoc,
    },
    Assignment {
        target: String,
        value: Expr,
        loc: SourceLoc,
    },
    Expression {
        expr: Expr,
        loc: SourceLoc,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        loc: SourceLoc,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        loc: SourceLoc,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        loc: SourceLoc,
    },
    Function(Arc<FunctionDecl>),
    Return {
        value: Option<Expr>,
        loc: SourceLoc,
    },
    Break {
        loc: SourceLoc,
    },
    Continue {
        loc: SourceLoc,
    },
}

impl Stmt {
    pub fn loc(&self) -> &SourceLoc {
        match self {
            Stmt::Import { loc, .. } => loc,
            Stmt::Let { loc, .. } => loc,
            Stmt::Assignment { loc, .. } => loc,
            Stmt::Expression { loc, .. } => loc,
            Stmt::If { loc, .. } => loc,
            Stmt::While { loc, .. } => loc,
            Stmt::For { loc, .. } => loc,
            Stmt::Function(decl) => &decl.loc,
            Stmt::Return { loc, .. } => loc,
            Stmt::Break { loc } => loc,
            Stmt::Continue { loc } => loc,
        }
    }
}
