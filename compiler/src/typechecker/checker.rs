/**
Core type checker for Strata

Walks the program once, inferring a static type for every expression and
checking it against the declared type at each declaration, assignment,
condition, call argument and return. Checking does not stop at the first
problem: every mismatch is collected and reported together.
*/
use crate::ast::types::type_compatible;
use crate::ast::{Callee, Expr, FunctionDecl, Program, SourceLoc, Stmt, TypeDef};
use crate::typechecker::environment::{Environment, FunctionSignature};
use crate::typechecker::errors::{TypeError, TypeErrors, TypeResult};

/// The main type checker
pub struct TypeChecker {
    env: Environment,
    errors: Vec<TypeError>,
    /// Enclosing function names and return types, innermost last
    functions: Vec<(String, TypeDef)>,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            env: Environment::new(),
            errors: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Type check a complete program
    pub fn check_program(&mut self, program: &Program) -> TypeResult<()> {
        self.check_statements(&program.statements);

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(TypeErrors(std::mem::take(&mut self.errors)))
        }
    }

    fn check_statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.check_stmt(stmt);
        }
    }

    fn check_block(&mut self, statements: &[Stmt]) {
        self.env.push_scope();
        self.check_statements(statements);
        self.env.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // Module members are resolved at run time
            Stmt::Import { .. } => {}

            Stmt::Let {
                name,
                ty,
                value,
                loc,
                ..
            } => {
                if let Some(value) = value {
                    let context = format!("declaration of '{}'", name);
                    self.expect_type(value, ty, &context, loc);
                }
                self.env.add_var(name, ty.clone());
            }

            Stmt::Assignment { target, value, loc } => {
                let actual = self.infer_type(value);
                if let Some(declared) = self.env.lookup_var(target).cloned() {
                    self.check_compatible(
                        actual,
                        &declared,
                        &format!("assignment to '{}'", target),
                        loc,
                    );
                }
            }

            Stmt::Expression { expr, .. } => {
                self.infer_type(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.expect_condition(condition, "if");
                self.check_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch);
                }
            }

            Stmt::While {
                condition, body, ..
            } => {
                self.expect_condition(condition, "while");
                self.check_block(body);
            }

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.env.push_scope();
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(condition) = condition {
                    self.expect_condition(condition, "for");
                }
                if let Some(update) = update {
                    self.check_stmt(update);
                }
                self.check_block(body);
                self.env.pop_scope();
            }

            Stmt::Function(decl) => self.check_function(decl),

            Stmt::Return { value, loc } => self.check_return(value.as_ref(), loc),

            Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn check_function(&mut self, decl: &FunctionDecl) {
        // Registered before the body so recursive calls are checked too
        self.env.add_function(
            &decl.name,
            FunctionSignature {
                params: decl.params.iter().map(|p| p.ty.clone()).collect(),
                return_type: decl.return_type.clone(),
            },
        );

        let saved = self.env.enter_function();
        for param in &decl.params {
            self.env.add_var(&param.name, param.ty.clone());
        }
        self.functions
            .push((decl.name.clone(), decl.return_type.clone()));

        self.check_statements(&decl.body);

        self.functions.pop();
        self.env.exit_function(saved);
    }

    fn check_return(&mut self, value: Option<&Expr>, loc: &SourceLoc) {
        let Some((function, return_type)) = self.functions.last().cloned() else {
            self.errors
                .push(TypeError::ReturnOutsideFunction { loc: loc.clone() });
            if let Some(value) = value {
                self.infer_type(value);
            }
            return;
        };

        match value {
            Some(value) => {
                let context = format!("return value of '{}'", function);
                self.expect_type(value, &return_type, &context, loc);
            }
            None => {
                if return_type != TypeDef::VOID && !return_type.is_any() {
                    self.errors.push(TypeError::MissingReturnValue {
                        function,
                        expected: return_type,
                        loc: loc.clone(),
                    });
                }
            }
        }
    }

    fn expect_condition(&mut self, condition: &Expr, keyword: &str) {
        let context = format!("{} condition", keyword);
        self.expect_type(condition, &TypeDef::BOOL, &context, condition.loc());
    }

    fn expect_type(&mut self, expr: &Expr, expected: &TypeDef, context: &str, loc: &SourceLoc) {
        let actual = self.infer_type(expr);
        self.check_compatible(actual, expected, context, loc);
    }

    fn check_compatible(
        &mut self,
        actual: TypeDef,
        expected: &TypeDef,
        context: &str,
        loc: &SourceLoc,
    ) {
        if !type_compatible(&actual, expected) {
            self.errors.push(TypeError::Mismatch {
                expected: expected.clone(),
                actual,
                context: context.to_string(),
                loc: loc.clone(),
            });
        }
    }

    /// Static type of an expression. Calls to known user functions also
    /// have their arguments checked here.
    pub fn infer_type(&mut self, expr: &Expr) -> TypeDef {
        match expr {
            Expr::Literal { value, .. } => value.type_def(),

            Expr::Identifier { name, .. } => self
                .env
                .lookup_var(name)
                .cloned()
                .unwrap_or(TypeDef::ANY),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left_type = self.infer_type(left);
                self.infer_type(right);
                match op.as_str() {
                    "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => TypeDef::BOOL,
                    _ => left_type,
                }
            }

            Expr::Unary { op, operand, .. } => {
                let operand_type = self.infer_type(operand);
                if op == "!" {
                    TypeDef::BOOL
                } else {
                    operand_type
                }
            }

            Expr::Call { callee, args, loc } => self.infer_call(callee, args, loc),

            Expr::Member { object, .. } => {
                self.infer_type(object);
                TypeDef::ANY
            }
        }
    }

    fn infer_call(&mut self, callee: &Callee, args: &[Expr], loc: &SourceLoc) -> TypeDef {
        let arg_types: Vec<TypeDef> = args.iter().map(|a| self.infer_type(a)).collect();

        let name = match callee {
            Callee::Name(name) => name,
            Callee::Member { object, .. } => {
                self.infer_type(object);
                return TypeDef::ANY;
            }
        };

        let Some(signature) = self.env.lookup_function(name).cloned() else {
            return TypeDef::ANY;
        };

        if signature.params.len() != args.len() {
            self.errors.push(TypeError::ArityMismatch {
                function: name.clone(),
                expected: signature.params.len(),
                actual: args.len(),
                loc: loc.clone(),
            });
        } else {
            for (i, ((arg, actual), expected)) in args
                .iter()
                .zip(arg_types)
                .zip(&signature.params)
                .enumerate()
            {
                let context = format!("argument {} of '{}'", i + 1, name);
                self.check_compatible(actual, expected, &context, arg.loc());
            }
        }

        signature.return_type
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
