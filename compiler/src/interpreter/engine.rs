/**
Statement execution for the Strata interpreter

`break`, `continue` and `return` set `control_flow` instead of unwinding
the host stack. Every statement list stops as soon as the signal is set;
loops consume `Break`/`Continue`, calls consume `Return`.
*/
use crate::ast::{Expr, FunctionDecl, Program, SourceLoc, Stmt};
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use strata_runtime::{ModuleRegistry, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControlFlow {
    #[default]
    None,
    Break,
    Continue,
    Return(Value),
}

/// How one pass over a loop body ended
enum LoopBodyResult {
    /// Ran to the end or hit `continue`
    Continue,
    Break,
    /// `return` is pending; unwind without consuming it
    Exit,
}

pub struct Interpreter<'r, W: Write> {
    pub(super) registry: &'r ModuleRegistry,
    pub(super) env: Environment<'r>,
    pub(super) control_flow: ControlFlow,
    pub(super) out: W,
}

impl<'r> Interpreter<'r, Stdout> {
    pub fn new(registry: &'r ModuleRegistry) -> Self {
        Self::with_output(registry, io::stdout())
    }
}

impl<'r, W: Write> Interpreter<'r, W> {
    /// An interpreter whose program output goes to `out`
    pub fn with_output(registry: &'r ModuleRegistry, out: W) -> Self {
        Interpreter {
            registry,
            env: Environment::new(),
            control_flow: ControlFlow::None,
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Value of a variable visible from the global scope
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.env.get(name)
    }

    /// Run a whole program. A top-level `return` ends the program early.
    pub fn run(&mut self, program: &Program) -> RuntimeResult<()> {
        let result = self.execute_block(&program.statements);
        self.control_flow = ControlFlow::None;
        result
    }

    /// Run statements in the current scope until one raises a signal
    pub(super) fn execute_block(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        for stmt in statements {
            self.execute(stmt)?;
            if self.control_flow != ControlFlow::None {
                break;
            }
        }
        Ok(())
    }

    fn execute_scoped(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        let previous = self.env.enter_block();
        let result = self.execute_block(statements);
        self.env.exit(previous);
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<()> {
        match stmt {
            Stmt::Import {
                binding,
                module_path,
                loc,
            } => {
                let module =
                    self.registry
                        .get(module_path)
                        .ok_or_else(|| RuntimeError::ModuleNotFound {
                            path: module_path.clone(),
                            loc: loc.clone(),
                        })?;
                self.env.define_module(binding, module);
            }

            Stmt::Let {
                name,
                value,
                mutable,
                ..
            } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.env.define(name, value, *mutable);
            }

            Stmt::Assignment { target, value, loc } => {
                let value = self.evaluate(value)?;
                self.assign(target, value, loc)?;
            }

            Stmt::Expression { expr, .. } => {
                self.evaluate(expr)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate(condition)?.to_bool() {
                    self.execute_scoped(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute_scoped(else_branch)?;
                }
            }

            Stmt::While {
                condition, body, ..
            } => loop {
                if !self.evaluate(condition)?.to_bool() {
                    break;
                }
                match self.execute_loop_body(body)? {
                    LoopBodyResult::Exit | LoopBodyResult::Break => break,
                    LoopBodyResult::Continue => {}
                }
            },

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                let previous = self.env.enter_block();
                let result =
                    self.execute_for(init.as_deref(), condition.as_ref(), update.as_deref(), body);
                self.env.exit(previous);
                result?;
            }

            Stmt::Function(decl) => self.env.define_function(Arc::clone(decl)),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.control_flow = ControlFlow::Return(value);
            }

            Stmt::Break { .. } => self.control_flow = ControlFlow::Break,

            Stmt::Continue { .. } => self.control_flow = ControlFlow::Continue,
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, value: Value, loc: &SourceLoc) -> RuntimeResult<()> {
        match self.env.binding_mut(name) {
            Some(binding) if binding.mutable => {
                binding.value = value;
                Ok(())
            }
            Some(_) => Err(RuntimeError::ImmutableAssignment {
                name: name.to_string(),
                loc: loc.clone(),
            }),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                loc: loc.clone(),
            }),
        }
    }

    /// Runs inside the scope holding the `for` init binding
    fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Stmt>,
        body: &[Stmt],
    ) -> RuntimeResult<()> {
        if let Some(init) = init {
            self.execute(init)?;
        }
        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.to_bool() {
                    break;
                }
            }
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            if let Some(update) = update {
                self.execute(update)?;
            }
        }
        Ok(())
    }

    fn execute_loop_body(&mut self, body: &[Stmt]) -> RuntimeResult<LoopBodyResult> {
        self.execute_scoped(body)?;
        Ok(match self.control_flow {
            ControlFlow::None => LoopBodyResult::Continue,
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::None;
                LoopBodyResult::Continue
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::None;
                LoopBodyResult::Break
            }
            ControlFlow::Return(_) => LoopBodyResult::Exit,
        })
    }

    /// Invoke a user function with already evaluated arguments
    pub(super) fn call_function(
        &mut self,
        decl: &FunctionDecl,
        args: Vec<Value>,
        loc: &SourceLoc,
    ) -> RuntimeResult<Value> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: decl.name.clone(),
                expected: decl.params.len(),
                actual: args.len(),
                loc: loc.clone(),
            });
        }

        let previous = self.env.enter_call();
        for (param, value) in decl.params.iter().zip(args) {
            self.env.define(&param.name, value, false);
        }
        let result = self.execute_block(&decl.body);
        self.env.exit(previous);

        // A stray break/continue ends the call as well
        let signal = std::mem::take(&mut self.control_flow);
        result?;
        match signal {
            ControlFlow::Return(value) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }
}
