/**
C code generation for Strata

Translates a program into a single C translation unit whose `main` holds
every top-level statement. Only a subset of the language maps onto C:

- `let`/`var`/`const` become typed locals, assignments stay assignments
- `if`, `while`, `for`, `return`, `break`, `continue` map one to one
- `io.print(x)` / `io.println(x)` become `printf` with a format picked from
  the static type of `x`
- `math.*` calls and the `math.PI` / `math.E` constants map onto `<math.h>`

Anything else (user function declarations, calls outside `std::io` and
`std::math`, member access on values) degrades to a comment or the
placeholder `0`. Generation itself never fails; only writing the file can.

Example output:

```c
#include <stdio.h>
#include <math.h>

int main() {
    int x = (2 + (3 * 4));
    printf("%d\n", x);
    return 0;
}
```
*/
pub mod emit;
pub mod error;

pub use emit::{default_output_path, validate_path, write_c_source};
pub use error::{CodegenError, CodegenResult};

use crate::ast::types::Primitive;
use crate::ast::{Callee, Expr, Literal, Program, Stmt, TypeDef};
use rustc_hash::FxHashMap;

const INDENT: &str = "    ";

/// Placeholder for expressions with no C translation
const PLACEHOLDER: &str = "0";

pub struct CGenerator {
    lines: Vec<String>,
    depth: usize,
    /// Import binding -> module path
    imports: FxHashMap<String, String>,
    /// Declared types of locals, innermost block last
    scopes: Vec<FxHashMap<String, TypeDef>>,
}

impl CGenerator {
    pub fn new() -> Self {
        CGenerator {
            lines: Vec::new(),
            depth: 0,
            imports: FxHashMap::default(),
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Generate the C source for a whole program
    pub fn generate(&mut self, program: &Program) -> String {
        self.lines.clear();
        self.imports.clear();
        self.scopes = vec![FxHashMap::default()];
        self.depth = 0;

        self.line("#include <stdio.h>");
        self.line("#include <math.h>");
        self.line("");
        self.line("int main() {");
        self.depth += 1;
        for stmt in &program.statements {
            self.statement(stmt);
        }
        self.line("return 0;");
        self.depth -= 1;
        self.line("}");

        let mut code = self.lines.join("\n");
        code.push('\n');
        code
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.depth), text));
        }
    }

    fn block(&mut self, statements: &[Stmt]) {
        self.depth += 1;
        self.scopes.push(FxHashMap::default());
        for stmt in statements {
            self.statement(stmt);
        }
        self.scopes.pop();
        self.depth -= 1;
    }

    fn statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import {
                binding,
                module_path,
                ..
            } => {
                self.imports
                    .insert(binding.clone(), canonical_module(module_path).to_string());
                self.line(&format!("/* import {} from {} */", binding, module_path));
            }

            Stmt::Let { .. } | Stmt::Assignment { .. } | Stmt::Expression { .. } => {
                let simple = self.simple_statement(stmt);
                self.line(&format!("{};", simple));
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = self.expression(condition);
                self.line(&format!("if ({}) {{", condition));
                self.block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.line("} else {");
                    self.block(else_branch);
                }
                self.line("}");
            }

            Stmt::While {
                condition, body, ..
            } => {
                let condition = self.expression(condition);
                self.line(&format!("while ({}) {{", condition));
                self.block(body);
                self.line("}");
            }

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                // the init binding is scoped to the loop
                self.scopes.push(FxHashMap::default());
                let init = init
                    .as_deref()
                    .map(|s| self.simple_statement(s))
                    .unwrap_or_default();
                let condition = condition
                    .as_ref()
                    .map(|c| self.expression(c))
                    .unwrap_or_default();
                let update = update
                    .as_deref()
                    .map(|s| self.simple_statement(s))
                    .unwrap_or_default();
                self.line(&format!("for ({}; {}; {}) {{", init, condition, update));
                self.block(body);
                self.line("}");
                self.scopes.pop();
            }

            Stmt::Function(decl) => {
                self.line(&format!("/* func {} is not translated */", decl.name));
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let value = self.expression(value);
                    self.line(&format!("return {};", value));
                }
                None => self.line("return 0;"),
            },

            Stmt::Break { .. } => self.line("break;"),
            Stmt::Continue { .. } => self.line("continue;"),
        }
    }

    /// A declaration, assignment or expression without the trailing `;`
    fn simple_statement(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Let {
                name, ty, value, ..
            } => {
                let ty = match value {
                    Some(value) if ty.is_any() => self.static_type(value),
                    _ => ty.clone(),
                };
                let declaration = format!("{} {}", c_type(&ty), name);
                self.declare(name, ty);
                match value {
                    Some(value) => format!("{} = {}", declaration, self.expression(value)),
                    None => declaration,
                }
            }
            Stmt::Assignment { target, value, .. } => {
                format!("{} = {}", target, self.expression(value))
            }
            Stmt::Expression { expr, .. } => self.expression(expr),
            _ => String::new(),
        }
    }

    fn declare(&mut self, name: &str, ty: TypeDef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<&TypeDef> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn expression(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => literal(value),

            Expr::Identifier { name, .. } => name.clone(),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left_type = self.static_type(left);
                let right_type = self.static_type(right);
                let left = self.expression(left);
                let right = self.expression(right);
                match op.as_str() {
                    // division is never integral
                    "/" => format!("((double){} / {})", left, right),
                    "%" if left_type == TypeDef::FLOAT || right_type == TypeDef::FLOAT => {
                        format!("fmod({}, {})", left, right)
                    }
                    // no string concatenation in C
                    "+" if left_type == TypeDef::STRING => PLACEHOLDER.to_string(),
                    _ => format!("({} {} {})", left, op, right),
                }
            }

            Expr::Unary { op, operand, .. } => format!("({}{})", op, self.expression(operand)),

            Expr::Call { callee, args, .. } => match callee {
                Callee::Member { object, property } => self.module_call(object, property, args),
                Callee::Name(_) => PLACEHOLDER.to_string(),
            },

            Expr::Member {
                object, property, ..
            } => match (self.module_of(object), property.as_str()) {
                (Some("std::math"), "PI") => "M_PI".to_string(),
                (Some("std::math"), "E") => "M_E".to_string(),
                _ => PLACEHOLDER.to_string(),
            },
        }
    }

    fn module_of(&self, object: &Expr) -> Option<&str> {
        match object {
            Expr::Identifier { name, .. } => self.imports.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn module_call(&self, object: &Expr, property: &str, args: &[Expr]) -> String {
        match self.module_of(object) {
            Some("std::io") if matches!(property, "print" | "println") && args.len() == 1 => {
                let format = printf_format(&self.static_type(&args[0]));
                format!("printf(\"{}\\n\", {})", format, self.expression(&args[0]))
            }
            Some("std::math") => match math_function(property) {
                Some(function) => {
                    let args: Vec<String> = args.iter().map(|a| self.expression(a)).collect();
                    format!("{}({})", function, args.join(", "))
                }
                None => PLACEHOLDER.to_string(),
            },
            _ => PLACEHOLDER.to_string(),
        }
    }

    /// Static type of an expression, as far as the generator can tell
    fn static_type(&self, expr: &Expr) -> TypeDef {
        match expr {
            Expr::Literal { value, .. } => value.type_def(),
            Expr::Identifier { name, .. } => {
                self.lookup(name).cloned().unwrap_or(TypeDef::ANY)
            }
            Expr::Binary {
                op, left, right, ..
            } => match op.as_str() {
                "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => TypeDef::BOOL,
                "/" => TypeDef::FLOAT,
                _ => {
                    let left = self.static_type(left);
                    let right = self.static_type(right);
                    if left == TypeDef::FLOAT || right == TypeDef::FLOAT {
                        TypeDef::FLOAT
                    } else {
                        left
                    }
                }
            },
            Expr::Unary { op, operand, .. } => {
                if op == "!" {
                    TypeDef::BOOL
                } else {
                    self.static_type(operand)
                }
            }
            Expr::Call {
                callee: Callee::Member { object, property },
                ..
            } if self.module_of(object) == Some("std::math")
                && math_function(property).is_some() =>
            {
                TypeDef::FLOAT
            }
            Expr::Member { object, .. } if self.module_of(object) == Some("std::math") => {
                TypeDef::FLOAT
            }
            Expr::Call { .. } | Expr::Member { .. } => TypeDef::ANY,
        }
    }
}

impl Default for CGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// C type for a declared Strata type; anything without a mapping is `int`
pub fn c_type(ty: &TypeDef) -> &'static str {
    match ty.primitive() {
        Some(Primitive::Float) => "double",
        Some(Primitive::Char) => "char",
        Some(Primitive::String) => "char*",
        _ => "int",
    }
}

fn printf_format(ty: &TypeDef) -> &'static str {
    match ty.primitive() {
        Some(Primitive::Float) => "%g",
        Some(Primitive::Char) => "%c",
        Some(Primitive::String) => "%s",
        _ => "%d",
    }
}

/// Short import names accepted by the runtime registry
fn canonical_module(path: &str) -> &str {
    match path {
        "math" => "std::math",
        "str" => "std::io",
        other => other,
    }
}

fn math_function(name: &str) -> Option<&'static str> {
    Some(match name {
        "sqrt" => "sqrt",
        "pow" => "pow",
        "floor" => "floor",
        "ceil" => "ceil",
        "round" => "round",
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "log" => "log",
        "exp" => "exp",
        "abs" => "fabs",
        "min" => "fmin",
        "max" => "fmax",
        _ => return None,
    })
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Int(i) => i.to_string(),
        // Debug keeps the decimal point: 2.0 rather than 2
        Literal::Float(f) => format!("{:?}", f),
        Literal::Bool(b) => String::from(if *b { "1" } else { "0" }),
        Literal::Str(s) => format!("\"{}\"", escape_c_string(s)),
    }
}

fn escape_c_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
