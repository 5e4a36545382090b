/**
Expression evaluation for the Strata interpreter

Operators never reject an operand for its type: mixed operands go through
the permissive `to_number` / `to_bool` conversions of `Value`. Two ints
stay integral for `+ - * %`; `/` always divides as floats.
*/
use crate::ast::{Callee, Expr, Literal, SourceLoc};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use std::cmp::Ordering;
use std::io::Write;
use strata_runtime::{Builtin, Host, Member, Value};

impl<W: Write> Interpreter<'_, W> {
    pub(super) fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(literal_value(value)),

            Expr::Identifier { name, loc } => {
                self.env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        loc: loc.clone(),
                    })
            }

            Expr::Binary {
                op,
                left,
                right,
                loc,
            } => {
                let left = self.evaluate(left)?;
                match op.as_str() {
                    "&&" if !left.to_bool() => Ok(Value::Bool(false)),
                    "||" if left.to_bool() => Ok(Value::Bool(true)),
                    "&&" | "||" => Ok(Value::Bool(self.evaluate(right)?.to_bool())),
                    _ => {
                        let right = self.evaluate(right)?;
                        binary_op(op, &left, &right, loc)
                    }
                }
            }

            Expr::Unary { op, operand, loc } => {
                let operand = self.evaluate(operand)?;
                unary_op(op, &operand, loc)
            }

            Expr::Call { callee, args, loc } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                match callee {
                    Callee::Name(name) => self.call_named(name, args, loc),
                    Callee::Member { object, property } => {
                        self.call_member(object, property, args, loc)
                    }
                }
            }

            Expr::Member {
                object,
                property,
                loc,
            } => self.member(object, property, loc),
        }
    }

    /// `f(..)`: user functions first, then the prelude
    fn call_named(&mut self, name: &str, args: Vec<Value>, loc: &SourceLoc) -> RuntimeResult<Value> {
        if let Some(decl) = self.env.function(name) {
            return self.call_function(&decl, args, loc);
        }
        match self.registry.prelude().get(name) {
            Some(Member::Function(builtin)) => {
                let builtin = *builtin;
                self.call_builtin(&builtin, &args, loc)
            }
            _ => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                loc: loc.clone(),
            }),
        }
    }

    /// `m.f(..)` where `m` is an imported module binding
    fn call_member(
        &mut self,
        object: &Expr,
        property: &str,
        args: Vec<Value>,
        loc: &SourceLoc,
    ) -> RuntimeResult<Value> {
        let Expr::Identifier { name, .. } = object else {
            return Err(RuntimeError::NotAFunction {
                name: property.to_string(),
                loc: loc.clone(),
            });
        };

        let Some(module) = self.env.module(name) else {
            if self.env.get(name).is_some() {
                return Err(RuntimeError::NotAFunction {
                    name: format!("{}.{}", name, property),
                    loc: loc.clone(),
                });
            }
            return Err(RuntimeError::ModuleNotImported {
                name: name.clone(),
                loc: loc.clone(),
            });
        };

        match module.get(property) {
            Some(Member::Function(builtin)) => self.call_builtin(builtin, &args, loc),
            Some(Member::Constant(_)) => Err(RuntimeError::NotAFunction {
                name: format!("{}.{}", name, property),
                loc: loc.clone(),
            }),
            None => Err(RuntimeError::UndefinedFunction {
                name: format!("{}.{}", name, property),
                loc: loc.clone(),
            }),
        }
    }

    fn call_builtin(
        &mut self,
        builtin: &Builtin,
        args: &[Value],
        loc: &SourceLoc,
    ) -> RuntimeResult<Value> {
        if args.len() != builtin.arity {
            return Err(RuntimeError::ArityMismatch {
                name: builtin.name.to_string(),
                expected: builtin.arity,
                actual: args.len(),
                loc: loc.clone(),
            });
        }
        let mut host = Host::new(&mut self.out);
        builtin
            .call(&mut host, args)
            .map_err(|source| RuntimeError::Native {
                source,
                loc: loc.clone(),
            })
    }

    /// `m.NAME` reads a module constant; on a map value it reads the entry;
    /// on anything else it is nil.
    fn member(&mut self, object: &Expr, property: &str, loc: &SourceLoc) -> RuntimeResult<Value> {
        if let Expr::Identifier { name, .. } = object {
            if let Some(module) = self.env.module(name) {
                return match module.get(property) {
                    Some(Member::Constant(value)) => Ok(value.clone()),
                    Some(Member::Function(_)) => Err(RuntimeError::FunctionValue {
                        name: format!("{}.{}", name, property),
                        loc: loc.clone(),
                    }),
                    None => Err(RuntimeError::UnknownMember {
                        module: module.path().to_string(),
                        member: property.to_string(),
                        loc: loc.clone(),
                    }),
                };
            }
        }

        match self.evaluate(object)? {
            Value::Map(entries) => Ok(entries.get(property).cloned().unwrap_or_default()),
            _ => Ok(Value::Nil),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// Every binary operator except the short-circuiting `&&` and `||`
pub fn binary_op(op: &str, left: &Value, right: &Value, loc: &SourceLoc) -> RuntimeResult<Value> {
    match op {
        "+" | "-" | "*" | "/" | "%" => arithmetic(op, left, right, loc),
        "==" => Ok(Value::Bool(left.loose_eq(right))),
        "!=" => Ok(Value::Bool(!left.loose_eq(right))),
        "<" | ">" | "<=" | ">=" => {
            let ordering = compare(left, right);
            let result = match op {
                "<" => ordering == Some(Ordering::Less),
                ">" => ordering == Some(Ordering::Greater),
                "<=" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            };
            Ok(Value::Bool(result))
        }
        "&&" => Ok(Value::Bool(left.to_bool() && right.to_bool())),
        "||" => Ok(Value::Bool(left.to_bool() || right.to_bool())),
        _ => Err(RuntimeError::UnsupportedOperator {
            op: op.to_string(),
            loc: loc.clone(),
        }),
    }
}

fn arithmetic(op: &str, left: &Value, right: &Value, loc: &SourceLoc) -> RuntimeResult<Value> {
    if op == "+" {
        if let Value::Str(s) = left {
            return Ok(Value::Str(format!("{}{}", s, right)));
        }
    }

    if op == "%" {
        let divisor = right.to_int();
        if divisor == 0 {
            return Err(RuntimeError::DivisionByZero { loc: loc.clone() });
        }
        return Ok(Value::Int(left.to_int().wrapping_rem(divisor)));
    }

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        match op {
            "+" => return Ok(Value::Int(a.wrapping_add(*b))),
            "-" => return Ok(Value::Int(a.wrapping_sub(*b))),
            "*" => return Ok(Value::Int(a.wrapping_mul(*b))),
            _ => {}
        }
    }

    let (a, b) = (left.to_number(), right.to_number());
    let result = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        _ => a / b,
    };
    Ok(Value::Float(result))
}

/// Strings order lexicographically against strings, everything else numerically
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

pub fn unary_op(op: &str, operand: &Value, loc: &SourceLoc) -> RuntimeResult<Value> {
    match op {
        "-" => Ok(match operand {
            Value::Int(i) => Value::Int(i.wrapping_neg()),
            other => Value::Float(-other.to_number()),
        }),
        "+" => Ok(match operand {
            Value::Int(i) => Value::Int(*i),
            other => Value::Float(other.to_number()),
        }),
        "!" => Ok(Value::Bool(!operand.to_bool())),
        "~" => Ok(Value::Int(!operand.to_int())),
        _ => Err(RuntimeError::UnsupportedOperator {
            op: op.to_string(),
            loc: loc.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use strata_runtime::ModuleRegistry;

    fn loc() -> SourceLoc {
        SourceLoc::unknown()
    }

    fn bin(op: &str, left: Value, right: Value) -> Value {
        binary_op(op, &left, &right, &loc()).unwrap()
    }

    /// Evaluate `source` as a program and return what it printed
    fn output(source: &str) -> Result<String, RuntimeError> {
        let program = Parser::new(source).parse().unwrap();
        let registry = ModuleRegistry::standard();
        let mut interp = Interpreter::with_output(&registry, Vec::new());
        interp.run(&program)?;
        Ok(String::from_utf8(interp.into_output()).unwrap())
    }

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert_eq!(bin("+", Value::Int(2), Value::Int(3)), Value::Int(5));
        assert_eq!(bin("-", Value::Int(2), Value::Int(3)), Value::Int(-1));
        assert_eq!(bin("*", Value::Int(4), Value::Int(3)), Value::Int(12));
        assert_eq!(bin("%", Value::Int(7), Value::Int(3)), Value::Int(1));
    }

    #[test]
    fn test_division_is_float() {
        assert_eq!(bin("/", Value::Int(7), Value::Int(2)), Value::Float(3.5));
        assert_eq!(bin("/", Value::Int(6), Value::Int(3)), Value::Float(2.0));
    }

    #[test]
    fn test_mixed_arithmetic_is_float() {
        assert_eq!(bin("+", Value::Int(1), Value::Float(0.5)), Value::Float(1.5));
        assert_eq!(bin("*", Value::Float(2.0), Value::Int(3)), Value::Float(6.0));
    }

    #[test]
    fn test_permissive_coercion() {
        assert_eq!(bin("-", Value::from("10"), Value::Int(4)), Value::Float(6.0));
        assert_eq!(bin("+", Value::Bool(true), Value::Int(1)), Value::Float(2.0));
        assert_eq!(bin("*", Value::Nil, Value::Int(5)), Value::Float(0.0));
        assert_eq!(bin("-", Value::from("abc"), Value::Int(1)), Value::Float(-1.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(bin("+", Value::from("n = "), Value::Int(3)), Value::from("n = 3"));
        assert_eq!(bin("+", Value::from("x"), Value::Float(1.5)), Value::from("x1.5"));
        // only a string on the left concatenates
        assert_eq!(bin("+", Value::Int(1), Value::from("2")), Value::Float(3.0));
    }

    #[test]
    fn test_modulo_by_zero() {
        let err = binary_op("%", &Value::Int(1), &Value::Int(0), &loc()).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn test_float_division_by_zero_is_infinite() {
        assert_eq!(
            bin("/", Value::Int(1), Value::Int(0)),
            Value::Float(f64::INFINITY)
        );
    }

    #[test]
    fn test_wrapping_overflow() {
        assert_eq!(bin("+", Value::Int(i64::MAX), Value::Int(1)), Value::Int(i64::MIN));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(bin("<", Value::Int(1), Value::Float(1.5)), Value::Bool(true));
        assert_eq!(bin(">=", Value::Int(2), Value::Int(2)), Value::Bool(true));
        assert_eq!(bin("<", Value::from("apple"), Value::from("banana")), Value::Bool(true));
        assert_eq!(bin(">", Value::from("10"), Value::Int(9)), Value::Bool(true));
    }

    #[test]
    fn test_equality() {
        assert_eq!(bin("==", Value::Int(1), Value::Float(1.0)), Value::Bool(true));
        assert_eq!(bin("==", Value::from("a"), Value::from("a")), Value::Bool(true));
        assert_eq!(bin("!=", Value::Bool(true), Value::from("true")), Value::Bool(false));
    }

    #[test]
    fn test_unary() {
        let l = loc();
        assert_eq!(unary_op("-", &Value::Int(3), &l).unwrap(), Value::Int(-3));
        assert_eq!(unary_op("-", &Value::from("2.5"), &l).unwrap(), Value::Float(-2.5));
        assert_eq!(unary_op("!", &Value::Int(0), &l).unwrap(), Value::Bool(true));
        assert_eq!(unary_op("~", &Value::Int(5), &l).unwrap(), Value::Int(-6));
        assert!(unary_op("?", &Value::Nil, &l).is_err());
    }

    #[test]
    fn test_short_circuit() {
        // the right side would fail if evaluated
        assert_eq!(
            output("import io from std::io io.print(false && missing()) io.print(true || missing())")
                .unwrap(),
            "false\ntrue\n"
        );
    }

    #[test]
    fn test_prelude_builtins() {
        let out = output("import io from std::io io.print(strlen(\"hello\")) io.print(toUpperCase(\"abc\"))");
        assert_eq!(out.unwrap(), "5\nABC\n");
    }

    #[test]
    fn test_user_function_shadows_builtin() {
        let out = output("import io from std::io func strlen(s) => int { return 99 } io.print(strlen(\"a\"))");
        assert_eq!(out.unwrap(), "99\n");
    }

    #[test]
    fn test_module_constant() {
        let out = output("import math from std::math import io from std::io io.print(math.PI > 3.14)");
        assert_eq!(out.unwrap(), "true\n");
    }

    #[test]
    fn test_module_function_call() {
        let out = output("import math from std::math import io from std::io io.print(math.sqrt(16))");
        assert_eq!(out.unwrap(), "4\n");
    }

    #[test]
    fn test_call_without_import() {
        let err = output("io.print(1)").unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleNotImported { ref name, .. } if name == "io"));
    }

    #[test]
    fn test_unknown_function() {
        let err = output("nothing(1)").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedFunction { .. }));
        let err = output("import io from std::io io.shout(1)").unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedFunction { ref name, .. } if name == "io.shout"));
    }

    #[test]
    fn test_builtin_arity() {
        let err = output("import math from std::math math.pow(2)").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ArityMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_native_error_carries_location() {
        let err = output("import re from std::regex\nre.test(\"a\", \"(\")").unwrap_err();
        assert!(matches!(err, RuntimeError::Native { .. }));
        assert_eq!(err.loc().line, 2);
    }

    #[test]
    fn test_member_on_plain_value_is_nil() {
        let out = output("import io from std::io let s = \"x\" io.print(s.length)");
        assert_eq!(out.unwrap(), "nil\n");
    }

    #[test]
    fn test_member_function_as_value() {
        let err = output("import math from std::math let f = math.sqrt").unwrap_err();
        assert!(matches!(err, RuntimeError::FunctionValue { .. }));
    }

    #[test]
    fn test_collections_have_value_semantics() {
        let source = "import list from std::list import io from std::io
            let a = list.new()
            let b = list.push(a, 1)
            io.print(list.len(a))
            io.print(b)";
        assert_eq!(output(source).unwrap(), "0\n[1]\n");
    }
}
