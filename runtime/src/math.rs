/*!
std::math - floating point functions and constants

Every function takes its arguments through `to_number` and returns a float.
*/

use crate::{Module, NativeResult, Value, arg};

pub fn module() -> Module {
    Module::new("std::math")
        .function("sqrt", 1, |_, a| unary(a, f64::sqrt))
        .function("abs", 1, |_, a| unary(a, f64::abs))
        .function("floor", 1, |_, a| unary(a, f64::floor))
        .function("ceil", 1, |_, a| unary(a, f64::ceil))
        .function("round", 1, |_, a| unary(a, f64::round))
        .function("sin", 1, |_, a| unary(a, f64::sin))
        .function("cos", 1, |_, a| unary(a, f64::cos))
        .function("tan", 1, |_, a| unary(a, f64::tan))
        .function("log", 1, |_, a| unary(a, f64::ln))
        .function("exp", 1, |_, a| unary(a, f64::exp))
        .function("pow", 2, |_, a| binary(a, f64::powf))
        .function("min", 2, |_, a| binary(a, f64::min))
        .function("max", 2, |_, a| binary(a, f64::max))
        .constant("PI", Value::Float(std::f64::consts::PI))
        .constant("E", Value::Float(std::f64::consts::E))
}

pub(crate) fn unary(args: &[Value], f: fn(f64) -> f64) -> NativeResult {
    Ok(Value::Float(f(arg(args, 0).to_number())))
}

pub(crate) fn binary(args: &[Value], f: fn(f64, f64) -> f64) -> NativeResult {
    Ok(Value::Float(f(
        arg(args, 0).to_number(),
        arg(args, 1).to_number(),
    )))
}
