/*!
Bare builtins callable without an import: `strlen(s)`, `typeof(x)`, ...

Most entries share their implementation with a `std::*` namespace.
*/

use crate::math::{binary, unary};
use crate::{Host, Module, NativeResult, Value, arg, arg_string, file, pattern, text, time};

pub fn module() -> Module {
    Module::new("prelude")
        .function("strlen", 1, text::length)
        .function("substr", 3, text::substr)
        .function("toUpperCase", 1, text::to_upper_case)
        .function("toLowerCase", 1, text::to_lower_case)
        .function("trim", 1, text::trim)
        .function("split", 2, text::split)
        .function("join", 2, text::join)
        .function("startsWith", 2, text::starts_with)
        .function("endsWith", 2, text::ends_with)
        .function("includes", 2, text::contains)
        .function("indexOf", 2, text::index_of)
        .function("replace", 3, text::replace)
        .function("replaceAll", 3, text::replace_all)
        .function("repeat", 2, text::repeat)
        .function("abs", 1, |_, a| unary(a, f64::abs))
        .function("sqrt", 1, |_, a| unary(a, f64::sqrt))
        .function("sin", 1, |_, a| unary(a, f64::sin))
        .function("cos", 1, |_, a| unary(a, f64::cos))
        .function("tan", 1, |_, a| unary(a, f64::tan))
        .function("ceil", 1, |_, a| unary(a, f64::ceil))
        .function("floor", 1, |_, a| unary(a, f64::floor))
        .function("round", 1, |_, a| unary(a, f64::round))
        .function("pow", 2, |_, a| binary(a, f64::powf))
        .function("max", 2, |_, a| binary(a, f64::max))
        .function("min", 2, |_, a| binary(a, f64::min))
        .function("typeof", 1, type_of)
        .function("parseInt", 1, parse_int)
        .function("parseFloat", 1, parse_float)
        .function("toString", 1, |_, a| Ok(Value::Str(arg_string(a, 0))))
        .function("toBoolean", 1, |_, a| Ok(Value::Bool(arg(a, 0).to_bool())))
        .function("toNumber", 1, |_, a| Ok(Value::Float(arg(a, 0).to_number())))
        .function("now", 0, time::now)
        .function("timestamp", 0, time::timestamp)
        .function("readFile", 1, file::read)
        .function("writeFile", 2, file::write)
        .function("exists", 1, file::exists)
        .function("isFile", 1, file::is_file)
        .function("isDirectory", 1, file::is_directory)
        .function("mkdir", 1, file::mkdir)
        .function("match", 2, regex_match)
        .function("test", 2, regex_test)
}

fn type_of(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::from(arg(args, 0).type_name()))
}

/// Unparseable input reads as 0
fn parse_int(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Int(arg_string(args, 0).trim().parse().unwrap_or(0)))
}

fn parse_float(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Float(
        arg_string(args, 0).trim().parse().unwrap_or(0.0),
    ))
}

// Invalid patterns are not errors for the bare forms
fn regex_match(host: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(pattern::find(host, args).unwrap_or(Value::Nil))
}

fn regex_test(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(pattern::test(args).unwrap_or(false)))
}
