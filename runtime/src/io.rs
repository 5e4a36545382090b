/*!
std::io - console output
*/

use crate::{Host, Module, NativeError, NativeResult, Value, arg};
use std::io::Write;

pub fn module() -> Module {
    Module::new("std::io")
        .function("print", 1, print)
        .function("println", 1, println)
        .function("eprint", 1, eprint)
}

/// Write a value and a newline to the program's output
pub fn write_line(host: &mut Host<'_>, function: &'static str, value: &Value) -> NativeResult {
    writeln!(host.out, "{}", value)
        .and_then(|_| host.out.flush())
        .map_err(|e| NativeError::Failed {
            function,
            message: e.to_string(),
        })?;
    Ok(Value::Nil)
}

fn print(host: &mut Host<'_>, args: &[Value]) -> NativeResult {
    write_line(host, "print", arg(args, 0))
}

fn println(host: &mut Host<'_>, args: &[Value]) -> NativeResult {
    write_line(host, "println", arg(args, 0))
}

fn eprint(_host: &mut Host<'_>, args: &[Value]) -> NativeResult {
    eprintln!("{}", arg(args, 0));
    Ok(Value::Nil)
}
