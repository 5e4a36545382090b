/*!
std::regex - regular expressions

Patterns use the `regex` crate's syntax. An invalid pattern is an error
here, unlike the prelude's `match`/`test`, which swallow it.
*/

use crate::{Host, Module, NativeError, NativeResult, Value, arg_string};
use ::regex::Regex;

pub fn module() -> Module {
    Module::new("std::regex")
        .function("test", 2, |_, a| test(a).map(Value::Bool))
        .function("find", 2, find)
        .function("findAll", 2, find_all)
        .function("replace", 3, replace)
        .function("split", 2, split)
}

fn compile(function: &'static str, pattern: &str) -> Result<Regex, NativeError> {
    Regex::new(pattern).map_err(|e| NativeError::InvalidPattern {
        function,
        message: e.to_string(),
    })
}

/// `test(s, pattern)`
pub(crate) fn test(args: &[Value]) -> Result<bool, NativeError> {
    let re = compile("regex.test", &arg_string(args, 1))?;
    Ok(re.is_match(&arg_string(args, 0)))
}

/// First match of `pattern` in `s`, or nil
pub(crate) fn find(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let re = compile("regex.find", &arg_string(args, 1))?;
    Ok(re
        .find(&arg_string(args, 0))
        .map(|m| Value::from(m.as_str()))
        .unwrap_or(Value::Nil))
}

fn find_all(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let re = compile("regex.findAll", &arg_string(args, 1))?;
    Ok(Value::List(
        re.find_iter(&arg_string(args, 0))
            .map(|m| Value::from(m.as_str()))
            .collect(),
    ))
}

/// Replaces every match; `$1` style group references are expanded
fn replace(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let re = compile("regex.replace", &arg_string(args, 1))?;
    let replacement = arg_string(args, 2);
    Ok(Value::Str(
        re.replace_all(&arg_string(args, 0), replacement.as_str())
            .into_owned(),
    ))
}

fn split(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let re = compile("regex.split", &arg_string(args, 1))?;
    Ok(Value::List(
        re.split(&arg_string(args, 0)).map(Value::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_test_and_find() {
        let m = module();
        assert_eq!(call(&m, "test", &[s("abc123"), s(r"\d+")]), Ok(Value::Bool(true)));
        assert_eq!(call(&m, "test", &[s("abc"), s(r"\d+")]), Ok(Value::Bool(false)));
        assert_eq!(call(&m, "find", &[s("abc123def45"), s(r"\d+")]), Ok(s("123")));
        assert_eq!(call(&m, "find", &[s("abc"), s(r"\d+")]), Ok(Value::Nil));
    }

    #[test]
    fn test_find_all_and_split() {
        let m = module();
        assert_eq!(
            call(&m, "findAll", &[s("a1b22c333"), s(r"\d+")]),
            Ok(Value::List(vec![s("1"), s("22"), s("333")]))
        );
        assert_eq!(
            call(&m, "split", &[s("a, b,c"), s(r",\s*")]),
            Ok(Value::List(vec![s("a"), s("b"), s("c")]))
        );
    }

    #[test]
    fn test_replace_expands_groups() {
        let m = module();
        assert_eq!(
            call(&m, "replace", &[s("john smith"), s(r"(\w+) (\w+)"), s("$2 $1")]),
            Ok(s("smith john"))
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let m = module();
        assert!(matches!(
            call(&m, "find", &[s("x"), s("(")]),
            Err(NativeError::InvalidPattern { function: "regex.find", .. })
        ));
    }
}
