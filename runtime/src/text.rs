/*!
std::text - string manipulation

Arguments are read through their display form, so `text.length(123)` is 3.
Indices count characters, not bytes.
*/

use crate::{Host, Module, NativeError, NativeResult, Value, arg, arg_string};

pub fn module() -> Module {
    Module::new("std::text")
        .function("split", 2, split)
        .function("join", 2, join)
        .function("trim", 1, trim)
        .function("toUpperCase", 1, to_upper_case)
        .function("toLowerCase", 1, to_lower_case)
        .function("length", 1, length)
        .function("contains", 2, contains)
        .function("startsWith", 2, starts_with)
        .function("endsWith", 2, ends_with)
        .function("indexOf", 2, index_of)
        .function("replace", 3, replace)
        .function("repeat", 2, repeat)
        .function("substr", 3, substr)
        .function("charAt", 2, char_at)
}

pub(crate) fn split(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let s = arg_string(args, 0);
    let sep = arg_string(args, 1);
    let parts = if sep.is_empty() {
        s.chars().map(Value::Char).collect()
    } else {
        s.split(sep.as_str()).map(Value::from).collect()
    };
    Ok(Value::List(parts))
}

pub(crate) fn join(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let sep = arg_string(args, 1);
    let joined = match arg(args, 0) {
        Value::List(items) | Value::Set(items) => items
            .iter()
            .map(Value::to_display)
            .collect::<Vec<_>>()
            .join(&sep),
        other => other.to_display(),
    };
    Ok(Value::Str(joined))
}

pub(crate) fn trim(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::from(arg_string(args, 0).trim()))
}

pub(crate) fn to_upper_case(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Str(arg_string(args, 0).to_uppercase()))
}

pub(crate) fn to_lower_case(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Str(arg_string(args, 0).to_lowercase()))
}

pub(crate) fn length(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Int(arg_string(args, 0).chars().count() as i64))
}

pub(crate) fn contains(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(
        arg_string(args, 0).contains(arg_string(args, 1).as_str()),
    ))
}

pub(crate) fn starts_with(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(
        arg_string(args, 0).starts_with(arg_string(args, 1).as_str()),
    ))
}

pub(crate) fn ends_with(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(
        arg_string(args, 0).ends_with(arg_string(args, 1).as_str()),
    ))
}

pub(crate) fn index_of(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let s = arg_string(args, 0);
    let needle = arg_string(args, 1);
    let index = s
        .find(needle.as_str())
        .map(|byte| s[..byte].chars().count() as i64)
        .unwrap_or(-1);
    Ok(Value::Int(index))
}

/// Replaces the first occurrence only
pub(crate) fn replace(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let s = arg_string(args, 0);
    Ok(Value::Str(s.replacen(
        arg_string(args, 1).as_str(),
        &arg_string(args, 2),
        1,
    )))
}

pub(crate) fn replace_all(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let s = arg_string(args, 0);
    Ok(Value::Str(
        s.replace(arg_string(args, 1).as_str(), &arg_string(args, 2)),
    ))
}

/// Longest string `repeat` will build, in bytes
pub const MAX_REPEAT_BYTES: usize = 64 * 1024 * 1024;

pub(crate) fn repeat(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let s = arg_string(args, 0);
    let count = usize::try_from(arg(args, 1).to_int().max(0)).unwrap_or(usize::MAX);
    match s.len().checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_BYTES => Ok(Value::Str(s.repeat(count))),
        _ => Err(NativeError::Failed {
            function: "repeat",
            message: format!(
                "result of repeating {} bytes {} times exceeds {} bytes",
                s.len(),
                count,
                MAX_REPEAT_BYTES
            ),
        }),
    }
}

/// `substr(s, start, end)`; both bounds are clamped to the string
pub(crate) fn substr(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let chars: Vec<char> = arg_string(args, 0).chars().collect();
    let len = chars.len() as i64;
    let start = arg(args, 1).to_int().clamp(0, len) as usize;
    let end = arg(args, 2).to_int().clamp(0, len) as usize;
    if start >= end {
        return Ok(Value::from(""));
    }
    Ok(Value::Str(chars[start..end].iter().collect()))
}

pub(crate) fn char_at(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let index = arg(args, 1).to_int();
    if index < 0 {
        return Ok(Value::Nil);
    }
    Ok(arg_string(args, 0)
        .chars()
        .nth(index as usize)
        .map(Value::Char)
        .unwrap_or(Value::Nil))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_split_and_join() {
        let m = module();
        let parts = call(&m, "split", &[s("a,b,c"), s(",")]).unwrap();
        assert_eq!(parts, Value::List(vec![s("a"), s("b"), s("c")]));
        assert_eq!(call(&m, "join", &[parts, s("-")]), Ok(s("a-b-c")));
    }

    #[test]
    fn test_split_empty_separator_yields_chars() {
        let m = module();
        assert_eq!(
            call(&m, "split", &[s("ab"), s("")]),
            Ok(Value::List(vec![Value::Char('a'), Value::Char('b')]))
        );
    }

    #[test]
    fn test_case_and_trim() {
        let m = module();
        assert_eq!(call(&m, "toUpperCase", &[s("abc")]), Ok(s("ABC")));
        assert_eq!(call(&m, "toLowerCase", &[s("ABC")]), Ok(s("abc")));
        assert_eq!(call(&m, "trim", &[s("  x \n")]), Ok(s("x")));
    }

    #[test]
    fn test_length_counts_chars() {
        let m = module();
        assert_eq!(call(&m, "length", &[s("héllo")]), Ok(Value::Int(5)));
        assert_eq!(call(&m, "length", &[Value::Int(123)]), Ok(Value::Int(3)));
    }

    #[test]
    fn test_index_of() {
        let m = module();
        assert_eq!(call(&m, "indexOf", &[s("héllo"), s("l")]), Ok(Value::Int(2)));
        assert_eq!(call(&m, "indexOf", &[s("abc"), s("z")]), Ok(Value::Int(-1)));
    }

    #[test]
    fn test_replace_first_only() {
        let m = module();
        assert_eq!(
            call(&m, "replace", &[s("a-a-a"), s("-"), s("+")]),
            Ok(s("a+a-a"))
        );
    }

    #[test]
    fn test_substr_clamps() {
        let m = module();
        assert_eq!(
            call(&m, "substr", &[s("hello"), Value::Int(1), Value::Int(3)]),
            Ok(s("el"))
        );
        assert_eq!(
            call(&m, "substr", &[s("hello"), Value::Int(3), Value::Int(99)]),
            Ok(s("lo"))
        );
        assert_eq!(
            call(&m, "substr", &[s("hello"), Value::Int(4), Value::Int(2)]),
            Ok(s(""))
        );
    }

    #[test]
    fn test_char_at_and_repeat() {
        let m = module();
        assert_eq!(
            call(&m, "charAt", &[s("abc"), Value::Int(1)]),
            Ok(Value::Char('b'))
        );
        assert_eq!(call(&m, "charAt", &[s("abc"), Value::Int(5)]), Ok(Value::Nil));
        assert_eq!(call(&m, "repeat", &[s("ab"), Value::Int(3)]), Ok(s("ababab")));
        assert_eq!(call(&m, "repeat", &[s("ab"), Value::Int(-1)]), Ok(s("")));
    }

    #[test]
    fn test_repeat_rejects_oversized_result() {
        let m = module();
        let huge = Value::Int(4_611_686_018_427_387_904);
        assert!(matches!(
            call(&m, "repeat", &[s("ab"), huge.clone()]),
            Err(NativeError::Failed { function: "repeat", .. })
        ));
        let just_over = Value::Int((MAX_REPEAT_BYTES / 2 + 1) as i64);
        assert!(call(&m, "repeat", &[s("ab"), just_over]).is_err());
        assert_eq!(call(&m, "repeat", &[s(""), huge]), Ok(s("")));
    }
}
