/*!
std::list, std::map and std::set

Collections are values: every "mutating" function returns a new collection
and leaves its argument untouched, so `var xs: list = list.push(xs, 1)`
is the update idiom. Map keys are stored by display form.
*/

use crate::{Host, Module, NativeError, NativeResult, Value, arg, arg_string, text};
use std::collections::BTreeMap;

pub fn list_module() -> Module {
    Module::new("std::list")
        .function("new", 0, |_, _| Ok(Value::List(Vec::new())))
        .function("push", 2, list_push)
        .function("get", 2, list_get)
        .function("set", 3, list_set)
        .function("len", 1, list_len)
        .function("pop", 1, list_pop)
        .function("contains", 2, list_contains)
        .function("join", 2, text::join)
}

pub fn map_module() -> Module {
    Module::new("std::map")
        .function("new", 0, |_, _| Ok(Value::Map(BTreeMap::new())))
        .function("set", 3, map_set)
        .function("get", 2, map_get)
        .function("has", 2, map_has)
        .function("remove", 2, map_remove)
        .function("keys", 1, map_keys)
        .function("values", 1, map_values)
        .function("size", 1, map_size)
}

pub fn set_module() -> Module {
    Module::new("std::set")
        .function("new", 0, |_, _| Ok(Value::Set(Vec::new())))
        .function("add", 2, set_add)
        .function("has", 2, set_has)
        .function("remove", 2, set_remove)
        .function("size", 1, set_size)
        .function("values", 1, set_values)
}

fn expect_list<'a>(function: &'static str, value: &'a Value) -> Result<&'a Vec<Value>, NativeError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(NativeError::TypeMismatch {
            function,
            expected: "list",
            actual: other.type_name(),
        }),
    }
}

fn expect_map<'a>(
    function: &'static str,
    value: &'a Value,
) -> Result<&'a BTreeMap<String, Value>, NativeError> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(NativeError::TypeMismatch {
            function,
            expected: "map",
            actual: other.type_name(),
        }),
    }
}

fn expect_set<'a>(function: &'static str, value: &'a Value) -> Result<&'a Vec<Value>, NativeError> {
    match value {
        Value::Set(items) => Ok(items),
        other => Err(NativeError::TypeMismatch {
            function,
            expected: "set",
            actual: other.type_name(),
        }),
    }
}

fn list_push(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut items = expect_list("list.push", arg(args, 0))?.clone();
    items.push(arg(args, 1).clone());
    Ok(Value::List(items))
}

/// Out-of-range and negative indices read as `nil`
fn list_get(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let items = expect_list("list.get", arg(args, 0))?;
    let index = arg(args, 1).to_int();
    if index < 0 {
        return Ok(Value::Nil);
    }
    Ok(items.get(index as usize).cloned().unwrap_or(Value::Nil))
}

fn list_set(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut items = expect_list("list.set", arg(args, 0))?.clone();
    let index = arg(args, 1).to_int();
    let len = items.len();
    match usize::try_from(index).ok().and_then(|i| items.get_mut(i)) {
        Some(slot) => *slot = arg(args, 2).clone(),
        None => {
            return Err(NativeError::Failed {
                function: "list.set",
                message: format!("index {} out of range for list of length {}", index, len),
            });
        }
    }
    Ok(Value::List(items))
}

fn list_len(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Int(expect_list("list.len", arg(args, 0))?.len() as i64))
}

fn list_pop(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut items = expect_list("list.pop", arg(args, 0))?.clone();
    items.pop();
    Ok(Value::List(items))
}

fn list_contains(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let items = expect_list("list.contains", arg(args, 0))?;
    let needle = arg(args, 1);
    Ok(Value::Bool(items.iter().any(|item| item.loose_eq(needle))))
}

fn map_set(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut entries = expect_map("map.set", arg(args, 0))?.clone();
    entries.insert(arg_string(args, 1), arg(args, 2).clone());
    Ok(Value::Map(entries))
}

fn map_get(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let entries = expect_map("map.get", arg(args, 0))?;
    Ok(entries
        .get(&arg_string(args, 1))
        .cloned()
        .unwrap_or(Value::Nil))
}

fn map_has(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let entries = expect_map("map.has", arg(args, 0))?;
    Ok(Value::Bool(entries.contains_key(&arg_string(args, 1))))
}

fn map_remove(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut entries = expect_map("map.remove", arg(args, 0))?.clone();
    entries.remove(&arg_string(args, 1));
    Ok(Value::Map(entries))
}

fn map_keys(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let entries = expect_map("map.keys", arg(args, 0))?;
    Ok(Value::List(entries.keys().map(|k| Value::from(k.as_str())).collect()))
}

fn map_values(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let entries = expect_map("map.values", arg(args, 0))?;
    Ok(Value::List(entries.values().cloned().collect()))
}

fn map_size(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Int(expect_map("map.size", arg(args, 0))?.len() as i64))
}

fn set_add(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut items = expect_set("set.add", arg(args, 0))?.clone();
    let value = arg(args, 1);
    if !items.iter().any(|item| item.loose_eq(value)) {
        items.push(value.clone());
    }
    Ok(Value::Set(items))
}

fn set_has(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let items = expect_set("set.has", arg(args, 0))?;
    let value = arg(args, 1);
    Ok(Value::Bool(items.iter().any(|item| item.loose_eq(value))))
}

fn set_remove(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let mut items = expect_set("set.remove", arg(args, 0))?.clone();
    let value = arg(args, 1);
    items.retain(|item| !item.loose_eq(value));
    Ok(Value::Set(items))
}

fn set_size(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Int(expect_set("set.size", arg(args, 0))?.len() as i64))
}

fn set_values(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::List(expect_set("set.values", arg(args, 0))?.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    #[test]
    fn test_list_is_a_value() {
        let m = list_module();
        let empty = call(&m, "new", &[]).unwrap();
        let one = call(&m, "push", &[empty.clone(), Value::Int(1)]).unwrap();
        let two = call(&m, "push", &[one.clone(), Value::Int(2)]).unwrap();
        assert_eq!(call(&m, "len", &[empty]), Ok(Value::Int(0)));
        assert_eq!(call(&m, "len", &[one]), Ok(Value::Int(1)));
        assert_eq!(call(&m, "get", &[two.clone(), Value::Int(1)]), Ok(Value::Int(2)));
        assert_eq!(call(&m, "get", &[two.clone(), Value::Int(9)]), Ok(Value::Nil));
        assert_eq!(call(&m, "get", &[two.clone(), Value::Int(-1)]), Ok(Value::Nil));
        assert_eq!(
            call(&m, "pop", &[two]),
            Ok(Value::List(vec![Value::Int(1)]))
        );
    }

    #[test]
    fn test_list_set_out_of_range() {
        let m = list_module();
        let xs = Value::List(vec![Value::Int(1)]);
        assert_eq!(
            call(&m, "set", &[xs.clone(), Value::Int(0), Value::Int(5)]),
            Ok(Value::List(vec![Value::Int(5)]))
        );
        assert!(matches!(
            call(&m, "set", &[xs, Value::Int(3), Value::Int(5)]),
            Err(NativeError::Failed { function: "list.set", .. })
        ));
    }

    #[test]
    fn test_list_rejects_non_list() {
        let m = list_module();
        assert_eq!(
            call(&m, "len", &[Value::from("abc")]),
            Err(NativeError::TypeMismatch {
                function: "list.len",
                expected: "list",
                actual: "string",
            })
        );
    }

    #[test]
    fn test_map_operations() {
        let m = map_module();
        let map = call(&m, "new", &[]).unwrap();
        let map = call(&m, "set", &[map, Value::from("b"), Value::Int(2)]).unwrap();
        let map = call(&m, "set", &[map, Value::from("a"), Value::Int(1)]).unwrap();
        assert_eq!(call(&m, "size", &[map.clone()]), Ok(Value::Int(2)));
        assert_eq!(
            call(&m, "keys", &[map.clone()]),
            Ok(Value::List(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(call(&m, "get", &[map.clone(), Value::from("a")]), Ok(Value::Int(1)));
        assert_eq!(call(&m, "get", &[map.clone(), Value::from("z")]), Ok(Value::Nil));
        let map = call(&m, "remove", &[map, Value::from("a")]).unwrap();
        assert_eq!(call(&m, "has", &[map, Value::from("a")]), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_map_keys_use_display_form() {
        let m = map_module();
        let map = call(&m, "new", &[]).unwrap();
        let map = call(&m, "set", &[map, Value::Int(1), Value::from("one")]).unwrap();
        assert_eq!(call(&m, "get", &[map, Value::from("1")]), Ok(Value::from("one")));
    }

    #[test]
    fn test_set_deduplicates() {
        let m = set_module();
        let set = call(&m, "new", &[]).unwrap();
        let set = call(&m, "add", &[set, Value::Int(1)]).unwrap();
        let set = call(&m, "add", &[set, Value::Float(1.0)]).unwrap();
        let set = call(&m, "add", &[set, Value::Int(2)]).unwrap();
        assert_eq!(call(&m, "size", &[set.clone()]), Ok(Value::Int(2)));
        assert_eq!(call(&m, "has", &[set.clone(), Value::Int(2)]), Ok(Value::Bool(true)));
        let set = call(&m, "remove", &[set, Value::Int(1)]).unwrap();
        assert_eq!(call(&m, "values", &[set]), Ok(Value::List(vec![Value::Int(2)])));
    }
}
