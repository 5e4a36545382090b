/*!
std::file - synchronous filesystem access

Reads that fail yield `nil`; writes and other mutations yield whether they
succeeded. Nothing here raises a runtime error.
*/

use crate::{Host, Module, NativeResult, Value, arg_string};
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn module() -> Module {
    Module::new("std::file")
        .function("read", 1, read)
        .function("write", 2, write)
        .function("append", 2, append)
        .function("exists", 1, exists)
        .function("delete", 1, delete)
        .function("isFile", 1, is_file)
        .function("isDirectory", 1, is_directory)
        .function("mkdir", 1, mkdir)
}

pub(crate) fn read(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(fs::read_to_string(arg_string(args, 0))
        .map(Value::Str)
        .unwrap_or(Value::Nil))
}

pub(crate) fn write(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(
        fs::write(arg_string(args, 0), arg_string(args, 1)).is_ok(),
    ))
}

fn append(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let appended = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(arg_string(args, 0))
        .and_then(|mut f| f.write_all(arg_string(args, 1).as_bytes()));
    Ok(Value::Bool(appended.is_ok()))
}

pub(crate) fn exists(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(Path::new(&arg_string(args, 0)).exists()))
}

fn delete(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    let path = arg_string(args, 0);
    let removed = if Path::new(&path).is_dir() {
        fs::remove_dir_all(&path)
    } else {
        fs::remove_file(&path)
    };
    Ok(Value::Bool(removed.is_ok()))
}

pub(crate) fn is_file(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(Path::new(&arg_string(args, 0)).is_file()))
}

pub(crate) fn is_directory(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(Path::new(&arg_string(args, 0)).is_dir()))
}

/// Creates missing parents too
pub(crate) fn mkdir(_: &mut Host<'_>, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(fs::create_dir_all(arg_string(args, 0)).is_ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call;

    fn path_value(dir: &tempfile::TempDir, name: &str) -> Value {
        Value::Str(dir.path().join(name).to_string_lossy().into_owned())
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let m = module();
        let path = path_value(&dir, "out.txt");
        assert_eq!(
            call(&m, "write", &[path.clone(), Value::from("hi")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call(&m, "append", &[path.clone(), Value::from(" there")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(call(&m, "read", &[path.clone()]), Ok(Value::from("hi there")));
        assert_eq!(call(&m, "isFile", &[path.clone()]), Ok(Value::Bool(true)));
        assert_eq!(call(&m, "delete", &[path.clone()]), Ok(Value::Bool(true)));
        assert_eq!(call(&m, "exists", &[path]), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_read_missing_is_nil() {
        let dir = tempfile::tempdir().unwrap();
        let m = module();
        assert_eq!(call(&m, "read", &[path_value(&dir, "nope")]), Ok(Value::Nil));
    }

    #[test]
    fn test_mkdir_nested() {
        let dir = tempfile::tempdir().unwrap();
        let m = module();
        let nested = path_value(&dir, "a/b/c");
        assert_eq!(call(&m, "mkdir", &[nested.clone()]), Ok(Value::Bool(true)));
        assert_eq!(call(&m, "isDirectory", &[nested]), Ok(Value::Bool(true)));
    }
}
