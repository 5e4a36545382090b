/*!
Runtime values and the coercion rules the interpreter applies to them.

Strata is dynamically typed at run time. Arithmetic and conditions never
fail on a "wrong" operand type; they go through the named conversions in
this module instead:

| value            | `to_number`        | `to_bool`        |
|------------------|--------------------|------------------|
| `nil`            | `0`                | `false`          |
| `int` / `float`  | itself             | non-zero         |
| `bool`           | `1` / `0`          | itself           |
| `char`           | `0`                | `true`           |
| `string`         | parsed, else `0`   | non-empty        |
| list, map, set   | `0`                | non-empty        |
*/

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    List(Vec<Value>),
    /// Keys are the display form of whatever was used to insert
    Map(BTreeMap<String, Value>),
    /// Insertion ordered, unique under `loose_eq`
    Set(Vec<Value>),
}

impl Value {
    /// Name reported by `typeof`
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Permissive numeric view used by arithmetic and comparisons
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Str(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Nil | Value::Char(_) | Value::List(_) | Value::Map(_) | Value::Set(_) => 0.0,
        }
    }

    /// Integer view: floats truncate toward zero, integer strings parse exactly
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Str(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .unwrap_or_else(|_| trimmed.parse::<f64>().map(|f| f as i64).unwrap_or(0))
            }
            other => other.to_number() as i64,
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Char(_) => true,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Set(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// The text `print` shows and string concatenation appends
    pub fn to_display(&self) -> String {
        self.to_string()
    }

    /// Equality used by `==`: numbers compare numerically, everything
    /// else by display form.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if self.is_number() && other.is_number() {
            return self.to_number() == other.to_number();
        }
        self.to_display() == other.to_display()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Value::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    write_nested(f, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_nested(f, item)?;
    }
    Ok(())
}

// Strings inside collections are quoted so `["a, b"]` stays readable
fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "{:?}", s),
        other => write!(f, "{}", other),
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
