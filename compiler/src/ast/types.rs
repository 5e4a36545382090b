/**
Type system definitions for Strata

Types are structural: a `TypeDef` is a primitive tag, an optional wrapper,
or a union of alternatives. Annotation strings are resolved through a
single immutable registry; anything it does not know becomes `any`.
*/
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// Canonical primitive tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Char,
    String,
    Any,
    Void,
    List,
    Map,
    Set,
    Result,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::String => "string",
            Primitive::Any => "any",
            Primitive::Void => "void",
            Primitive::List => "list",
            Primitive::Map => "map",
            Primitive::Set => "set",
            Primitive::Result => "result",
        }
    }
}

/// A type in the Strata type system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDef {
    Primitive(Primitive),
    /// `T?`
    Optional(Box<TypeDef>),
    /// `A | B | ...`
    Union(Vec<TypeDef>),
}

impl TypeDef {
    pub const INT: TypeDef = TypeDef::Primitive(Primitive::Int);
    pub const FLOAT: TypeDef = TypeDef::Primitive(Primitive::Float);
    pub const BOOL: TypeDef = TypeDef::Primitive(Primitive::Bool);
    pub const CHAR: TypeDef = TypeDef::Primitive(Primitive::Char);
    pub const STRING: TypeDef = TypeDef::Primitive(Primitive::String);
    pub const ANY: TypeDef = TypeDef::Primitive(Primitive::Any);
    pub const VOID: TypeDef = TypeDef::Primitive(Primitive::Void);

    pub fn is_any(&self) -> bool {
        matches!(self, TypeDef::Primitive(Primitive::Any))
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            TypeDef::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDef::Primitive(p) => write!(f, "{}", p.name()),
            TypeDef::Optional(inner) => match **inner {
                TypeDef::Union(_) => write!(f, "({})?", inner),
                _ => write!(f, "{}?", inner),
            },
            TypeDef::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}

/// Annotation name -> canonical primitive. Fixed-width numeric names and
/// collection spellings are aliases of the canonical tags.
static TYPE_REGISTRY: LazyLock<FxHashMap<&'static str, Primitive>> = LazyLock::new(|| {
    let entries: &[(&str, Primitive)] = &[
        ("int", Primitive::Int),
        ("i8", Primitive::Int),
        ("i16", Primitive::Int),
        ("i32", Primitive::Int),
        ("i64", Primitive::Int),
        ("u8", Primitive::Int),
        ("u16", Primitive::Int),
        ("u32", Primitive::Int),
        ("u64", Primitive::Int),
        ("float", Primitive::Float),
        ("f32", Primitive::Float),
        ("f64", Primitive::Float),
        ("bool", Primitive::Bool),
        ("char", Primitive::Char),
        ("string", Primitive::String),
        ("str", Primitive::String),
        ("any", Primitive::Any),
        ("void", Primitive::Void),
        ("list", Primitive::List),
        ("array", Primitive::List),
        ("map", Primitive::Map),
        ("dict", Primitive::Map),
        ("set", Primitive::Set),
        ("result", Primitive::Result),
    ];
    entries.iter().copied().collect()
});

/// Look up a single type name in the registry
pub fn lookup_primitive(name: &str) -> Option<Primitive> {
    TYPE_REGISTRY.get(name).copied()
}

/// Resolve an annotation such as `int`, `string?` or `int | string`.
///
/// Never fails: unknown or malformed annotations resolve to `any`.
pub fn parse_type_annotation(annotation: &str) -> TypeDef {
    let annotation = annotation.trim();

    if annotation.contains('|') {
        let members: Vec<TypeDef> = annotation.split('|').map(parse_type_annotation).collect();
        return TypeDef::Union(members);
    }

    if let Some(inner) = annotation.strip_suffix('?') {
        return TypeDef::Optional(Box::new(parse_type_annotation(inner)));
    }

    lookup_primitive(annotation)
        .map(TypeDef::Primitive)
        .unwrap_or(TypeDef::ANY)
}

/// Whether a value of type `actual` may be used where `expected` is
/// declared. Not symmetric: `int` fits `float` but not the reverse.
pub fn type_compatible(actual: &TypeDef, expected: &TypeDef) -> bool {
    if actual.is_any() || expected.is_any() {
        return true;
    }

    if actual == expected {
        return true;
    }

    match (actual, expected) {
        (TypeDef::Primitive(Primitive::Int), TypeDef::Primitive(Primitive::Float)) => true,
        (TypeDef::Primitive(Primitive::Char), TypeDef::Primitive(Primitive::String)) => true,
        (TypeDef::Union(actual_members), TypeDef::Union(expected_members)) => {
            actual_members.iter().all(|a| {
                expected_members
                    .iter()
                    .any(|e| type_compatible(a, e))
            })
        }
        (TypeDef::Optional(actual_inner), TypeDef::Optional(expected_inner)) => {
            type_compatible(actual_inner, expected_inner)
        }
        (_, TypeDef::Optional(expected_inner)) => type_compatible(actual, expected_inner),
        _ => false,
    }
}
