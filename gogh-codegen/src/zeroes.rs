//! Zero value inference for function results.
//!
//! Zeroes are derived either from a [`TypeDescriptor`] or, when only the
//! type text is known, from heuristics over its spelling. An unknown type
//! is not an error: inference just gives up and returns `None`.

use std::fmt;

use crate::{
    Result,
    types::{BasicKind, TypeDescriptor},
};

/// Zero value of one result position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zero {
    /// Literal zero value
    Value(String),
    /// Trailing error result left for the caller to fill in
    Elided,
}

impl Zero {
    fn value(s: impl Into<String>) -> Self {
        Zero::Value(s.into())
    }

    fn nil() -> Self {
        Zero::value("nil")
    }

    fn error(last: bool) -> Self {
        if last { Zero::Elided } else { Zero::nil() }
    }
}

/// Zero of `ty` in a result list. `last` tells whether it is the final
/// result, the only position where an error is elided. `namer` renders
/// type names for composite literals.
pub fn zero_of_type(
    ty: &TypeDescriptor,
    last: bool,
    namer: &mut dyn FnMut(&TypeDescriptor) -> Result<String>,
) -> Result<Option<Zero>> {
    let zero = match ty {
        TypeDescriptor::Basic { name } => Some(basic_zero(*name)),
        TypeDescriptor::Named { underlying, .. } => {
            if ty.is_error_compatible() {
                return Ok(Some(Zero::error(last)));
            }
            match underlying.as_deref() {
                None => None,
                Some(TypeDescriptor::Struct { .. } | TypeDescriptor::Array { .. }) => {
                    Some(Zero::value(format!("{}{{}}", namer(ty)?)))
                }
                Some(underlying) => zero_of_type(underlying, false, namer)?,
            }
        }
        TypeDescriptor::TypeParam { name } => Some(Zero::value(format!("*new({name})"))),
        TypeDescriptor::Pointer { .. }
        | TypeDescriptor::Slice { .. }
        | TypeDescriptor::Map { .. }
        | TypeDescriptor::Chan { .. }
        | TypeDescriptor::Func(_) => Some(Zero::nil()),
        TypeDescriptor::Array { .. } | TypeDescriptor::Struct { .. } => {
            Some(Zero::value(format!("{}{{}}", namer(ty)?)))
        }
        TypeDescriptor::Interface { .. } => {
            if ty.is_error_compatible() {
                Some(Zero::error(last))
            } else {
                Some(Zero::nil())
            }
        }
    };
    Ok(zero)
}

fn basic_zero(kind: BasicKind) -> Zero {
    match kind {
        BasicKind::Bool => Zero::value("false"),
        BasicKind::String => Zero::value("\"\""),
        BasicKind::UnsafePointer => Zero::nil(),
        _ => Zero::value("0"),
    }
}

const NUMERIC: &[&str] = &[
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "byte",
    "rune",
];

/// Zero guessed from the spelling of a type.
pub fn zero_of_text(ty: &str, last: bool) -> Option<Zero> {
    let ty = ty.trim();
    match ty {
        "bool" => return Some(Zero::value("false")),
        "string" => return Some(Zero::value("\"\"")),
        "error" => return Some(Zero::error(last)),
        "any" | "interface{}" => return Some(Zero::nil()),
        _ => {}
    }
    if NUMERIC.contains(&ty) {
        return Some(Zero::value("0"));
    }

    if ty.starts_with("[]")
        || ty.starts_with("map[")
        || ty.starts_with('*')
        || ty.starts_with("chan ")
        || ty.starts_with("chan<-")
        || ty.starts_with("<-chan")
        || ty.starts_with("func(")
    {
        return Some(Zero::nil());
    }
    if ty.starts_with('[') || ty.starts_with("struct{") {
        return Some(Zero::value(format!("{ty}{{}}")));
    }

    None
}

/// Zero values of a whole result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroTuple {
    zeroes: Vec<Zero>,
}

impl ZeroTuple {
    /// Build from per-position zeroes. `None` if any position is unknown or
    /// an elided error is not in the last position.
    pub fn new(zeroes: Vec<Option<Zero>>) -> Option<Self> {
        let zeroes: Vec<Zero> = zeroes.into_iter().collect::<Option<_>>()?;
        let misplaced = zeroes
            .iter()
            .rev()
            .skip(1)
            .any(|z| matches!(z, Zero::Elided));
        (!misplaced).then_some(Self { zeroes })
    }

    pub fn len(&self) -> usize {
        self.zeroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zeroes.is_empty()
    }

    pub fn zeroes(&self) -> &[Zero] {
        &self.zeroes
    }
}

/// Renders as the text to put after `return`, such as `"", 0,` for
/// `(string, int, error)`, so `return $ReturnZeroValues err` works.
impl fmt::Display for ZeroTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self
            .zeroes
            .iter()
            .filter_map(|z| match z {
                Zero::Value(v) => Some(v.as_str()),
                Zero::Elided => None,
            })
            .collect();
        f.write_str(&values.join(", "))?;
        if !values.is_empty() && matches!(self.zeroes.last(), Some(Zero::Elided)) {
            f.write_str(",")?;
        }
        Ok(())
    }
}
