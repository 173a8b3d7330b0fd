//! Go type descriptors and the type oracle interface.
//!
//! - [`TypeDescriptor`] - structural description of a Go type
//! - [`TypeOracle`] - resolves packages and identifiers into descriptors
//! - [`PackageDescription`] - exported surface of a Go package
//!
//! Descriptors are plain data deserializable from JSON, so any tool able
//! to inspect Go packages can feed them.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Byte,
    Rune,
    #[serde(rename = "unsafe.Pointer")]
    UnsafePointer,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::String => "string",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::UnsafePointer => "unsafe.Pointer",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            BasicKind::Bool | BasicKind::String | BasicKind::UnsafePointer
        )
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// Named and typed entry of a tuple: a parameter or a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn unnamed(ty: TypeDescriptor) -> Self {
        Self::new("", ty)
    }
}

/// Struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub embedded: bool,
}

/// Interface method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
}

/// Function signature. A variadic signature has a slice as its last parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Var>,
    #[serde(default)]
    pub results: Vec<Var>,
    #[serde(default)]
    pub variadic: bool,
}

/// Structural description of a Go type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Basic {
        name: BasicKind,
    },
    /// Declared type; an empty path means the universe scope (e.g. `error`)
    Named {
        #[serde(default)]
        path: String,
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeDescriptor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        underlying: Option<Box<TypeDescriptor>>,
    },
    TypeParam {
        name: String,
    },
    Pointer {
        elem: Box<TypeDescriptor>,
    },
    Slice {
        elem: Box<TypeDescriptor>,
    },
    Array {
        len: u64,
        elem: Box<TypeDescriptor>,
    },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: Box<TypeDescriptor>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<Method>,
    },
    Func(Signature),
}

impl TypeDescriptor {
    pub fn basic(kind: BasicKind) -> Self {
        TypeDescriptor::Basic { name: kind }
    }

    /// Declared type without known underlying type.
    pub fn named(path: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDescriptor::Named {
            path: path.into(),
            name: name.into(),
            args: Vec::new(),
            underlying: None,
        }
    }

    /// Declared type with its underlying type.
    pub fn named_with(
        path: impl Into<String>,
        name: impl Into<String>,
        underlying: TypeDescriptor,
    ) -> Self {
        TypeDescriptor::Named {
            path: path.into(),
            name: name.into(),
            args: Vec::new(),
            underlying: Some(Box::new(underlying)),
        }
    }

    /// The predeclared `error` interface.
    pub fn error() -> Self {
        let method = Method {
            name: "Error".to_string(),
            signature: Signature {
                params: Vec::new(),
                results: vec![Var::unnamed(TypeDescriptor::basic(BasicKind::String))],
                variadic: false,
            },
        };
        TypeDescriptor::named_with(
            "",
            "error",
            TypeDescriptor::Interface {
                methods: vec![method],
            },
        )
    }

    pub fn pointer(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: TypeDescriptor) -> Self {
        TypeDescriptor::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    /// Whether this is the declared type `path.name`, ignoring type arguments.
    pub fn is_named(&self, path: &str, name: &str) -> bool {
        matches!(self, TypeDescriptor::Named { path: p, name: n, .. } if p == path && n == name)
    }

    /// Whether values of this type satisfy the `error` interface.
    pub fn is_error_compatible(&self) -> bool {
        match self {
            TypeDescriptor::Named {
                path,
                name,
                underlying,
                ..
            } => {
                (path.is_empty() && name == "error")
                    || underlying
                        .as_deref()
                        .is_some_and(|u| matches!(u, TypeDescriptor::Interface { .. }) && u.is_error_compatible())
            }
            TypeDescriptor::Interface { methods } => methods.iter().any(|m| {
                m.name == "Error"
                    && m.signature.params.is_empty()
                    && m.signature.results.len() == 1
                    && m.signature.results[0].ty == TypeDescriptor::basic(BasicKind::String)
            }),
            _ => false,
        }
    }
}

/// Render `ty` as Go source, asking `qualifier` for the package prefix of
/// every declared type with a non-empty path. A `None` prefix means the
/// type is referenced unqualified.
pub fn type_string<E>(
    ty: &TypeDescriptor,
    qualifier: &mut dyn FnMut(&str) -> Result<Option<String>, E>,
) -> Result<String, E> {
    let mut out = String::new();
    write_type(&mut out, ty, qualifier)?;
    Ok(out)
}

fn write_type<E>(
    out: &mut String,
    ty: &TypeDescriptor,
    qualifier: &mut dyn FnMut(&str) -> Result<Option<String>, E>,
) -> Result<(), E> {
    match ty {
        TypeDescriptor::Basic {
            name: BasicKind::UnsafePointer,
        } => {
            if let Some(prefix) = qualifier("unsafe")? {
                out.push_str(&prefix);
                out.push('.');
            }
            out.push_str("Pointer");
        }
        TypeDescriptor::Basic { name } => out.push_str(name.name()),
        TypeDescriptor::Named {
            path, name, args, ..
        } => {
            if !path.is_empty()
                && let Some(prefix) = qualifier(path)?
            {
                out.push_str(&prefix);
                out.push('.');
            }
            out.push_str(name);
            if !args.is_empty() {
                out.push('[');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(out, arg, qualifier)?;
                }
                out.push(']');
            }
        }
        TypeDescriptor::TypeParam { name } => out.push_str(name),
        TypeDescriptor::Pointer { elem } => {
            out.push('*');
            write_type(out, elem, qualifier)?;
        }
        TypeDescriptor::Slice { elem } => {
            out.push_str("[]");
            write_type(out, elem, qualifier)?;
        }
        TypeDescriptor::Array { len, elem } => {
            out.push_str(&format!("[{len}]"));
            write_type(out, elem, qualifier)?;
        }
        TypeDescriptor::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key, qualifier)?;
            out.push(']');
            write_type(out, value, qualifier)?;
        }
        TypeDescriptor::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type(out, elem, qualifier)?;
        }
        TypeDescriptor::Struct { fields } => {
            out.push_str("struct{");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if !field.embedded {
                    out.push_str(&field.name);
                    out.push(' ');
                }
                write_type(out, &field.ty, qualifier)?;
            }
            out.push('}');
        }
        TypeDescriptor::Interface { methods } => {
            out.push_str("interface{");
            for (i, method) in methods.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(&method.name);
                write_signature(out, &method.signature, qualifier)?;
            }
            out.push('}');
        }
        TypeDescriptor::Func(signature) => {
            out.push_str("func");
            write_signature(out, signature, qualifier)?;
        }
    }
    Ok(())
}

fn write_signature<E>(
    out: &mut String,
    signature: &Signature,
    qualifier: &mut dyn FnMut(&str) -> Result<Option<String>, E>,
) -> Result<(), E> {
    out.push('(');
    write_tuple(out, &signature.params, signature.variadic, qualifier)?;
    out.push(')');

    match signature.results.as_slice() {
        [] => {}
        [single] if single.name.is_empty() => {
            out.push(' ');
            write_type(out, &single.ty, qualifier)?;
        }
        results => {
            out.push_str(" (");
            write_tuple(out, results, false, qualifier)?;
            out.push(')');
        }
    }
    Ok(())
}

fn write_tuple<E>(
    out: &mut String,
    vars: &[Var],
    variadic: bool,
    qualifier: &mut dyn FnMut(&str) -> Result<Option<String>, E>,
) -> Result<(), E> {
    for (i, var) in vars.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if !var.name.is_empty() {
            out.push_str(&var.name);
            out.push(' ');
        }
        match &var.ty {
            TypeDescriptor::Slice { elem } if variadic && i + 1 == vars.len() => {
                out.push_str("...");
                write_type(out, elem, qualifier)?;
            }
            ty => write_type(out, ty, qualifier)?,
        }
    }
    Ok(())
}

/// Default package name of an import path: the last element, skipping
/// major version suffixes (`/v2`, `.v3`) and `go-`/`-go` affixes.
///
/// ```
/// use gogh_codegen::types::default_package_name;
///
/// assert_eq!(default_package_name("github.com/sirkon/go-format/v2"), "format");
/// assert_eq!(default_package_name("gopkg.in/yaml.v3"), "yaml");
/// assert_eq!(default_package_name("fmt"), "fmt");
/// ```
pub fn default_package_name(path: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() > 1 && parts.last().is_some_and(|p| is_major_version(p)) {
        parts.pop();
    }

    let mut last = parts.last().copied().unwrap_or_default();
    if let Some((stem, version)) = last.rsplit_once('.')
        && is_major_version(version)
    {
        last = stem;
    }
    let last = last
        .strip_prefix("go-")
        .or_else(|| last.strip_suffix("-go"))
        .unwrap_or(last);

    let name: String = last
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{name}"),
        Some(_) => name,
        None => "pkg".to_string(),
    }
}

fn is_major_version(s: &str) -> bool {
    s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = type_string::<std::convert::Infallible>(self, &mut |path| {
            Ok(Some(default_package_name(path)))
        });
        match rendered {
            Ok(s) => f.write_str(&s),
            Err(never) => match never {},
        }
    }
}

// =============================================================================
// Oracle
// =============================================================================

/// Function or method exported by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub signature: Signature,
    /// Method declared on a pointer receiver
    #[serde(default)]
    pub pointer_receiver: bool,
}

/// Type declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub underlying: TypeDescriptor,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub methods: Vec<Function>,
}

/// Exported surface of a Go package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescription {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl PackageDescription {
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Descriptor of the declared type `name`.
    pub fn named(&self, name: &str) -> Option<TypeDescriptor> {
        self.type_decl(name).map(|decl| TypeDescriptor::Named {
            path: self.path.clone(),
            name: decl.name.clone(),
            args: decl
                .type_params
                .iter()
                .map(|p| TypeDescriptor::TypeParam { name: p.clone() })
                .collect(),
            underlying: Some(Box::new(decl.underlying.clone())),
        })
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("package '{path}' not found")]
    PackageNotFound { path: String },

    #[error("'{ident}' not found in package '{path}'")]
    NotFound { path: String, ident: String },

    #[error("failed to load package '{path}': {message}")]
    Load { path: String, message: String },
}

/// Source of type information about Go packages.
pub trait TypeOracle {
    /// Describe the package at `path`.
    fn package(&self, path: &str) -> Result<Arc<PackageDescription>, OracleError>;

    /// Resolve the declared type `ident` of the package at `path`.
    fn resolve(&self, path: &str, ident: &str) -> Result<TypeDescriptor, OracleError> {
        self.package(path)?
            .named(ident)
            .ok_or_else(|| OracleError::NotFound {
                path: path.to_string(),
                ident: ident.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeDescriptor {
        TypeDescriptor::basic(BasicKind::Int)
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::basic(BasicKind::String)
    }

    #[test]
    fn test_display_composites() {
        let ty = TypeDescriptor::map(
            string(),
            TypeDescriptor::slice(TypeDescriptor::pointer(TypeDescriptor::named(
                "github.com/sirkon/go-format/v2",
                "Formatter",
            ))),
        );
        assert_eq!(ty.to_string(), "map[string][]*format.Formatter");
    }

    #[test]
    fn test_unsafe_pointer_is_qualified() {
        let ty = TypeDescriptor::slice(TypeDescriptor::basic(BasicKind::UnsafePointer));
        let mut asked = Vec::new();
        let rendered = type_string::<std::convert::Infallible>(&ty, &mut |path| {
            asked.push(path.to_string());
            Ok(Some("uns".to_string()))
        })
        .unwrap();

        assert_eq!(rendered, "[]uns.Pointer");
        assert_eq!(asked, ["unsafe"]);
        assert_eq!(ty.to_string(), "[]unsafe.Pointer");
    }

    #[test]
    fn test_display_channels() {
        assert_eq!(TypeDescriptor::chan(ChanDir::Both, int()).to_string(), "chan int");
        assert_eq!(TypeDescriptor::chan(ChanDir::Recv, int()).to_string(), "<-chan int");
        assert_eq!(TypeDescriptor::chan(ChanDir::Send, int()).to_string(), "chan<- int");
    }

    #[test]
    fn test_display_variadic_signature() {
        let sig = TypeDescriptor::Func(Signature {
            params: vec![
                Var::new("format", string()),
                Var::new("args", TypeDescriptor::slice(TypeDescriptor::Interface { methods: vec![] })),
            ],
            results: vec![Var::unnamed(TypeDescriptor::error())],
            variadic: true,
        });
        assert_eq!(sig.to_string(), "func(format string, args ...interface{}) error");
    }

    #[test]
    fn test_display_named_results() {
        let sig = TypeDescriptor::Func(Signature {
            params: vec![],
            results: vec![Var::new("n", int()), Var::new("err", TypeDescriptor::error())],
            variadic: false,
        });
        assert_eq!(sig.to_string(), "func() (n int, err error)");
    }

    #[test]
    fn test_error_compatible() {
        assert!(TypeDescriptor::error().is_error_compatible());
        assert!(TypeDescriptor::named("", "error").is_error_compatible());
        assert!(!string().is_error_compatible());

        let custom = TypeDescriptor::named_with(
            "github.com/x/errs",
            "Error",
            TypeDescriptor::Struct { fields: vec![] },
        );
        assert!(!custom.is_error_compatible());
    }

    #[test]
    fn test_default_package_name() {
        assert_eq!(default_package_name("github.com/sirkon/gogh"), "gogh");
        assert_eq!(default_package_name("github.com/sirkon/go-format/v2"), "format");
        assert_eq!(default_package_name("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(default_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(default_package_name("github.com/x/clickhouse-go"), "clickhouse");
        assert_eq!(default_package_name("C"), "c");
    }

    #[test]
    fn test_descriptor_json() {
        let json = r#"{"kind": "pointer", "elem": {"kind": "named", "path": "github.com/x/y", "name": "T"}}"#;
        let ty: TypeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(ty, TypeDescriptor::pointer(TypeDescriptor::named("github.com/x/y", "T")));
    }

    #[test]
    fn test_package_named() {
        let pkg = PackageDescription {
            path: "github.com/x/y".to_string(),
            name: "y".to_string(),
            types: vec![TypeDecl {
                name: "Error".to_string(),
                underlying: TypeDescriptor::Struct { fields: vec![] },
                type_params: vec![],
                methods: vec![],
            }],
            functions: vec![],
        };

        let named = pkg.named("Error").unwrap();
        assert!(named.is_named("github.com/x/y", "Error"));
        assert!(pkg.named("Missing").is_none());
    }
}
