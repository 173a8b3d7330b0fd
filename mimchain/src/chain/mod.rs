//! Chainable function discovery and grouping.
//!
//! A function or method is chainable when it is exported and returns just
//! the source type or a pointer to it. Such calls can be strung together,
//! `errors.New("x").Str("k", v).Int("n", 1)`, and the generated renderer
//! mirrors them one method per call.

mod render;

use std::collections::BTreeMap;

use gogh_codegen::types::{Function, PackageDescription, Signature, TypeDescriptor};

pub use render::{ChainGenerator, ChainOptions, ChainSummary, DEFAULT_RUNTIME};

/// Exported package functions returning the `path.name` type.
pub fn constructors<'a>(package: &'a PackageDescription, name: &str) -> Vec<&'a Function> {
    let mut found: Vec<&Function> = package
        .functions
        .iter()
        .filter(|f| is_chainable(f, &package.path, name))
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// Exported methods of the `path.name` type returning that type.
pub fn methods<'a>(package: &'a PackageDescription, name: &str) -> Vec<&'a Function> {
    let Some(decl) = package.type_decl(name) else {
        return Vec::new();
    };
    let mut found: Vec<&Function> = decl
        .methods
        .iter()
        .filter(|f| is_chainable(f, &package.path, name))
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

fn is_chainable(f: &Function, path: &str, name: &str) -> bool {
    if !f.name.starts_with(|c: char| c.is_uppercase()) {
        return false;
    }
    let [result] = f.signature.results.as_slice() else {
        return false;
    };
    match &result.ty {
        TypeDescriptor::Pointer { elem } => elem.is_named(path, name),
        ty => ty.is_named(path, name),
    }
}

/// Weight of a signature: 2 per parameter, one less when variadic.
///
/// Only the last parameter can be variadic, so equal weights mean equal
/// parameter count and variadicity.
pub fn weight(signature: &Signature) -> usize {
    (signature.params.len() * 2).saturating_sub(usize::from(signature.variadic))
}

/// Functions sharing one base method of the generated renderer.
#[derive(Debug)]
pub struct Group<'a> {
    pub params: usize,
    pub variadic: bool,
    pub funcs: Vec<&'a Function>,
}

impl Group<'_> {
    /// Name of the shared base method, e.g. `method2variadic`.
    pub fn base_name(&self, prefix: &str) -> String {
        let suffix = if self.variadic { "variadic" } else { "" };
        format!("{prefix}{}{suffix}", self.params)
    }
}

/// Group functions by weight, lightest first. Groups keep the order of
/// `funcs`.
pub fn group<'a>(funcs: &[&'a Function]) -> Vec<Group<'a>> {
    let mut by_weight: BTreeMap<usize, Vec<&'a Function>> = BTreeMap::new();
    for f in funcs {
        by_weight.entry(weight(&f.signature)).or_default().push(f);
    }

    by_weight
        .into_values()
        .map(|funcs| Group {
            params: funcs[0].signature.params.len(),
            variadic: funcs[0].signature.variadic,
            funcs,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use gogh_codegen::types::{
        BasicKind, Function, PackageDescription, Signature, TypeDecl, TypeDescriptor, Var,
    };

    pub const ERRORS: &str = "github.com/sirkon/errors";

    fn string() -> TypeDescriptor {
        TypeDescriptor::basic(BasicKind::String)
    }

    fn any() -> TypeDescriptor {
        TypeDescriptor::Interface { methods: vec![] }
    }

    fn error_ptr() -> TypeDescriptor {
        TypeDescriptor::pointer(TypeDescriptor::named(ERRORS, "Error"))
    }

    pub fn func(name: &str, params: Vec<Var>, variadic: bool, result: TypeDescriptor) -> Function {
        Function {
            name: name.to_string(),
            signature: Signature {
                params,
                results: vec![Var::unnamed(result)],
                variadic,
            },
            pointer_receiver: true,
        }
    }

    /// A trimmed down `github.com/sirkon/errors`.
    pub fn errors_package() -> PackageDescription {
        PackageDescription {
            path: ERRORS.to_string(),
            name: "errors".to_string(),
            types: vec![TypeDecl {
                name: "Error".to_string(),
                underlying: TypeDescriptor::Struct { fields: vec![] },
                type_params: vec![],
                methods: vec![
                    func(
                        "Str",
                        vec![Var::new("name", string()), Var::new("value", string())],
                        false,
                        error_ptr(),
                    ),
                    func("Pfx", vec![Var::new("prefix", string())], false, error_ptr()),
                    func(
                        "Int",
                        vec![
                            Var::new("name", string()),
                            Var::new("value", TypeDescriptor::basic(BasicKind::Int)),
                        ],
                        false,
                        error_ptr(),
                    ),
                    func("Error", vec![], false, string()),
                    func("clone", vec![], false, error_ptr()),
                ],
            }],
            functions: vec![
                func("New", vec![Var::new("msg", string())], false, error_ptr()),
                func(
                    "Newf",
                    vec![
                        Var::new("format", string()),
                        Var::new("a", TypeDescriptor::slice(any())),
                    ],
                    true,
                    error_ptr(),
                ),
                func(
                    "Wrap",
                    vec![Var::new("err", TypeDescriptor::error()), Var::new("msg", string())],
                    false,
                    error_ptr(),
                ),
                func("Just", vec![Var::new("err", TypeDescriptor::error())], false, error_ptr()),
                func("Is", vec![Var::new("err", TypeDescriptor::error())], false, TypeDescriptor::basic(BasicKind::Bool)),
            ],
        }
    }
}
