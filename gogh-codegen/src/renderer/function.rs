//! Function and method declarations.

use std::{collections::HashSet, panic::Location};

use gogh_core::is_identifier;

use super::GoRenderer;
use crate::{
    Error, Params, Result,
    error::Locate,
    params::{ParamEntry, ParamType, ParamsSpec},
    types::TypeDescriptor,
    zeroes::{ZeroTuple, zero_of_text, zero_of_type},
};

/// Method receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    name: String,
    ty: ParamType,
}

impl Receiver {
    /// Receiver with a type spelled as template text, e.g. `("t", "*$Type")`.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Text(ty.into()),
        }
    }

    pub fn typed(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Type(ty),
        }
    }
}

/// Declaration under construction.
///
/// ```ignore
/// r.function("Foo")?
///     .params(ParamsSpec::name_types(["a int", "b string"]))?
///     .returns(ParamsSpec::name_types(["string", "error"]))?
///     .body(|r| r.line(r#"return $ReturnZeroValues $errs.New("failed")"#))?;
/// ```
///
/// Every name and type goes through template expansion. Parameter names
/// are reserved in the unique table of the declaration scope.
#[derive(Debug)]
pub struct FunctionBuilder {
    r: GoRenderer,
    kind: &'static str,
    name: String,
    receiver: Option<String>,
    params: Params,
    results: Params,
    seen: HashSet<String>,
}

impl FunctionBuilder {
    #[track_caller]
    pub(super) fn new(r: GoRenderer, receiver: Option<Receiver>, name: &str) -> Result<Self> {
        let location = Location::caller();
        let kind = if receiver.is_some() { "method" } else { "function" };

        let name = r.expand(name).located(location)?;
        if !is_identifier(&name) {
            return Err(Error::InvalidIdentifier {
                what: kind.to_string(),
                name,
            }
            .at(location));
        }

        let mut builder = Self {
            r,
            kind,
            name,
            receiver: None,
            params: Params::new(),
            results: Params::new(),
            seen: HashSet::new(),
        };
        if let Some(receiver) = receiver {
            let what = format!("{} {} receiver", builder.kind, builder.name);
            let entry = ParamEntry {
                name: receiver.name,
                ty: receiver.ty,
            };
            let (name, ty) = builder.resolve(&what, &entry).located(location)?;
            builder.receiver = Some(Params::new().with(name, ty).to_string());
        }
        Ok(builder)
    }

    #[track_caller]
    pub fn params(mut self, spec: impl Into<ParamsSpec>) -> Result<Self> {
        let location = Location::caller();
        let what = format!("{} {} params", self.kind, self.name);

        let entries = spec.into().normalize(&what).located(location)?;
        for entry in &entries {
            let (name, ty) = self.resolve(&what, entry).located(location)?;
            self.params.push(name, ty);
        }
        Ok(self)
    }

    /// Set the results. When the zero value of every result is known,
    /// `$ReturnZeroValues` is bound for the body.
    #[track_caller]
    pub fn returns(mut self, spec: impl Into<ParamsSpec>) -> Result<Self> {
        let location = Location::caller();
        let what = format!("{} {} results", self.kind, self.name);

        let entries = spec.into().normalize(&what).located(location)?;
        let mut zeroes = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let last = i + 1 == entries.len();
            let (name, ty) = self.resolve(&what, entry).located(location)?;
            let zero = match &entry.ty {
                ParamType::Type(t) => {
                    let r = &self.r;
                    zero_of_type(t, last, &mut |t| r.resolve_type(t)).located(location)?
                }
                ParamType::Text(_) => zero_of_text(&ty, last),
            };
            zeroes.push(zero);
            self.results.push(name, ty);
        }

        if let Some(tuple) = ZeroTuple::new(zeroes)
            && !tuple.is_empty()
        {
            self.r.let_return_zero_values(&tuple).located(location)?;
        }
        Ok(self)
    }

    /// Write the declaration with the body produced by `f`.
    #[track_caller]
    pub fn body<F>(mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut GoRenderer) -> Result<()>,
    {
        let header = self.signature();
        self.r.raw(&header)?;
        f(&mut self.r)?;
        self.r.raw("}")
    }

    fn signature(&self) -> String {
        let mut out = String::from("func ");
        if let Some(receiver) = &self.receiver {
            out.push('(');
            out.push_str(receiver);
            out.push_str(") ");
        }
        out.push_str(&self.name);
        out.push('(');
        out.push_str(&self.params.to_string());
        out.push(')');

        let mut results = self.results.iter();
        match (results.next(), results.next()) {
            (None, _) => {}
            (Some(("", ty)), None) => {
                out.push(' ');
                out.push_str(ty);
            }
            _ => {
                out.push_str(" (");
                out.push_str(&self.results.to_string());
                out.push(')');
            }
        }
        out.push_str(" {");
        out
    }

    fn resolve(&mut self, what: &str, entry: &ParamEntry) -> Result<(String, String)> {
        let name = self.r.expand(&entry.name)?.trim().to_string();
        let ty = match &entry.ty {
            ParamType::Text(text) => self.r.expand(text)?.trim().to_string(),
            ParamType::Type(ty) => self.r.resolve_type(ty)?,
        };

        if !name.is_empty() && name != "_" {
            if !is_identifier(&name) {
                return Err(Error::InvalidIdentifier {
                    what: what.to_string(),
                    name,
                });
            }
            if !self.seen.insert(name.clone()) {
                return Err(Error::DuplicateParameter {
                    what: what.to_string(),
                    name,
                });
            }
            self.r.state().uniq[self.r.uniq].reserve(&name);
        }
        Ok((name, ty))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        Value,
        imports::ImportSettings,
        renderer::{FileState, lock},
        types::{BasicKind, Var},
    };

    fn go() -> (Arc<Mutex<FileState>>, GoRenderer) {
        let file = Arc::new(Mutex::new(FileState::new(
            "example.com/app",
            ImportSettings::default(),
        )));
        (file.clone(), GoRenderer::new(file))
    }

    fn source(file: &Arc<Mutex<FileState>>) -> String {
        lock(file).assemble_go("app", None).unwrap()
    }

    #[test]
    fn test_function_with_zero_values() {
        let (file, mut r) = go();
        r.import("github.com/sirkon/errors").unwrap().bind("errs").unwrap();

        r.function("Foo")
            .unwrap()
            .params(ParamsSpec::name_types(["a int", "b string"]))
            .unwrap()
            .returns(ParamsSpec::name_types(["string", "error"]))
            .unwrap()
            .body(|r| {
                assert_eq!(r.string("$ReturnZeroValues").unwrap(), "\"\",");
                r.line(r#"	return $ReturnZeroValues $errs.New("failed")"#)
            })
            .unwrap();

        insta::assert_snapshot!(source(&file).trim_end(), @r#"
        package app

        import (
        	"github.com/sirkon/errors"
        )

        func Foo(a int, b string) (string, error) {
        	return "", errors.New("failed")
        }
        "#);
    }

    #[test]
    fn test_method_with_typed_results() {
        let (file, r) = go();
        let reader = TypeDescriptor::named_with(
            "io",
            "ReadCloser",
            TypeDescriptor::Interface { methods: vec![] },
        );

        r.method(Receiver::new("f", "*File"), "Open")
            .unwrap()
            .params(vec![Var::new("name", TypeDescriptor::basic(BasicKind::String))])
            .unwrap()
            .returns(vec![Var::unnamed(reader), Var::unnamed(TypeDescriptor::error())])
            .unwrap()
            .body(|r| r.line("\treturn $ReturnZeroValues nil"))
            .unwrap();

        let text = source(&file);
        assert!(text.contains("\"io\""), "{text}");
        assert!(
            text.contains("func (f *File) Open(name string) (io.ReadCloser, error) {\n\treturn nil, nil\n}"),
            "{text}"
        );
    }

    #[test]
    fn test_single_unnamed_result() {
        let (file, r) = go();
        r.function("count")
            .unwrap()
            .returns(ParamsSpec::name_types(["int"]))
            .unwrap()
            .body(|r| r.line("\treturn $ReturnZeroValues"))
            .unwrap();

        assert!(source(&file).contains("func count() int {\n\treturn 0\n}"));
    }

    #[test]
    fn test_named_results_keep_parens() {
        let (file, r) = go();
        r.function("pair")
            .unwrap()
            .returns(ParamsSpec::key_values([Value::from("n"), Value::from("int")]))
            .unwrap()
            .body(|_| Ok(()))
            .unwrap();

        assert!(source(&file).contains("func pair() (n int) {\n}"));
    }

    #[test]
    fn test_unknown_zero_is_not_bound() {
        let (_, r) = go();
        r.function("f")
            .unwrap()
            .returns(ParamsSpec::name_types(["pkg.Thing", "error"]))
            .unwrap()
            .body(|r| {
                assert!(!r.is_bound("ReturnZeroValues"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_templated_names() {
        let (file, mut r) = go();
        r.let_("entity", "user_account").unwrap();
        r.let_("type", "int64").unwrap();

        r.function("New${entity:P}")
            .unwrap()
            .params(ParamsSpec::name_types(["${entity:p}ID $type"]))
            .unwrap()
            .body(|_| Ok(()))
            .unwrap();

        assert!(source(&file).contains("func NewUserAccount(userAccountID int64) {"));
    }

    #[test]
    fn test_param_names_reserved() {
        let (_, r) = go();
        r.function("f")
            .unwrap()
            .params(ParamsSpec::name_types(["ctx context.Context"]))
            .unwrap()
            .body(|r| {
                assert_eq!(r.uniq("ctx", None).unwrap(), "ctx2");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_invalid_names() {
        let (_, r) = go();
        let err = r.function("not valid").unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidIdentifier { .. }));

        let err = r
            .function("f")
            .unwrap()
            .params(ParamsSpec::name_types(["a int", "a string"]))
            .unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateParameter { name, .. } if name == "a"));

        let err = r
            .method(Receiver::new("t", "*T"), "f")
            .unwrap()
            .params(ParamsSpec::name_types(["t int"]))
            .unwrap_err();
        assert!(matches!(err.kind(), Error::DuplicateParameter { .. }));
    }

    #[test]
    fn test_blank_params_may_repeat() {
        let (file, r) = go();
        r.function("f")
            .unwrap()
            .params(ParamsSpec::name_types(["_ int", "_ string"]))
            .unwrap()
            .body(|_| Ok(()))
            .unwrap();

        assert!(source(&file).contains("func f(_ int, _ string) {"));
    }
}
