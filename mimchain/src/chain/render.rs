//! Go source of the chaining renderer types.
//!
//! For a target `Error` two generic types are produced:
//!
//! - `Error[T]` with one method per chainable package function, writing
//!   the qualified call, e.g. `errors.New(...)`
//! - `ErrorAttr[T]` with one method per chainable method, appending
//!   `.Str(...)` and alike
//!
//! Every group of equally shaped functions shares one unexported base
//! method that writes the arguments; the per function methods only pass
//! the call name along.

use std::sync::Arc;

use gogh_codegen::{
    GoRenderer, Package, Params, ParamsSpec, Receiver, Result, Value,
    types::{BasicKind, Function, OracleError, PackageDescription, TypeDescriptor, TypeOracle},
};
use gogh_core::underscored;
use tracing::debug;

use super::{Group, constructors, group, methods};
use crate::source::SourcePoint;

/// Go package the generated renderers build upon.
pub const DEFAULT_RUNTIME: &str = "github.com/sirkon/gogh";

/// Scope name the generated code binds the source package alias to.
const SOURCE_PACKAGE_REF: &str = "mimchainSource";

#[derive(Debug, Clone)]
pub struct ChainOptions {
    /// Quote string values passed for parameters of type `string`
    pub quote_strings: bool,
    /// Import path of the Go rendering library
    pub runtime: String,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            quote_strings: false,
            runtime: DEFAULT_RUNTIME.to_string(),
        }
    }
}

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSummary {
    /// File name within the target package
    pub file: String,
    pub constructors: Vec<String>,
    pub methods: Vec<String>,
}

pub struct ChainGenerator<'a> {
    source: &'a SourcePoint,
    target: &'a SourcePoint,
    package: Arc<PackageDescription>,
    options: ChainOptions,
}

/// Which of the two generated types a group of methods belongs to.
#[derive(Debug, Clone, Copy)]
enum Side {
    Root,
    Attr,
}

impl Side {
    fn prefix(self) -> &'static str {
        match self {
            Side::Root => "constructor",
            Side::Attr => "method",
        }
    }

    fn receiver(self) -> &'static str {
        match self {
            Side::Root => "*$gtype[T]",
            Side::Attr => "*$gattr[T]",
        }
    }

    /// Expression reaching the root renderer from the receiver.
    fn root(self) -> &'static str {
        match self {
            Side::Root => "$x",
            Side::Attr => "$x.b",
        }
    }
}

impl<'a> ChainGenerator<'a> {
    /// Look the source type up.
    pub fn new(
        oracle: &dyn TypeOracle,
        source: &'a SourcePoint,
        target: &'a SourcePoint,
        options: ChainOptions,
    ) -> Result<Self> {
        let package = oracle.package(&source.path)?;
        if package.type_decl(&source.ident).is_none() {
            return Err(OracleError::NotFound {
                path: source.path.clone(),
                ident: source.ident.clone(),
            }
            .into());
        }

        Ok(Self {
            source,
            target,
            package,
            options,
        })
    }

    /// Name of the generated file: `Error` goes to `error_generated.go`.
    pub fn file_name(&self) -> String {
        format!("{}_generated.go", underscored(&self.target.ident))
    }

    /// Write the renderer types into `package`.
    pub fn generate(&self, package: &Package) -> Result<ChainSummary> {
        let constrs = constructors(&self.package, &self.source.ident);
        let chained = methods(&self.package, &self.source.ident);
        debug!(
            source = %self.source,
            constructors = constrs.len(),
            methods = chained.len(),
            "chainable functions found"
        );

        let file = self.file_name();
        let mut base = package.go_file(&file);
        let mut void = package.void();

        base.let_("gtype", self.target.ident.as_str())?;
        base.let_("gattr", format!("{}Attr", self.target.ident))?;
        let orig = void.type_name(&TypeDescriptor::named(&self.source.path, &self.source.ident))?;
        base.let_("orig", orig)?;
        let x = base.uniq("x", None)?;
        base.let_("x", x)?;

        // Declarations and per function methods land above the base methods.
        let r = base.lazy();
        self.type_declarations(&r)?;
        for g in group(&constrs) {
            self.render_group(&r, &base, Side::Root, &g)?;
        }
        for g in group(&chained) {
            self.render_group(&r, &base, Side::Attr, &g)?;
        }

        Ok(ChainSummary {
            file,
            constructors: constrs.iter().map(|f| f.name.clone()).collect(),
            methods: chained.iter().map(|f| f.name.clone()).collect(),
        })
    }

    fn type_declarations(&self, r: &GoRenderer) -> Result<()> {
        let mut r = r.scope();
        r.import(&self.options.runtime)?.bind("gogh")?;
        r.import("bytes")?.bind("bytes")?;

        r.line("// $gtype is a dedicated code renderer for chaining calls of $orig.")?;
        r.line("// The type provides constructor calls for the original type.")?;
        r.line("type $gtype[T $gogh.Importer] struct {")?;
        r.line("\tr   *$gogh.GoRenderer[T]")?;
        r.line("\tbuf *$bytes.Buffer")?;
        r.line("\ta   []any")?;
        r.line("}")?;
        r.newline()?;
        r.line("// $gattr is a dedicated code renderer for chaining calls of $orig.")?;
        r.line("// The type provides chaining calls of the original type.")?;
        r.line("type $gattr[T $gogh.Importer] struct {")?;
        r.line("\tb *$gtype[T]")?;
        r.line("}")?;
        r.newline()?;
        r.line("func ($x *$gtype[T]) String() string {")?;
        r.line("\treturn $x.buf.String()")?;
        r.line("}")?;
        r.newline()?;
        r.line("func ($x *$gattr[T]) String() string {")?;
        r.line("\treturn $x.b.buf.String()")?;
        r.line("}")
    }

    fn render_group(
        &self,
        r: &GoRenderer,
        base: &GoRenderer,
        side: Side,
        g: &Group<'_>,
    ) -> Result<()> {
        let base_name = g.base_name(side.prefix());
        for f in &g.funcs {
            let mut w = r.scope();
            w.let_("base", base_name.as_str())?;
            self.wrapper(&mut w, side, f)?;
        }

        let mut b = base.scope();
        b.let_("base", base_name.as_str())?;
        self.base_method(&mut b, side, g)
    }

    /// One method per original function, delegating to the base method.
    fn wrapper(&self, r: &mut GoRenderer, side: Side, f: &Function) -> Result<()> {
        let params = call_params(r, f)?;
        let usage = params_usage(&params, f.signature.variadic);

        r.newline()?;
        r.line_args("// $0 call support.", &[Value::from(f.name.as_str())])?;

        let source_path = self.source.path.clone();
        let name = f.name.clone();
        r.method(Receiver::new("$x", side.receiver()), &f.name)?
            .params(params)?
            .returns(ParamsSpec::name_types(["*$gattr[T]"]))?
            .body(move |r| match side {
                Side::Root => {
                    r.line_args(
                        "\t$x.r.Imports().Add(\"$0\").Ref(\"$1\")",
                        &[Value::from(source_path), Value::from(SOURCE_PACKAGE_REF)],
                    )?;
                    r.line_args(
                        "\treturn $x.$base(\"$${$1}.$0\", $2)",
                        &[
                            Value::from(name),
                            Value::from(SOURCE_PACKAGE_REF),
                            Value::from(usage),
                        ],
                    )
                }
                Side::Attr => r.line_args(
                    "\treturn $x.$base(\"$0\", $1)",
                    &[Value::from(name), Value::from(usage)],
                ),
            })
    }

    /// Shared method writing the call name and rendering every argument.
    fn base_method(&self, r: &mut GoRenderer, side: Side, g: &Group<'_>) -> Result<()> {
        r.import("fmt")?.bind("fmt")?;
        let root = r.string(side.root())?;
        r.let_("dst", format!("{root}.buf"))?;
        r.let_("r", format!("{root}.r"))?;
        r.let_("posargs", format!("{root}.a"))?;

        let name_param = r.uniq(
            match side {
                Side::Root => "funcName",
                Side::Attr => "methodName",
            },
            None,
        )?;
        r.let_("name", name_param.as_str())?;

        let args = base_args(r, g)?;
        let quoted = self.quoted_positions(g);
        if quoted.iter().any(|q| *q) {
            r.import("strconv")?.bind("strconv")?;
        }

        let mut params = Params::new().with(name_param, "string");
        for (i, arg) in args.iter().enumerate() {
            let ty = if g.variadic && i + 1 == args.len() { "...any" } else { "any" };
            params.push(arg.as_str(), ty);
        }

        r.newline()?;
        let variadic = g.variadic;
        r.method(Receiver::new("$x", side.receiver()), "$base")?
            .params(params)?
            .returns(ParamsSpec::name_types(["*$gattr[T]"]))?
            .body(move |r| {
                if matches!(side, Side::Attr) {
                    r.line("\t$dst.WriteByte('.')")?;
                }
                r.line("\t$dst.WriteString($name)")?;
                r.line("\t$dst.WriteByte('(')")?;

                let fixed = if variadic { args.len() - 1 } else { args.len() };
                for (i, arg) in args.iter().take(fixed).enumerate() {
                    render_argument(r, arg, i > 0, quoted[i])?;
                }
                if variadic && let Some(last) = args.last() {
                    render_variadic(r, last, args.len() > 1, quoted[args.len() - 1])?;
                }

                r.newline()?;
                r.line("\t$dst.WriteByte(')')")?;
                match side {
                    Side::Root => {
                        r.line("\treturn &$gattr[T]{")?;
                        r.line("\t\tb: $x,")?;
                        r.line("\t}")
                    }
                    Side::Attr => r.line("\treturn $x"),
                }
            })
    }

    /// Positions where every function of the group takes a `string` and
    /// quoting was asked for.
    fn quoted_positions(&self, g: &Group<'_>) -> Vec<bool> {
        (0..g.params)
            .map(|i| {
                self.options.quote_strings
                    && g.funcs.iter().all(|f| {
                        let Some(param) = f.signature.params.get(i) else {
                            return false;
                        };
                        let ty = match (&param.ty, f.signature.variadic && i + 1 == g.params) {
                            (TypeDescriptor::Slice { elem }, true) => &**elem,
                            (ty, _) => ty,
                        };
                        *ty == TypeDescriptor::basic(BasicKind::String)
                    })
            })
            .collect()
    }
}

/// Parameters of a per function method: the original names made unique,
/// every type `any`.
fn call_params(r: &mut GoRenderer, f: &Function) -> Result<Params> {
    let mut params = Params::new();
    let count = f.signature.params.len();
    for (i, param) in f.signature.params.iter().enumerate() {
        let base = if param.name.is_empty() || param.name == "_" {
            format!("arg{}", i + 1)
        } else {
            param.name.clone()
        };
        let name = r.uniq(&base, None)?;
        let ty = if f.signature.variadic && i + 1 == count { "...any" } else { "any" };
        params.push(name, ty);
    }
    Ok(params)
}

/// Argument list passing `params` on, spreading the variadic one.
fn params_usage(params: &Params, variadic: bool) -> String {
    let count = params.len();
    params
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            if variadic && i + 1 == count {
                format!("{name}...")
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Base method argument names: a parameter name every function of the
/// group agrees on, `argN` otherwise.
fn base_args(r: &mut GoRenderer, g: &Group<'_>) -> Result<Vec<String>> {
    (0..g.params)
        .map(|i| {
            let mut names = g.funcs.iter().map(|f| {
                f.signature
                    .params
                    .get(i)
                    .map(|p| p.name.as_str())
                    .unwrap_or_default()
            });
            let first = names.next().unwrap_or_default();
            let shared = !first.is_empty() && first != "_" && names.all(|n| n == first);

            let base = if shared {
                first.to_string()
            } else {
                format!("arg{}", i + 1)
            };
            r.uniq(&base, None)
        })
        .collect()
}

fn render_argument(r: &mut GoRenderer, arg: &str, separate: bool, quote: bool) -> Result<()> {
    let arg = [Value::from(arg)];
    r.newline()?;
    r.line_args("\t// render argument '$0' usage", &arg)?;
    if separate {
        r.line("\t$dst.WriteString(\", \")")?;
    }
    r.line_args("\tswitch v := $0.(type) {", &arg)?;
    r.line("\tcase string:")?;
    if quote {
        r.line("\t\tv = $strconv.Quote(v)")?;
    }
    r.line("\t\t$dst.WriteString($r.S(v, $posargs...))")?;
    r.line("\tcase $fmt.Stringer:")?;
    r.line("\t\t$dst.WriteString($r.S(v.String(), $posargs...))")?;
    r.line("\tdefault:")?;
    r.line_args("\t\t$dst.WriteString($fmt.Sprint($0))", &arg)?;
    r.line("\t}")
}

fn render_variadic(r: &mut GoRenderer, arg: &str, after_fixed: bool, quote: bool) -> Result<()> {
    let mut r = r.scope();
    let iter = r.uniq("val", None)?;
    r.let_("iter", iter)?;
    if after_fixed {
        r.let_("i", "_")?;
    } else {
        let i = r.uniq("i", None)?;
        r.let_("i", i)?;
    }

    let arg = [Value::from(arg)];
    r.newline()?;
    r.line_args("\t// render variadic arguments '$0' usage", &arg)?;
    r.line_args("\tfor $i, $iter := range $0 {", &arg)?;
    if after_fixed {
        r.line("\t\t$dst.WriteString(\", \")")?;
    } else {
        r.line("\t\tif $i > 0 {")?;
        r.line("\t\t\t$dst.WriteString(\", \")")?;
        r.line("\t\t}")?;
    }
    r.line("\t\tswitch v := $iter.(type) {")?;
    r.line("\t\tcase string:")?;
    if quote {
        r.line("\t\t\tv = $strconv.Quote(v)")?;
    }
    r.line("\t\t\t$dst.WriteString($r.S(v, $posargs...))")?;
    r.line("\t\tcase $fmt.Stringer:")?;
    r.line("\t\t\t$dst.WriteString($r.S(v.String(), $posargs...))")?;
    r.line("\t\tdefault:")?;
    r.line("\t\t\t$dst.WriteString($fmt.Sprint($iter))")?;
    r.line("\t\t}")?;
    r.line("\t}")
}

#[cfg(test)]
mod tests {
    use gogh_codegen::testing::TempModule;

    use super::*;
    use crate::chain::fixtures::{ERRORS, errors_package};

    struct FixedOracle(Arc<PackageDescription>);

    impl TypeOracle for FixedOracle {
        fn package(&self, path: &str) -> std::result::Result<Arc<PackageDescription>, OracleError> {
            if path == self.0.path {
                Ok(self.0.clone())
            } else {
                Err(OracleError::PackageNotFound {
                    path: path.to_string(),
                })
            }
        }
    }

    fn points() -> (SourcePoint, SourcePoint) {
        (
            format!("{ERRORS}:Error").parse().unwrap(),
            "example.com/gen/errorsgen:Error".parse().unwrap(),
        )
    }

    fn generate(options: ChainOptions) -> String {
        let temp = TempModule::new().unwrap();
        let oracle = FixedOracle(Arc::new(errors_package()));
        let (source, target) = points();

        let generator = ChainGenerator::new(&oracle, &source, &target, options).unwrap();
        let package = temp.module().package("errorsgen", &target.path).unwrap();
        let summary = generator.generate(&package).unwrap();
        assert_eq!(summary.file, "error_generated.go");
        assert_eq!(summary.constructors, ["Just", "New", "Newf", "Wrap"]);
        assert_eq!(summary.methods, ["Int", "Pfx", "Str"]);

        temp.module().render().unwrap();
        temp.read("errorsgen/error_generated.go").unwrap()
    }

    #[test]
    fn test_unknown_source_type() {
        let oracle = FixedOracle(Arc::new(errors_package()));
        let source: SourcePoint = format!("{ERRORS}:Missing").parse().unwrap();
        let (_, target) = points();

        let err = ChainGenerator::new(&oracle, &source, &target, ChainOptions::default())
            .err()
            .unwrap();
        assert!(matches!(
            err.kind(),
            gogh_codegen::Error::Oracle(OracleError::NotFound { .. })
        ));

        let elsewhere: SourcePoint = "example.com/none:Error".parse().unwrap();
        assert!(ChainGenerator::new(&oracle, &elsewhere, &target, ChainOptions::default()).is_err());
    }

    #[test]
    fn test_declarations_and_imports() {
        let text = generate(ChainOptions::default());

        assert!(text.starts_with("package errorsgen\n\n"), "{text}");
        assert!(
            text.contains("import (\n\t\"bytes\"\n\t\"fmt\"\n\n\t\"github.com/sirkon/gogh\"\n)\n"),
            "{text}"
        );
        assert!(
            text.contains("// Error is a dedicated code renderer for chaining calls of errors.Error."),
            "{text}"
        );
        assert!(text.contains("type Error[T gogh.Importer] struct {\n\tr   *gogh.GoRenderer[T]\n"));
        assert!(text.contains("type ErrorAttr[T gogh.Importer] struct {\n\tb *Error[T]\n}"));
        // The source package is only referenced from generated strings.
        assert!(!text.contains("\"github.com/sirkon/errors\"\n)"), "{text}");
    }

    #[test]
    fn test_wrappers_before_base_methods() {
        let text = generate(ChainOptions::default());

        let wrapper = text.find("func (x *Error[T]) New(msg any) *ErrorAttr[T] {").unwrap();
        let base = text
            .find("func (x *Error[T]) constructor1(funcName string, arg1 any) *ErrorAttr[T] {")
            .unwrap();
        assert!(wrapper < base, "{text}");

        insta::assert_snapshot!(
            &text[wrapper..text[wrapper..].find("\n}\n").map(|end| wrapper + end + 2).unwrap()],
            @r#"
        func (x *Error[T]) New(msg any) *ErrorAttr[T] {
        	x.r.Imports().Add("github.com/sirkon/errors").Ref("mimchainSource")
        	return x.constructor1("${mimchainSource}.New", msg)
        }
        "#
        );
    }

    #[test]
    fn test_variadic_constructor() {
        let text = generate(ChainOptions::default());

        assert!(text.contains(
            "func (x *Error[T]) Newf(format any, a ...any) *ErrorAttr[T] {\n\tx.r.Imports().Add(\"github.com/sirkon/errors\").Ref(\"mimchainSource\")\n\treturn x.constructor2variadic(\"${mimchainSource}.Newf\", format, a...)\n}"
        ), "{text}");

        let start = text
            .find("func (x *Error[T]) constructor2variadic(funcName string, format any, a ...any) *ErrorAttr[T] {")
            .unwrap();
        let body = &text[start..];
        let body = &body[..body.find("\n}\n").unwrap()];
        assert!(body.contains("\tfor _, val := range a {\n\t\tx.buf.WriteString(\", \")\n"), "{body}");
        assert!(body.contains("\treturn &ErrorAttr[T]{\n\t\tb: x,\n\t}"), "{body}");
    }

    #[test]
    fn test_attr_methods() {
        let text = generate(ChainOptions::default());

        assert!(text.contains(
            "func (x *ErrorAttr[T]) Str(name any, value any) *ErrorAttr[T] {\n\treturn x.method2(\"Str\", name, value)\n}"
        ), "{text}");

        let start = text
            .find("func (x *ErrorAttr[T]) method2(methodName string, name any, value any) *ErrorAttr[T] {")
            .unwrap();
        let body = &text[start..];
        let body = &body[..body.find("\n}\n").unwrap()];
        assert!(body.starts_with(
            "func (x *ErrorAttr[T]) method2(methodName string, name any, value any) *ErrorAttr[T] {\n\tx.b.buf.WriteByte('.')\n\tx.b.buf.WriteString(methodName)\n"
        ), "{body}");
        assert!(body.contains("\t\tx.b.buf.WriteString(x.b.r.S(v, x.b.a...))\n"), "{body}");
        assert!(body.ends_with("\treturn x"), "{body}");
        assert!(!body.contains("strconv"), "{body}");
    }

    #[test]
    fn test_quoted_strings() {
        let text = generate(ChainOptions {
            quote_strings: true,
            ..ChainOptions::default()
        });

        assert!(text.contains("\t\"strconv\"\n"), "{text}");
        let start = text
            .find("func (x *ErrorAttr[T]) method2(")
            .unwrap();
        let body = &text[start..];
        let body = &body[..body.find("\n}\n").unwrap()];
        // name is a string in both Int and Str, value only in Str.
        assert_eq!(body.matches("strconv.Quote(v)").count(), 1, "{body}");
    }
}
