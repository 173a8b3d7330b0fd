//! End to end rendering through a module on disk.

use std::{fs, thread};

use gogh_codegen::{
    Module, NoopFormatter, ParamsSpec, Receiver, Value,
    imports::{AliasTable, ImportSettings},
};
use tempfile::TempDir;

fn module(temp: &TempDir) -> Module {
    fs::write(temp.path().join("go.mod"), "module example.com/app\n\ngo 1.22\n").unwrap();
    Module::builder(temp.path(), "example.com/app")
        .formatter(NoopFormatter)
        .autogen("gogh-test")
        .build()
}

#[test]
fn test_function_file() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let package = module.package("service", "internal/service").unwrap();

    let mut r = package.go_file("service.go");
    r.comment("Service implementation.").unwrap();
    r.import("github.com/sirkon/errors").unwrap().bind("errs").unwrap();

    r.function("Foo")
        .unwrap()
        .params(ParamsSpec::name_types(["a int", "b string"]))
        .unwrap()
        .returns(ParamsSpec::name_types(["string", "error"]))
        .unwrap()
        .body(|r| r.line(r#"	return $ReturnZeroValues $errs.New("failed")"#))
        .unwrap();

    module.render().unwrap();

    let written = fs::read_to_string(temp.path().join("internal/service/service.go")).unwrap();
    insta::assert_snapshot!(written.trim_end(), @r#"
    // Code generated by gogh-test. DO NOT EDIT.

    // Service implementation.
    package service

    import (
    	"github.com/sirkon/errors"
    )

    func Foo(a int, b string) (string, error) {
    	return "", errors.New("failed")
    }
    "#);
}

#[test]
fn test_lazy_declarations_land_first() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let package = module.root_package("app").unwrap();

    let mut r = package.go_file("order.go");
    let mut header = r.lazy();
    r.line("func second() {}").unwrap();
    header.line("func first() {}").unwrap();
    header.newline().unwrap();
    r.line("func third() {}").unwrap();

    module.render().unwrap();

    let written = fs::read_to_string(temp.path().join("order.go")).unwrap();
    insta::assert_snapshot!(written.trim_end(), @r"
    // Code generated by gogh-test. DO NOT EDIT.

    package app

    func first() {}

    func second() {}
    func third() {}
    ");
}

#[test]
fn test_colliding_aliases_across_packages() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("go.mod"), "module example.com/app\n").unwrap();
    let settings = ImportSettings::default().with_corrector(
        AliasTable::new().with("github.com/pkg/errors", "pkgerrors"),
    );
    let module = Module::builder(temp.path(), "example.com/app")
        .formatter(NoopFormatter)
        .import_settings(settings)
        .build();

    let package = module.root_package("app").unwrap();
    let mut r = package.go_file("errs.go");
    r.line_args(
        "var _, _, _ = $0.New, $1.New, $2.New",
        &[
            Value::package("errors"),
            Value::package("github.com/pkg/errors"),
            Value::package("github.com/sirkon/errors"),
        ],
    )
    .unwrap();

    module.render().unwrap();

    let written = fs::read_to_string(temp.path().join("errs.go")).unwrap();
    insta::assert_snapshot!(written.trim_end(), @r#"
    package app

    import (
    	"errors"

    	pkgerrors "github.com/pkg/errors"
    	errors2 "github.com/sirkon/errors"
    )

    var _, _, _ = errors.New, pkgerrors.New, errors2.New
    "#);
}

#[test]
fn test_cross_package_references() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let model = module.package("model", "model").unwrap();
    let api = module.package("api", "api").unwrap();

    let mut m = model.go_file("user.go");
    assert_eq!(m.object_name(model.path(), "User").unwrap(), "User");

    let mut a = api.go_file("handler.go");
    let user = a.object_name(model.path(), "User").unwrap();
    a.method(Receiver::new("h", "*Handler"), "Get")
        .unwrap()
        .params(ParamsSpec::name_types(["id int64"]))
        .unwrap()
        .returns(ParamsSpec::name_types([format!("*{user}"), "error".to_string()]))
        .unwrap()
        .body(|r| r.line("\treturn $ReturnZeroValues nil"))
        .unwrap();

    module.render().unwrap();

    let written = fs::read_to_string(temp.path().join("api/handler.go")).unwrap();
    assert!(written.contains("\t\"example.com/app/model\"\n"), "{written}");
    assert!(
        written.contains("func (h *Handler) Get(id int64) (*model.User, error) {\n\treturn nil, nil\n}"),
        "{written}"
    );
}

#[test]
fn test_void_and_raw_files() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let package = module.package("docs", "docs").unwrap();

    let mut void = package.void();
    void.line("var never = 1").unwrap();

    let mut raw = package.raw("README.md").unwrap();
    raw.let_("name", "docs").unwrap();
    raw.line("# Package ${name:P}").unwrap();

    module.render().unwrap();

    let entries: Vec<String> = fs::read_dir(temp.path().join("docs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["README.md".to_string()]);
    assert_eq!(
        fs::read_to_string(temp.path().join("docs/README.md")).unwrap(),
        "# Package Docs\n"
    );
}

#[test]
fn test_files_driven_from_threads() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let package = module.root_package("app").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut r = package.go_file(&format!("file{i}.go"));
            thread::spawn(move || {
                r.line_args("const N$0 = $0", &[Value::from(i)]).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    module.render().unwrap();
    for i in 0..4 {
        let written = fs::read_to_string(temp.path().join(format!("file{i}.go"))).unwrap();
        assert!(written.ends_with(&format!("const N{i} = {i}\n")), "{written}");
    }
}

#[test]
fn test_rendering_twice_keeps_files() {
    let temp = TempDir::new().unwrap();
    let module = module(&temp);
    let mut r = module.root_package("app").unwrap().go_file("a.go");
    r.line("var a = 1").unwrap();

    module.render().unwrap();
    let first = fs::read_to_string(temp.path().join("a.go")).unwrap();
    module.render().unwrap();
    assert_eq!(fs::read_to_string(temp.path().join("a.go")).unwrap(), first);
}
