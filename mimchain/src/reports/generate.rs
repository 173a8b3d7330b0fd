//! Generate command report.

use super::output::{Output, Report};

/// What `mimchain generate` produced.
#[derive(Debug)]
pub struct GenerateReport {
    /// `<package>:<Type>` the renderer mirrors.
    pub source: String,
    /// `<package>:<Type>` of the generated renderer.
    pub target: String,
    /// Go package name of the target package.
    pub package: String,
    /// Written file, relative to the module root.
    pub file: String,
    pub constructors: Vec<String>,
    pub methods: Vec<String>,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        out.title(&format!("Generated {}", self.target));
        out.key_value("Source", &self.source);
        out.key_value("Package", &self.package);
        out.newline();

        out.section("Files");
        out.added_item(&self.file);

        if self.constructors.is_empty() && self.methods.is_empty() {
            out.newline();
            out.warning(&format!(
                "{} has no chainable functions or methods, the generated renderer has no calls",
                self.source
            ));
            return;
        }

        for (name, items) in [("Constructors", &self.constructors), ("Methods", &self.methods)] {
            if items.is_empty() {
                continue;
            }
            out.newline();
            out.section(name);
            for item in items {
                out.list_item(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::BufferOutput;

    fn report() -> GenerateReport {
        GenerateReport {
            source: "github.com/sirkon/errors:Error".to_string(),
            target: "example.com/gen/errorsgen:Error".to_string(),
            package: "errorsgen".to_string(),
            file: "errorsgen/error_generated.go".to_string(),
            constructors: vec!["New".to_string(), "Wrap".to_string()],
            methods: vec![],
        }
    }

    #[test]
    fn test_render() {
        let mut out = BufferOutput::default();
        report().render(&mut out);

        insta::assert_snapshot!(out.0.trim_end(), @r"
        Generated example.com/gen/errorsgen:Error
        =========================================
        Source: github.com/sirkon/errors:Error
        Package: errorsgen

        Files:
          + errorsgen/error_generated.go

        Constructors:
          - New
          - Wrap
        ");
    }

    #[test]
    fn test_nothing_chainable() {
        let mut out = BufferOutput::default();
        GenerateReport {
            constructors: vec![],
            ..report()
        }
        .render(&mut out);

        assert!(out.0.ends_with(
            "warning: github.com/sirkon/errors:Error has no chainable functions or methods, the generated renderer has no calls\n"
        ));
    }
}
