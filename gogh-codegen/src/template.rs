//! Template line formatting.
//!
//! A template line mixes literal text with markers:
//!
//! - `$name` or `${name}` - value bound in the scope chain
//! - `$0`, `${1}` - positional argument
//! - `${name:F}` - value rendered with format `F`
//! - `$$` - literal `$`
//!
//! Formats are `P` (public case), `p` (private case), `_` (underscored),
//! `-` (struck), `R` (proto case) and `\n` (one list item per line).

use gogh_core::{private, proto, public, struck, underscored};

use crate::{Error, Result, Value, types::TypeDescriptor};

/// What a marker refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Name(String),
    Index(usize),
}

/// Value format requested by a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Public,
    Private,
    Underscored,
    Struck,
    Proto,
    Multiline,
}

impl Format {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "P" => Some(Format::Public),
            "p" => Some(Format::Private),
            "_" => Some(Format::Underscored),
            "-" => Some(Format::Struck),
            "R" => Some(Format::Proto),
            "\\n" => Some(Format::Multiline),
            _ => None,
        }
    }

    fn apply_case(self, s: &str) -> Option<String> {
        match self {
            Format::Public => Some(public(s)),
            Format::Private => Some(private(s)),
            Format::Underscored => Some(underscored(s)),
            Format::Struck => Some(struck(s)),
            Format::Proto => Some(proto(s)),
            Format::Multiline => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Marker {
    source: String,
    key: Key,
    format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Marker(Marker),
}

/// Resolves markers that are not positional.
pub trait Resolve {
    /// Nearest binding of `name`.
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Render a type, registering whatever imports it needs.
    fn render_type(&mut self, ty: &TypeDescriptor) -> Result<String>;

    /// Commit the import of `path` and return its alias.
    fn render_package(&mut self, path: &str) -> Result<String>;
}

/// Parsed template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(line: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = line;

        while let Some(pos) = rest.find('$') {
            text.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                text.push('$');
                rest = tail;
                continue;
            }

            if let Some(inner) = after.strip_prefix('{') {
                let Some(end) = inner.find('}') else {
                    return Err(Error::UnterminatedMarker {
                        line: line.to_string(),
                    });
                };
                let body = &inner[..end];
                let (name, format) = match body.split_once(':') {
                    Some((name, format)) => (name.trim(), Some(format.to_string())),
                    None => (body.trim(), None),
                };
                flush(&mut segments, &mut text);
                segments.push(Segment::Marker(Marker {
                    source: format!("${{{body}}}"),
                    key: key_of(name),
                    format,
                }));
                rest = &inner[end + 1..];
                continue;
            }

            let len = marker_len(after);
            if len == 0 {
                text.push('$');
                rest = after;
                continue;
            }

            let name = &after[..len];
            flush(&mut segments, &mut text);
            segments.push(Segment::Marker(Marker {
                source: format!("${name}"),
                key: key_of(name),
                format: None,
            }));
            rest = &after[len..];
        }

        text.push_str(rest);
        flush(&mut segments, &mut text);

        Ok(Self {
            source: line.to_string(),
            segments,
        })
    }

    pub fn render(&self, args: &[Value], resolver: &mut dyn Resolve) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Marker(marker) => {
                    let value = match &marker.key {
                        Key::Index(i) => Some(args.get(*i).cloned().ok_or_else(|| {
                            Error::PositionalOutOfRange {
                                marker: marker.source.clone(),
                                len: args.len(),
                            }
                        })?),
                        Key::Name(name) => resolver.lookup(name),
                    };
                    let Some(value) = value else {
                        return Err(Error::UnresolvedMarker {
                            marker: marker.source.clone(),
                            line: self.source.clone(),
                        });
                    };
                    out.push_str(&render_value(&value, marker.format.as_deref(), resolver)?);
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render a template line in one step.
pub fn format_line(line: &str, args: &[Value], resolver: &mut dyn Resolve) -> Result<String> {
    Template::parse(line)?.render(args, resolver)
}

fn render_value(value: &Value, format: Option<&str>, resolver: &mut dyn Resolve) -> Result<String> {
    let format = match format {
        None => None,
        Some(raw) => Some(Format::parse(raw).ok_or_else(|| Error::UnsupportedFormat {
            format: raw.to_string(),
            kind: value.kind(),
        })?),
    };
    let unsupported = |f: Format| Error::UnsupportedFormat {
        format: format!("{f:?}"),
        kind: value.kind(),
    };

    let text = match value {
        Value::Text(s) => s.clone(),
        Value::Type(ty) => resolver.render_type(ty)?,
        Value::Package(path) => resolver.render_package(path)?,
        Value::Commas(commas) => {
            return match format {
                None => Ok(commas.to_string()),
                Some(Format::Multiline) => Ok(commas.multiline()),
                Some(f) => Err(unsupported(f)),
            };
        }
        Value::Params(params) => {
            return match format {
                None => Ok(params.to_string()),
                Some(Format::Multiline) => Ok(params.multiline()),
                Some(f) => Err(unsupported(f)),
            };
        }
    };

    match format {
        None => Ok(text),
        Some(f) => f.apply_case(&text).ok_or_else(|| unsupported(f)),
    }
}

fn key_of(name: &str) -> Key {
    match name.parse::<usize>() {
        Ok(i) if name.chars().all(|c| c.is_ascii_digit()) => Key::Index(i),
        _ => Key::Name(name.to_string()),
    }
}

// Length of a bare marker name: a digit run or an identifier.
fn marker_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_digit() => s
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(s.len(), |(i, _)| i),
        Some((_, c)) if c == '_' || c.is_alphabetic() => s
            .char_indices()
            .find(|(_, c)| !(*c == '_' || c.is_alphanumeric()))
            .map_or(s.len(), |(i, _)| i),
        _ => 0,
    }
}

fn flush(segments: &mut Vec<Segment>, text: &mut String) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{Commas, Params};

    #[derive(Default)]
    struct MapResolver {
        values: HashMap<String, Value>,
        imported: Vec<String>,
    }

    impl MapResolver {
        fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
            self.values.insert(name.to_string(), value.into());
            self
        }
    }

    impl Resolve for MapResolver {
        fn lookup(&self, name: &str) -> Option<Value> {
            self.values.get(name).cloned()
        }

        fn render_type(&mut self, ty: &TypeDescriptor) -> Result<String> {
            Ok(ty.to_string())
        }

        fn render_package(&mut self, path: &str) -> Result<String> {
            self.imported.push(path.to_string());
            Ok(crate::types::default_package_name(path))
        }
    }

    fn render(line: &str, args: &[Value], resolver: &mut MapResolver) -> Result<String> {
        format_line(line, args, resolver)
    }

    #[test]
    fn test_no_markers() {
        let mut r = MapResolver::default();
        assert_eq!(render("abcd", &[], &mut r).unwrap(), "abcd");
        assert_eq!(render("a$$b", &[], &mut r).unwrap(), "a$b");
    }

    #[test]
    fn test_positional() {
        let mut r = MapResolver::default();
        let args = [Value::from(1i32), Value::from("a")];
        assert_eq!(render("$0 $1", &args, &mut r).unwrap(), "1 a");
        assert_eq!(render("${1}${0}", &args, &mut r).unwrap(), "a1");
    }

    #[test]
    fn test_named_lookup() {
        let mut r = MapResolver::default().with("recv", "x").with("type", "Builder");
        assert_eq!(
            render("func ($recv *${type}) Build() {", &[], &mut r).unwrap(),
            "func (x *Builder) Build() {"
        );
    }

    #[test]
    fn test_marker_stops_at_non_identifier() {
        let mut r = MapResolver::default().with("pkg", "fmt");
        assert_eq!(render("$pkg.Println()", &[], &mut r).unwrap(), "fmt.Println()");
    }

    #[test]
    fn test_dollar_escapes() {
        let mut r = MapResolver::default();
        assert_eq!(render("$${iy} costs $ 5", &[], &mut r).unwrap(), "${iy} costs $ 5");
    }

    #[test]
    fn test_case_formats() {
        let mut r = MapResolver::default().with("name", "user_id");
        assert_eq!(render("${name:P}", &[], &mut r).unwrap(), "UserID");
        assert_eq!(render("${name:p}", &[], &mut r).unwrap(), "userID");
        assert_eq!(render("${name:R}", &[], &mut r).unwrap(), "UserId");

        let mut r = MapResolver::default().with("name", "HelloWorld");
        assert_eq!(render("${name:_}", &[], &mut r).unwrap(), "hello_world");
        assert_eq!(render("${name:-}", &[], &mut r).unwrap(), "hello-world");
        assert_eq!(render("${0:_}", &[Value::from("UserID")], &mut r).unwrap(), "user_id");
    }

    #[test]
    fn test_list_formats() {
        let args: Commas = ["a", "b"].into_iter().collect();
        let params = Params::new().with("x", "int").with("y", "string");
        let mut r = MapResolver::default().with("args", args).with("params", params);

        assert_eq!(render("f($args)", &[], &mut r).unwrap(), "f(a, b)");
        assert_eq!(render("f(${args:\\n})", &[], &mut r).unwrap(), "f(\na,\nb,\n)");
        assert_eq!(
            render("func f($params)", &[], &mut r).unwrap(),
            "func f(x int, y string)"
        );
    }

    #[test]
    fn test_unsupported_formats() {
        let mut r = MapResolver::default()
            .with("name", "x")
            .with("args", Commas::new().with("a"));

        let err = render("${name:\\n}", &[], &mut r).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { kind: "text", .. }));

        let err = render("${args:P}", &[], &mut r).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { kind: "list", .. }));

        let err = render("${name:Z}", &[], &mut r).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref format, .. } if format == "Z"));
    }

    #[test]
    fn test_unresolved_marker() {
        let mut r = MapResolver::default();

        let err = render("return $missing", &[], &mut r).unwrap_err();
        assert!(matches!(err, Error::UnresolvedMarker { ref marker, .. } if marker == "$missing"));

        let err = render("$0 $1", &[Value::from("a")], &mut r).unwrap_err();
        assert!(matches!(err, Error::PositionalOutOfRange { ref marker, len: 1 } if marker == "$1"));
    }

    #[test]
    fn test_unterminated_marker() {
        assert!(matches!(
            Template::parse("${name"),
            Err(Error::UnterminatedMarker { .. })
        ));
    }

    #[test]
    fn test_type_and_package_values() {
        let ty = TypeDescriptor::pointer(TypeDescriptor::named("github.com/x/errors", "Error"));
        let mut r = MapResolver::default().with("errs", Value::package("github.com/x/errors"));

        assert_eq!(render("var _ $0", &[ty.into()], &mut r).unwrap(), "var _ *errors.Error");
        assert_eq!(render("$errs.New()", &[], &mut r).unwrap(), "errors.New()");
        assert_eq!(r.imported, vec!["github.com/x/errors".to_string()]);
    }
}
