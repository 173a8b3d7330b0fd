//! Values substituted into templates.
//!
//! - [`Value`] - what scopes and positional arguments hold
//! - [`Commas`] - comma separated list
//! - [`Params`] - comma separated `name type` pairs
//! - [`Q`] - text rendered as a Go interpreted string literal
//! - [`L`] - text inserted verbatim

use std::fmt;

use crate::types::TypeDescriptor;

/// A value bound in a scope or passed as a positional template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text, case formats apply
    Text(String),
    /// Go type, rendered through the import-aware type namer
    Type(TypeDescriptor),
    /// Import path, rendered as the committed package alias
    Package(String),
    /// Comma separated list
    Commas(Commas),
    /// Parameter list
    Params(Params),
}

impl Value {
    /// Reference to an imported package by its path.
    pub fn package(path: impl Into<String>) -> Self {
        Value::Package(path.into())
    }

    /// Human readable kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Type(_) => "type",
            Value::Package(_) => "package",
            Value::Commas(_) => "list",
            Value::Params(_) => "params",
        }
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<TypeDescriptor> for Value {
    fn from(t: TypeDescriptor) -> Self {
        Value::Type(t)
    }
}

impl From<&TypeDescriptor> for Value {
    fn from(t: &TypeDescriptor) -> Self {
        Value::Type(t.clone())
    }
}

impl From<Commas> for Value {
    fn from(c: Commas) -> Self {
        Value::Commas(c)
    }
}

impl From<Params> for Value {
    fn from(p: Params) -> Self {
        Value::Params(p)
    }
}

macro_rules! value_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Text(v.to_string())
                }
            }
        )*
    };
}

value_from_display!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

/// Text rendered as a double quoted Go string literal.
///
/// # Example
///
/// ```
/// use gogh_codegen::{Q, Value};
///
/// assert_eq!(Q("a\"b\n").to_string(), r#""a\"b\n""#);
/// assert_eq!(Value::from(Q("x")), Value::Text("\"x\"".into()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Q<'a>(pub &'a str);

impl fmt::Display for Q<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&go_quote(self.0))
    }
}

impl From<Q<'_>> for Value {
    fn from(q: Q<'_>) -> Self {
        Value::Text(q.to_string())
    }
}

/// Text inserted as is, for source fragments that must not be quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L<'a>(pub &'a str);

impl fmt::Display for L<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<L<'_>> for Value {
    fn from(l: L<'_>) -> Self {
        Value::Text(l.0.to_string())
    }
}

/// Quote `s` the way Go's `strconv.Quote` does.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Comma separated list of values.
///
/// # Example
///
/// ```
/// use gogh_codegen::Commas;
///
/// let mut args = Commas::new();
/// args.push("ctx").push(42);
/// assert_eq!(args.to_string(), "ctx, 42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commas {
    items: Vec<String>,
}

impl Commas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value (mutable).
    pub fn push(&mut self, value: impl fmt::Display) -> &mut Self {
        self.items.push(value.to_string());
        self
    }

    /// Append a value.
    pub fn with(mut self, value: impl fmt::Display) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// One item per line with trailing commas when two or more items were collected.
    pub fn multiline(&self) -> String {
        multiline(self.items.iter().map(String::as_str))
            .unwrap_or_else(|| self.to_string())
    }
}

impl<S: fmt::Display> FromIterator<S> for Commas {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for Commas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(", "))
    }
}

/// Comma separated list of `name type` pairs.
///
/// An empty name renders the type alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    params: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `name type` pair (mutable).
    pub fn push(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut Self {
        self.params.push((name.into(), ty.into()));
        self
    }

    /// Append a `name type` pair.
    pub fn with(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.push(name, ty);
        self
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    /// One pair per line with trailing commas when two or more pairs were collected.
    pub fn multiline(&self) -> String {
        let rendered: Vec<String> = self.params.iter().map(|(n, t)| pair(n, t)).collect();
        multiline(rendered.iter().map(String::as_str)).unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.params.iter().map(|(n, t)| pair(n, t)).collect();
        f.write_str(&rendered.join(", "))
    }
}

fn pair(name: &str, ty: &str) -> String {
    if name.is_empty() {
        ty.to_string()
    } else {
        format!("{name} {ty}")
    }
}

fn multiline<'a>(items: impl ExactSizeIterator<Item = &'a str>) -> Option<String> {
    if items.len() < 2 {
        return None;
    }

    let mut buf = String::from("\n");
    for item in items {
        buf.push_str(item);
        buf.push_str(",\n");
    }
    Some(buf)
}
