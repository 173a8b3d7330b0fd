//! Parameter and result list shapes accepted by function builders.

use gogh_core::is_keyword;

use crate::{
    Error, Params, Result, Value,
    types::{TypeDescriptor, Var},
};

/// A parameter or result list as the caller spells it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamsSpec {
    /// No entries
    #[default]
    Empty,
    /// `name type` pairs where both halves are template text
    List(Params),
    /// Typed variables, all named or all unnamed
    Tuple(Vec<Var>),
    /// Alternating name and type tokens; an empty name means unnamed
    KeyValues(Vec<Value>),
    /// `"name type"` strings closed by an empty string
    NameTypes(Vec<String>),
}

impl ParamsSpec {
    /// `"name type"` strings with the terminator appended.
    pub fn name_types<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
        items.push(String::new());
        ParamsSpec::NameTypes(items)
    }

    /// Alternating name/type tokens.
    pub fn key_values<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ParamsSpec::KeyValues(items.into_iter().map(Into::into).collect())
    }
}

impl From<Params> for ParamsSpec {
    fn from(params: Params) -> Self {
        if params.is_empty() {
            ParamsSpec::Empty
        } else {
            ParamsSpec::List(params)
        }
    }
}

impl From<Vec<Var>> for ParamsSpec {
    fn from(vars: Vec<Var>) -> Self {
        if vars.is_empty() {
            ParamsSpec::Empty
        } else {
            ParamsSpec::Tuple(vars)
        }
    }
}

/// Type half of a normalized entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Template text naming a type
    Text(String),
    Type(TypeDescriptor),
}

/// Normalized entry. Names are still template text at this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    pub name: String,
    pub ty: ParamType,
}

impl ParamsSpec {
    /// Flatten into entries, checking the shape. `what` names the list in
    /// errors, e.g. `"Foo params"`.
    pub fn normalize(&self, what: &str) -> Result<Vec<ParamEntry>> {
        let entries = match self {
            ParamsSpec::Empty => Vec::new(),
            ParamsSpec::List(params) => params
                .iter()
                .map(|(name, ty)| ParamEntry {
                    name: name.to_string(),
                    ty: ParamType::Text(ty.to_string()),
                })
                .collect(),
            ParamsSpec::Tuple(vars) => vars
                .iter()
                .map(|v| ParamEntry {
                    name: v.name.clone(),
                    ty: ParamType::Type(v.ty.clone()),
                })
                .collect(),
            ParamsSpec::KeyValues(tokens) => key_values(tokens, what)?,
            ParamsSpec::NameTypes(items) => {
                let Some((last, items)) = items.split_last() else {
                    return Ok(Vec::new());
                };
                if !last.is_empty() {
                    return Err(Error::MissingTerminator {
                        what: what.to_string(),
                    });
                }
                items
                    .iter()
                    .map(|item| {
                        let (name, ty) = split_name_type(item);
                        ParamEntry {
                            name: name.to_string(),
                            ty: ParamType::Text(ty.to_string()),
                        }
                    })
                    .collect()
            }
        };

        let named = entries.iter().filter(|e| !e.name.is_empty()).count();
        if named != 0 && named != entries.len() {
            return Err(Error::MixedNames {
                what: what.to_string(),
            });
        }
        Ok(entries)
    }
}

fn key_values(tokens: &[Value], what: &str) -> Result<Vec<ParamEntry>> {
    if tokens.len() % 2 != 0 {
        return Err(Error::OddKeyValues {
            what: what.to_string(),
            len: tokens.len(),
        });
    }

    let mut entries = Vec::with_capacity(tokens.len() / 2);
    for (i, pair) in tokens.chunks(2).enumerate() {
        let Some(name) = pair[0].as_text() else {
            return Err(Error::InvalidToken {
                what: what.to_string(),
                index: i * 2,
                expected: "a name",
            });
        };
        let ty = match &pair[1] {
            Value::Text(s) => ParamType::Text(s.clone()),
            Value::Type(ty) => ParamType::Type(ty.clone()),
            _ => {
                return Err(Error::InvalidToken {
                    what: what.to_string(),
                    index: i * 2 + 1,
                    expected: "a type",
                });
            }
        };
        entries.push(ParamEntry {
            name: name.to_string(),
            ty,
        });
    }
    Ok(entries)
}

/// Split `"name type"` into its halves. Text without a leading name is all
/// type: `"chan int"` and `"*T"` have no name.
pub fn split_name_type(s: &str) -> (&str, &str) {
    let s = s.trim();
    let Some((first, rest)) = s.split_once(char::is_whitespace) else {
        return ("", s);
    };

    let is_name = first.starts_with('$')
        || (!is_keyword(first)
            && first
                .chars()
                .all(|c| c == '_' || c.is_alphanumeric())
            && first
                .chars()
                .next()
                .is_some_and(|c| c == '_' || c.is_alphabetic()));
    if is_name {
        (first, rest.trim_start())
    } else {
        ("", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BasicKind;

    fn text(entries: &[ParamEntry]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|e| {
                let ty = match &e.ty {
                    ParamType::Text(s) => s.clone(),
                    ParamType::Type(t) => t.to_string(),
                };
                (e.name.clone(), ty)
            })
            .collect()
    }

    #[test]
    fn test_split_name_type() {
        assert_eq!(split_name_type("a int"), ("a", "int"));
        assert_eq!(split_name_type("int"), ("", "int"));
        assert_eq!(split_name_type("ch chan int"), ("ch", "chan int"));
        assert_eq!(split_name_type("chan int"), ("", "chan int"));
        assert_eq!(split_name_type("f func(a int) error"), ("f", "func(a int) error"));
        assert_eq!(split_name_type("func(a int) error"), ("", "func(a int) error"));
        assert_eq!(split_name_type("args ...string"), ("args", "...string"));
        assert_eq!(split_name_type("ctx $ctx.Context"), ("ctx", "$ctx.Context"));
        assert_eq!(split_name_type("$name int"), ("$name", "int"));
    }

    #[test]
    fn test_name_types() {
        let spec = ParamsSpec::name_types(["a int", "b string"]);
        let entries = spec.normalize("f params").unwrap();
        assert_eq!(
            text(&entries),
            vec![("a".into(), "int".into()), ("b".into(), "string".into())]
        );
    }

    #[test]
    fn test_name_types_requires_terminator() {
        let spec = ParamsSpec::NameTypes(vec!["a int".to_string()]);
        assert!(matches!(
            spec.normalize("f params"),
            Err(Error::MissingTerminator { .. })
        ));
    }

    #[test]
    fn test_key_values() {
        let spec = ParamsSpec::key_values([
            Value::from("a"),
            Value::from(TypeDescriptor::basic(BasicKind::Int)),
            Value::from("b"),
            Value::from("string"),
        ]);
        let entries = spec.normalize("f params").unwrap();
        assert_eq!(
            text(&entries),
            vec![("a".into(), "int".into()), ("b".into(), "string".into())]
        );
    }

    #[test]
    fn test_key_values_errors() {
        let odd = ParamsSpec::key_values(["a"]);
        assert!(matches!(
            odd.normalize("f params"),
            Err(Error::OddKeyValues { len: 1, .. })
        ));

        let bad_key = ParamsSpec::key_values([
            Value::from(TypeDescriptor::basic(BasicKind::Int)),
            Value::from("int"),
        ]);
        assert!(matches!(
            bad_key.normalize("f params"),
            Err(Error::InvalidToken { index: 0, .. })
        ));

        let bad_type = ParamsSpec::key_values([Value::from("a"), Value::package("fmt")]);
        assert!(matches!(
            bad_type.normalize("f params"),
            Err(Error::InvalidToken { index: 1, .. })
        ));
    }

    #[test]
    fn test_mixed_names() {
        let spec = ParamsSpec::Tuple(vec![
            Var::new("a", TypeDescriptor::basic(BasicKind::Int)),
            Var::unnamed(TypeDescriptor::error()),
        ]);
        assert!(matches!(
            spec.normalize("f results"),
            Err(Error::MixedNames { .. })
        ));

        let spec = ParamsSpec::name_types(["a int", "string"]);
        assert!(matches!(
            spec.normalize("f params"),
            Err(Error::MixedNames { .. })
        ));
    }

    #[test]
    fn test_unnamed_results() {
        let spec = ParamsSpec::from(vec![
            Var::unnamed(TypeDescriptor::basic(BasicKind::String)),
            Var::unnamed(TypeDescriptor::error()),
        ]);
        let entries = spec.normalize("f results").unwrap();
        assert!(entries.iter().all(|e| e.name.is_empty()));
    }

    #[test]
    fn test_empty_shapes() {
        assert!(ParamsSpec::Empty.normalize("f").unwrap().is_empty());
        assert!(ParamsSpec::from(Params::new()).normalize("f").unwrap().is_empty());
        assert!(ParamsSpec::NameTypes(vec![]).normalize("f").unwrap().is_empty());
    }
}
