//! Header scanning for files that are extended in place.
//!
//! Only the package clause and the import declarations are looked at.
//! Scanning stops at the first line that is neither an import, a comment
//! nor blank.

use std::sync::LazyLock;

use regex::Regex;

static IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:([\p{L}_][\p{L}\p{N}_]*|\.)\s+)?"([^"]+)"\s*(?://.*)?$"#)
        .expect("import spec regex")
});

static PACKAGE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^package\s+([\p{L}_][\p{L}\p{N}_]*)\s*(?://.*)?$")
        .expect("package clause regex")
});

/// Import found in an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingImport {
    pub path: String,
    pub alias: Option<String>,
}

/// What a reused file already declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReuseInfo {
    pub package: String,
    pub imports: Vec<ExistingImport>,
    /// Zero based line of the first import declaration
    pub first_import_line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    Header,
    Group(usize),
}

/// Scan `content`. The error is a human readable reason.
pub fn scan(content: &str) -> Result<ReuseInfo, String> {
    let mut info = ReuseInfo::default();
    let mut state = State::Preamble;
    let mut in_comment = false;

    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if in_comment {
            if let Some(end) = line.find("*/") {
                in_comment = false;
                if !line[end + 2..].trim().is_empty() && state != State::Preamble {
                    break;
                }
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_comment = !line[2..].contains("*/");
            continue;
        }

        match state {
            State::Preamble => {
                let Some(captures) = PACKAGE_CLAUSE.captures(line) else {
                    return Err(format!("line {}: expected package clause", i + 1));
                };
                info.package = captures[1].to_string();
                state = State::Header;
            }
            State::Header => {
                let Some(rest) = line.strip_prefix("import") else {
                    break;
                };
                if !rest.starts_with([' ', '\t', '(', '"']) {
                    break;
                }
                info.first_import_line.get_or_insert(i);

                let rest = rest.trim();
                if let Some(group) = rest.strip_prefix('(') {
                    let group = group.trim();
                    if group.is_empty() {
                        state = State::Group(i);
                    } else if let Some(single) = group.strip_suffix(')') {
                        if !single.trim().is_empty() {
                            push_spec(&mut info, single.trim(), i)?;
                        }
                    } else {
                        push_spec(&mut info, group, i)?;
                        state = State::Group(i);
                    }
                } else {
                    push_spec(&mut info, rest, i)?;
                }
            }
            State::Group(_) => {
                if line == ")" {
                    state = State::Header;
                } else if let Some(spec) = line.strip_suffix(')') {
                    push_spec(&mut info, spec.trim(), i)?;
                    state = State::Header;
                } else {
                    push_spec(&mut info, line, i)?;
                }
            }
        }
    }

    match state {
        State::Preamble => Err("missing package clause".to_string()),
        State::Group(start) => Err(format!(
            "import group opened at line {} is not closed",
            start + 1
        )),
        State::Header => Ok(info),
    }
}

/// Name declared by the package clause, skipping leading comments.
pub fn package_clause(content: &str) -> Option<String> {
    let mut in_comment = false;
    for line in content.lines().map(str::trim) {
        if in_comment {
            in_comment = !line.contains("*/");
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_comment = !line[2..].contains("*/");
            continue;
        }
        return PACKAGE_CLAUSE
            .captures(line)
            .map(|captures| captures[1].to_string());
    }
    None
}

fn push_spec(info: &mut ReuseInfo, spec: &str, line: usize) -> Result<(), String> {
    let Some(captures) = IMPORT_SPEC.captures(spec) else {
        return Err(format!("line {}: malformed import spec '{spec}'", line + 1));
    };
    info.imports.push(ExistingImport {
        path: captures[2].to_string(),
        alias: captures.get(1).map(|m| m.as_str().to_string()),
    });
    Ok(())
}
