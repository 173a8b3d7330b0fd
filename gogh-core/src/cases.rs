//! Identifier case conversions for generated Go code.
//!
//! All conversions are golint aware: common initialisms such as `ID` or
//! `HTTP` keep their canonical casing.

use crate::keywords::is_keyword;

/// Initialisms kept fully upper-cased in public identifiers.
pub const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

fn is_initialism(s: &str) -> bool {
    COMMON_INITIALISMS.contains(&s)
}

/// Convert to an exported camel-cased Go identifier (e.g., "user_id" -> "UserID").
pub fn public(s: &str) -> String {
    let result: String = s.split('_').map(public_part).collect();
    escape_reserved(&result)
}

/// Convert to an unexported camel-cased Go identifier (e.g., "ID" -> "id").
///
/// Keywords get an `Escaped` suffix since they can't be used as identifiers.
pub fn private(s: &str) -> String {
    let mut parts = s.split('_').filter(|p| !p.is_empty());
    let Some(head) = parts.next() else {
        return String::new();
    };

    let mut result = lower_leading(&public_part(head));
    for part in parts {
        result.push_str(&public_part(part));
    }
    escape_reserved(&result)
}

/// Convert to snake case keeping initialisms together (e.g., "HTTPServer" -> "http_server").
pub fn underscored(s: &str) -> String {
    if s.contains('_') {
        return s
            .split('_')
            .filter(|p| !p.is_empty())
            .map(underscored)
            .collect::<Vec<_>>()
            .join("_");
    }

    let runes: Vec<char> = s.chars().collect();
    let up: Vec<bool> = runes.iter().map(|c| c.is_uppercase()).collect();
    let n = runes.len();

    let mut buf = String::with_capacity(n + 4);
    let mut pass = 0usize;
    let mut underscore_after_pass = false;

    for i in 0..n {
        let r = runes[i];
        if pass > 0 {
            pass -= 1;
            buf.extend(r.to_lowercase());
            if pass == 0 && underscore_after_pass {
                buf.push('_');
                underscore_after_pass = false;
            }
            continue;
        }

        buf.extend(r.to_lowercase());
        if upper_pattern(&up[i..], &[false, true]) {
            buf.push('_');
        }

        let mut j = i;
        while j < n && up[j] {
            j += 1;
        }
        let run: String = runes[i..j].iter().collect();
        if is_initialism(&run) {
            if j == n {
                pass = j - i;
            } else if runes[j] == 's' && j == n - 1 {
                pass = j - i + 1;
                continue;
            } else if runes[j] == '_' {
                pass = j - i;
                continue;
            } else if runes[j] == 's' && upper_pattern(&up[j + 1..], &[true]) {
                pass = j - i;
                underscore_after_pass = true;
                continue;
            } else if runes[j] == 's' && j + 1 < n && runes[j + 1] == '_' {
                pass = j - i;
                continue;
            }
        }

        if upper_pattern(&up[i..], &[true, true, false]) {
            buf.push('_');
        }
    }

    buf
}

/// Same as [`underscored`] with dashes (e.g., "HelloWorld" -> "hello-world").
pub fn struck(s: &str) -> String {
    underscored(s).replace('_', "-")
}

/// Camel case matching what protoc-gen-go produces: no initialism handling.
pub fn proto(s: &str) -> String {
    let result: String = s.split('_').map(title).collect();
    escape_reserved(&result)
}

/// Append `Escaped` to Go keywords so the result is a valid identifier.
pub fn escape_reserved(s: &str) -> String {
    if is_keyword(s) {
        format!("{s}Escaped")
    } else {
        s.to_string()
    }
}

fn public_part(part: &str) -> String {
    let upper = part.to_uppercase();
    if is_initialism(&upper) {
        return upper;
    }
    match upper.strip_suffix('S') {
        Some(stem) if part.ends_with('s') && is_initialism(stem) => format!("{stem}s"),
        _ => title(part),
    }
}

fn title(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

// "ID" -> "id", "HTTPServer" -> "httpServer", "Name" -> "name"
fn lower_leading(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let keep_last = run > 1 && run < chars.len() && chars[run].is_lowercase();
    let lowered = if keep_last { run - 1 } else { run };

    let mut out = String::with_capacity(s.len());
    for (i, c) in chars.iter().enumerate() {
        if i < lowered {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

fn upper_pattern(up: &[bool], pattern: &[bool]) -> bool {
    up.len() >= pattern.len() && up.iter().zip(pattern).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public() {
        assert_eq!(public("hello"), "Hello");
        assert_eq!(public("user_id"), "UserID");
        assert_eq!(public("api_urls"), "APIURLs");
        assert_eq!(public("http_server"), "HTTPServer");
        assert_eq!(public("alreadyCamel"), "AlreadyCamel");
        assert_eq!(public(""), "");
    }

    #[test]
    fn test_private() {
        assert_eq!(private("I"), "i");
        assert_eq!(private("ID"), "id");
        assert_eq!(private("idNum"), "idNum");
        assert_eq!(private("HTTPServer"), "httpServer");
        assert_eq!(private("user_id"), "userID");
        assert_eq!(private("Type"), "typeEscaped");
    }

    #[test]
    fn test_underscored() {
        assert_eq!(underscored("HelloWorld"), "hello_world");
        assert_eq!(underscored("UserID"), "user_id");
        assert_eq!(underscored("HTTPServer"), "http_server");
        assert_eq!(underscored("IDs"), "ids");
        assert_eq!(underscored("already_snake"), "already_snake");
        assert_eq!(underscored("Error"), "error");
    }

    #[test]
    fn test_struck() {
        assert_eq!(struck("HelloWorld"), "hello-world");
        assert_eq!(struck("UserID"), "user-id");
    }

    #[test]
    fn test_proto() {
        assert_eq!(proto("user_id"), "UserId");
        assert_eq!(proto("hello_world"), "HelloWorld");
    }

    #[test]
    fn test_escape_reserved() {
        assert_eq!(escape_reserved("func"), "funcEscaped");
        assert_eq!(escape_reserved("value"), "value");
    }
}
