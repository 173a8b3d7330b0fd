//! Heuristic ordering of import paths.
//!
//! Paths are compared the way a human would sort versioned names: a prefix
//! goes first, digit runs compare numerically and roman numerals compare by
//! value.

use std::cmp::Ordering;

/// Whether import path `a` goes before `b`.
///
/// ```
/// use gogh_codegen::imports::heuristic_less;
///
/// assert!(heuristic_less("github.com/sirkon/gogh", "github.com/sirkon/gogh/v2"));
/// assert!(heuristic_less("dos_v1.1.1/pkg", "dos_v1.1.2/pkg"));
/// assert!(heuristic_less("lewisIX", "lewisXIV"));
/// ```
pub fn heuristic_less(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    if b.starts_with(a) {
        return true;
    }
    if a.starts_with(b) {
        return false;
    }

    let common = common_prefix_len(a, b);
    let (ra, rb) = (&a[common..], &b[common..]);

    let digit_a = ra.starts_with(|c: char| c.is_ascii_digit());
    let digit_b = rb.starts_with(|c: char| c.is_ascii_digit());
    match (digit_a, digit_b) {
        (false, true) => true,
        (true, false) => false,
        (true, true) => match compare_numbers(leading_digits(ra), leading_digits(rb)) {
            Ordering::Equal => ra < rb,
            ord => ord == Ordering::Less,
        },
        (false, false) => match (roman_value(ra), roman_value(rb)) {
            (Some(x), Some(y)) if x != y => x < y,
            _ => ra < rb,
        },
    }
}

/// Stable sort driven by [`heuristic_less`].
///
/// Insertion sort only relies on pairwise answers, so it stays well defined
/// even where the heuristic is not a strict total order.
pub fn sort_paths<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && heuristic_less(key(&items[j]), key(&items[j - 1])) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i)
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

// Numeric comparison of digit strings of any length.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Value of a canonical upper-case roman numeral.
pub fn roman_value(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }

    let mut total = 0u32;
    let mut prev = 0u32;
    for c in s.chars().rev() {
        let v = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if v < prev {
            total = total.checked_sub(v)?;
        } else {
            total += v;
            prev = v;
        }
    }

    (total > 0 && to_roman(total) == s).then_some(total)
}

fn to_roman(mut n: u32) -> String {
    const TABLE: &[(u32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for &(value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irreflexive() {
        for path in ["fmt", "github.com/sirkon/gogh", "lewisIX", ""] {
            assert!(!heuristic_less(path, path));
        }
    }

    #[test]
    fn test_prefix_goes_first() {
        assert!(heuristic_less("github.com/sirkon/gogh", "github.com/sirkon/gogh/v2"));
        assert!(!heuristic_less("github.com/sirkon/gogh/v2", "github.com/sirkon/gogh"));
    }

    #[test]
    fn test_numeric_runs() {
        assert!(heuristic_less("dos_v1.1.1/pkg", "dos_v1.1.2/pkg"));
        assert!(heuristic_less("v1.9", "v1.10"));
        assert!(!heuristic_less("v1.10", "v1.9"));
    }

    #[test]
    fn test_non_digit_before_digit() {
        assert!(heuristic_less("dos/pkg", "dos1.1.1/pkg"));
        assert!(!heuristic_less("dos1.1.1/pkg", "dos/pkg"));
    }

    #[test]
    fn test_roman_numerals() {
        assert!(heuristic_less("lewisIX", "lewisXIV"));
        assert!(!heuristic_less("lewisXIV", "lewisIX"));
        assert!(heuristic_less("lewisx", "lewisy"));
    }

    #[test]
    fn test_roman_value() {
        assert_eq!(roman_value("IX"), Some(9));
        assert_eq!(roman_value("XIV"), Some(14));
        assert_eq!(roman_value("MCMXCIV"), Some(1994));
        assert_eq!(roman_value("IIII"), None);
        assert_eq!(roman_value("x"), None);
        assert_eq!(roman_value(""), None);
    }

    #[test]
    fn test_sort_paths() {
        let mut paths = vec![
            "github.com/sirkon/gosrcfmt",
            "github.com/sirkon/go-format/v2",
            "github.com/sirkon/go-format",
        ];
        sort_paths(&mut paths, |p| p);

        assert_eq!(
            paths,
            vec![
                "github.com/sirkon/go-format",
                "github.com/sirkon/go-format/v2",
                "github.com/sirkon/gosrcfmt",
            ]
        );
    }
}
