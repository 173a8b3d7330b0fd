//! Unique identifier allocation.

use std::collections::HashSet;

use gogh_core::{GO_KEYWORDS, GO_PREDECLARED, public};

use crate::{Error, Result};

// Upper bound of numeric suffixes tried before giving up.
const MAX_SUFFIX: usize = 1 << 16;

/// Names allocated within one generation context.
///
/// Keywords and predeclared identifiers are reserved up front, so
/// `allocate("string", None)` never returns `string` itself.
///
/// # Example
///
/// ```
/// use gogh_codegen::UniqueNames;
///
/// let mut names = UniqueNames::new();
/// assert_eq!(names.allocate("name", None).unwrap(), "name");
/// assert_eq!(names.allocate("name", None).unwrap(), "name2");
/// assert_eq!(names.allocate("name", Some("alt")).unwrap(), "nameAlt");
/// ```
#[derive(Debug, Clone)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl Default for UniqueNames {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueNames {
    pub fn new() -> Self {
        let taken = GO_KEYWORDS
            .iter()
            .chain(GO_PREDECLARED)
            .map(|s| s.to_string())
            .collect();
        Self { taken }
    }

    /// Reserve and return a name derived from `base`.
    ///
    /// Tries `base`, then `base` + public(`hint`) when a hint is given,
    /// then `base2`, `base3`, ...
    pub fn allocate(&mut self, base: &str, hint: Option<&str>) -> Result<String> {
        if self.reserve(base) {
            return Ok(base.to_string());
        }

        if let Some(hint) = hint.filter(|h| !h.is_empty()) {
            let candidate = format!("{base}{}", public(hint));
            if self.reserve(&candidate) {
                return Ok(candidate);
            }
        }

        for i in 2..MAX_SUFFIX {
            let candidate = format!("{base}{i}");
            if self.reserve(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::UniqueNamesExhausted {
            base: base.to_string(),
        })
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Mark `name` as used. Returns false if it was used already.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.taken.contains(name) {
            return false;
        }
        self.taken.insert(name.to_string());
        true
    }
}
