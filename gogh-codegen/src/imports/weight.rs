use std::sync::Arc;

use super::PackageCache;

/// Assigns import paths to ordered groups of the import block.
pub trait Weighter: Send + Sync {
    /// Group of `path`; lower weights are rendered first.
    fn weight(&self, path: &str) -> u32;
}

/// `"C"` first, then the standard library, then everything else.
#[derive(Debug, Clone)]
pub struct GenericWeighter {
    cache: Arc<PackageCache>,
}

impl GenericWeighter {
    pub const PSEUDO: u32 = 0;
    pub const STDLIB: u32 = 1;
    pub const OTHER: u32 = 2;

    pub fn new(cache: Arc<PackageCache>) -> Self {
        Self { cache }
    }
}

impl Weighter for GenericWeighter {
    fn weight(&self, path: &str) -> u32 {
        if path == "C" {
            Self::PSEUDO
        } else if self.cache.is_stdlib(path) {
            Self::STDLIB
        } else {
            Self::OTHER
        }
    }
}
