//! Module name classification
//!
//! Every module id is either public (registry-governed, e.g. `auth`) or
//! private (project-owned, e.g. `@private/my-app`). The two naming patterns
//! are mutually exclusive; a string matching neither is not a valid id.

use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved namespace prefix for private modules
pub const PRIVATE_NAMESPACE: &str = "@private";

static DEFAULT_PUBLIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid pattern"));

static DEFAULT_PRIVATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@private/[a-z0-9]+(-[a-z0-9]+)*$").expect("valid pattern"));

/// The kind of a module id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Registry-governed module, installed into the shared cache
    Public,

    /// Project-owned module under the reserved private namespace
    Private,
}

/// Naming patterns used to classify module ids
///
/// Constructed once at startup and passed into the components that need it.
#[derive(Debug, Clone)]
pub struct ModulePatterns {
    public: Regex,
    private: Regex,
}

impl ModulePatterns {
    /// Create patterns from caller-supplied regexes
    pub fn new(public: Regex, private: Regex) -> Self {
        Self { public, private }
    }

    /// Classify a module id; `None` means the id is not syntactically valid
    pub fn classify(&self, id: &str) -> Option<ModuleKind> {
        // Check the private namespace first; the patterns are disjoint, so
        // the order only matters for ids matching neither.
        if self.private.is_match(id) {
            Some(ModuleKind::Private)
        } else if self.public.is_match(id) {
            Some(ModuleKind::Public)
        } else {
            None
        }
    }

    pub fn is_private(&self, id: &str) -> bool {
        self.classify(id) == Some(ModuleKind::Private)
    }

    pub fn is_public(&self, id: &str) -> bool {
        self.classify(id) == Some(ModuleKind::Public)
    }
}

impl Default for ModulePatterns {
    fn default() -> Self {
        Self {
            public: DEFAULT_PUBLIC.clone(),
            private: DEFAULT_PRIVATE.clone(),
        }
    }
}
