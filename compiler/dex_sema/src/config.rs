//! Resolver configuration.

use std::path::PathBuf;

/// How uses of `deprecated` declarations are reported.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Deprecation {
    #[default]
    Warn,
    Error,
    Allow,
}

#[derive(Clone, Debug, Default)]
pub struct ResolverConfig {
    /// Directories searched by `import("file")`; empty disables string
    /// imports.
    pub string_import_paths: Vec<PathBuf>,
    pub deprecation: Deprecation,
}

impl ResolverConfig {
    #[must_use]
    pub fn with_string_import_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.string_import_paths.push(dir.into());
        self
    }

    #[must_use]
    pub fn with_deprecation(mut self, deprecation: Deprecation) -> Self {
        self.deprecation = deprecation;
        self
    }
}
