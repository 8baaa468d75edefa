//! Stub generation configuration
//!
//! This module provides the options that change the shape of emitted stub text or the
//! way a run is scheduled. Everything else (the preamble, member order, naming rules) is
//! fixed so that the same metadata always yields the same text.

/// Configuration for one stub generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StubConfig {
    /// Number of spaces per indentation level (default: 4)
    pub indent: usize,

    /// Emit `from <namespace> import <Name>` lines for types referenced from other namespaces
    /// Not needed for the stubs to be readable, but lets type checkers follow references
    pub emit_imports: bool,

    /// Keep members and constructors marked `[Obsolete]` instead of dropping them
    pub include_obsolete: bool,

    /// Render namespaces on the rayon thread pool
    /// Output is identical either way; only scheduling changes
    pub parallel: bool,

    /// Emit a unit for the package root that lists the top-level namespaces
    pub emit_root_unit: bool,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            emit_imports: false,
            include_obsolete: false,
            parallel: true,
            emit_root_unit: true,
        }
    }
}

impl StubConfig {
    /// Creates a configuration that also emits cross-namespace imports
    #[must_use]
    pub fn complete() -> Self {
        Self {
            emit_imports: true,
            ..Self::default()
        }
    }

    /// Creates a configuration that renders namespaces one after another on the caller's thread
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// One indentation level as a string
    #[must_use]
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent)
    }
}
