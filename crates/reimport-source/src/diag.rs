//! Interfaces to the two external collaborators: the static analyzer
//! and the symbol index provider.
//!
//! The engine only ever talks to these traits. `reimport-analyze` and
//! `reimport-index` ship the default implementations; tests substitute
//! small stubs.

use std::collections::HashMap;

/// Classification of a symbol-level problem reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A name is referenced but never defined or imported.
    UndefinedName,
    /// A name is listed in `__all__` but never defined or imported.
    UndefinedExport,
    /// An imported name is never used.
    UnusedImport,
}

/// A symbol-level problem in a source file.
///
/// `symbol` follows the pyflakes dotted-name convention:
/// `pkg.Object` for `from pkg import Object`, the full dotted module
/// path for `import a.b`, a bare name for `import a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub symbol: String,
}

impl Diagnostic {
    pub fn undefined_name(symbol: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UndefinedName,
            symbol: symbol.into(),
        }
    }

    pub fn undefined_export(symbol: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UndefinedExport,
            symbol: symbol.into(),
        }
    }

    pub fn unused_import(symbol: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UnusedImport,
            symbol: symbol.into(),
        }
    }
}

/// A static analyzer that reports symbol-level problems for complete
/// source text. Diagnostics are only meaningful after relocation, so
/// the engine calls this once the body holds no stray imports.
pub trait Analyzer {
    fn check(&self, source: &str) -> Vec<Diagnostic>;
}

/// A symbol index over installed libraries and the current project.
///
/// All lookups are best effort: a missing library or unreadable module
/// yields an empty result, never an error.
pub trait SymbolProvider {
    /// Whether `name` itself resolves to an importable module or
    /// package (not a member within one).
    fn module_is_installed(&self, name: &str) -> bool;

    /// Exported symbol name -> dotted path of the defining module, for
    /// every module of `library`, recursively. Empty on lookup failure.
    fn library_symbols(&self, library: &str) -> HashMap<String, String>;

    /// Top-level packages of the current project, excluding the test
    /// directory.
    fn project_packages(&self) -> Vec<String>;

    /// Make the project root importable for subsequent
    /// [`SymbolProvider::library_symbols`] calls. Idempotent; called
    /// before the project-package lookup tier.
    fn ensure_project_on_path(&self) {}
}
