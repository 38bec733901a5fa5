//! Import-statement repair engine for Python source files.
//!
//! The engine splits a file into four ordered sections (header, import
//! block, `if TYPE_CHECKING:` block, body), moves stray imports from
//! the body to the import block, inserts imports for undefined names,
//! deletes imports for unused ones, and reassembles the file. Every
//! line outside the import statements is preserved as-is; only the
//! blank-line separators between sections are normalized.
//!
//! Recognition is line-oriented shape matching (docstring delimiters,
//! parenthesis and semicolon balance, leading indent) rather than a
//! full grammar: correctness is only guaranteed for well-formed import
//! statements, and anything unrecognized passes through untouched.

mod prune;
mod relocate;
mod segment;

pub mod diag;
pub mod resolve;

pub use diag::{Analyzer, Diagnostic, DiagnosticKind, SymbolProvider};
pub use resolve::ResolveOptions;

use tracing::debug;

/// A Python source file split into its ordered sections.
///
/// Constructed once per fix, mutated in place, discarded after
/// producing output text. Concatenating the sections in order (with
/// the separator rule of [`SourceFile::join`]) reproduces a
/// semantically equivalent file; nothing is ever reordered within a
/// section except body-level imports being lifted out.
pub struct SourceFile {
    pub(crate) header: Vec<String>,
    pub(crate) imports: Vec<String>,
    pub(crate) typing: Vec<String>,
    pub(crate) code: Vec<String>,
    pub(crate) trailing_newline: bool,
    pub(crate) options: ResolveOptions,
}

impl SourceFile {
    /// Split `source` into header, import, typing and body sections.
    pub fn parse(source: &str, options: ResolveOptions) -> Self {
        segment::split(source, options)
    }

    /// Repair the import statements and return the rebuilt text.
    ///
    /// Three corrections are applied: body-level imports move to the
    /// top, undefined names gain an import when one can be resolved,
    /// and unused imports are deleted.
    pub fn fix(&mut self, analyzer: &dyn Analyzer, provider: &dyn SymbolProvider) -> String {
        self.move_imports_to_top();
        self.apply_diagnostics(analyzer, provider);
        self.join()
    }

    fn apply_diagnostics(&mut self, analyzer: &dyn Analyzer, provider: &dyn SymbolProvider) {
        let diagnostics = analyzer.check(&self.join());
        let mut seen: Vec<String> = Vec::new();

        for diagnostic in diagnostics {
            match diagnostic.kind {
                DiagnosticKind::UndefinedName | DiagnosticKind::UndefinedExport => {
                    // First occurrence wins; repeated reports of the
                    // same name are skipped whether or not it resolved.
                    if seen.contains(&diagnostic.symbol) {
                        continue;
                    }
                    if let Some(import) =
                        resolve::find_import(&diagnostic.symbol, &self.options, provider)
                    {
                        debug!(symbol = %diagnostic.symbol, %import, "adding import");
                        self.imports.push(import);
                    }
                    seen.push(diagnostic.symbol);
                }
                DiagnosticKind::UnusedImport => {
                    self.remove_unused(&diagnostic.symbol);
                }
            }
        }
    }

    /// Rejoin the sections into source text.
    ///
    /// Each non-empty section after the first is preceded by a fixed
    /// number of newlines (2 before imports and typing, 3 before the
    /// body), the whole result is trimmed, and the original
    /// trailing-newline flag is reapplied.
    pub fn join(&self) -> String {
        let mut source = String::new();

        for (section, newlines) in [
            (&self.header, 0),
            (&self.imports, 2),
            (&self.typing, 2),
            (&self.code, 3),
        ] {
            append_section(&mut source, section, newlines);
        }

        let mut source = source.trim().to_string();
        if self.trailing_newline {
            source.push('\n');
        }
        source
    }
}

fn append_section(source: &mut String, section: &[String], newlines: usize) {
    if section.is_empty() || (section.len() == 1 && section[0].is_empty()) {
        return;
    }
    for _ in 0..newlines {
        source.push('\n');
    }
    source.push_str(section.join("\n").trim());
}


#[cfg(test)]
mod tests {
    use super::testutil::{FixedAnalyzer, FixedProvider};
    use super::*;

    fn fix(source: &str) -> String {
        let analyzer = FixedAnalyzer(Vec::new());
        let provider = FixedProvider::default();
        SourceFile::parse(source, ResolveOptions::default()).fix(&analyzer, &provider)
    }

    #[test]
    fn empty_input_round_trips() {
        assert_eq!(fix(""), "");
    }

    #[test]
    fn join_separates_imports_from_code() {
        let source = "import os\nos.getcwd()\n";
        assert_eq!(fix(source), "import os\n\n\nos.getcwd()\n");
    }

    #[test]
    fn join_preserves_missing_trailing_newline() {
        assert_eq!(fix("import os\nos.getcwd()"), "import os\n\n\nos.getcwd()");
    }

    #[test]
    fn join_places_typing_block_between_imports_and_code() {
        let source = "\
from typing import TYPE_CHECKING

if TYPE_CHECKING:
    from pathlib import Path


def f(path: \"Path\") -> None:
    pass
";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn header_docstring_stays_first() {
        let source = "\"\"\"Module docstring.\"\"\"\n\nimport os\n\n\nos.getcwd()\n";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn undefined_name_gains_resolved_import() {
        let analyzer = FixedAnalyzer(vec![Diagnostic::undefined_name("Path")]);
        let provider = FixedProvider::default();
        let mut file = SourceFile::parse("foo = Path('x')\n", ResolveOptions::default());
        assert_eq!(
            file.fix(&analyzer, &provider),
            "from pathlib import Path\n\n\nfoo = Path('x')\n"
        );
    }

    #[test]
    fn repeated_undefined_name_is_added_once() {
        let analyzer = FixedAnalyzer(vec![
            Diagnostic::undefined_name("Path"),
            Diagnostic::undefined_name("Path"),
        ]);
        let provider = FixedProvider::default();
        let mut file = SourceFile::parse("foo = Path(Path('x'))\n", ResolveOptions::default());
        assert_eq!(
            file.fix(&analyzer, &provider),
            "from pathlib import Path\n\n\nfoo = Path(Path('x'))\n"
        );
    }

    #[test]
    fn unresolved_name_is_silently_skipped() {
        let analyzer = FixedAnalyzer(vec![Diagnostic::undefined_name("FrobnicateFactory")]);
        let provider = FixedProvider::default();
        let mut file = SourceFile::parse("f = FrobnicateFactory()\n", ResolveOptions::default());
        assert_eq!(file.fix(&analyzer, &provider), "f = FrobnicateFactory()\n");
    }
}
