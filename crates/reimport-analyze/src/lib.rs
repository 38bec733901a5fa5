//! Line-oriented import diagnostics for Python source files.
//!
//! A deliberately small stand-in for a full static analyzer: it masks
//! strings and comments, parses import bindings, classifies every
//! other identifier as a definition or a use, and reports three kinds
//! of problems: unused imports, undefined names, and `__all__` entries
//! that name nothing. Anything the line shapes don't recognize
//! produces no diagnostic at all.

mod builtins;
mod scan;

use builtins::is_builtin;
use regex::Regex;
use reimport_source::{Analyzer, Diagnostic};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static FROM_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*from\s+([\w.]+)\s+import\s+(.+)$").unwrap());
static IMPORT_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+(.+)$").unwrap());
static FROM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\*|\w+)(?:\s+as\s+(\w+))?").unwrap());
static MODULE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([\w.]+)(?:\s+as\s+(\w+))?").unwrap());
static STRING_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap());

/// The analyzer shipped with reimport.
#[derive(Debug, Default)]
pub struct LineAnalyzer;

impl LineAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for LineAnalyzer {
    fn check(&self, source: &str) -> Vec<Diagnostic> {
        analyze(source)
    }
}

/// A name an import statement brings into scope.
#[derive(Debug)]
struct Binding {
    /// The in-scope name (the alias, if any).
    name: String,
    /// The dotted name diagnostics report: `pkg.Object` for
    /// `from pkg import Object`, the module path for `import a.b`.
    reported: String,
}

/// Report unused imports, undefined names and undefined `__all__`
/// exports for `source`.
pub fn analyze(source: &str) -> Vec<Diagnostic> {
    let masked = scan::mask_lines(source);
    let (bindings, is_import_line) = parse_imports(&masked);
    let names = scan::collect_names(&masked, &is_import_line);
    let exports = parse_exports(source);

    let mut used = names.used;
    used.extend(exports.iter().cloned());

    let binding_names: HashSet<&str> = bindings.iter().map(|b| b.name.as_str()).collect();
    let mut diagnostics = Vec::new();

    for binding in &bindings {
        if !used.contains(&binding.name) && !names.defined.contains(&binding.name) {
            diagnostics.push(Diagnostic::unused_import(binding.reported.clone()));
        }
    }

    let mut undefined: Vec<&String> = used
        .iter()
        .filter(|name| {
            !names.defined.contains(*name)
                && !binding_names.contains(name.as_str())
                && !is_builtin(name)
                && !name.starts_with("__")
                && !matches!(name.as_str(), "self" | "cls" | "_")
                && !exports.contains(*name)
        })
        .collect();
    undefined.sort();
    for name in undefined {
        diagnostics.push(Diagnostic::undefined_name(name.clone()));
    }

    let mut missing_exports: Vec<&String> = exports
        .iter()
        .filter(|name| !names.defined.contains(*name) && !binding_names.contains(name.as_str()))
        .collect();
    missing_exports.sort();
    missing_exports.dedup();
    for name in missing_exports {
        diagnostics.push(Diagnostic::undefined_export(name.clone()));
    }

    debug!(count = diagnostics.len(), "analysis finished");
    diagnostics
}

/// Extract import bindings from the masked lines and flag every line
/// belonging to an import statement (so the identifier scan skips
/// them).
fn parse_imports(masked: &[String]) -> (Vec<Binding>, Vec<bool>) {
    let mut bindings = Vec::new();
    let mut is_import_line = vec![false; masked.len()];

    let mut i = 0;
    while i < masked.len() {
        let line = &masked[i];

        if let Some(caps) = FROM_STMT.captures(line) {
            is_import_line[i] = true;
            let package = caps[1].to_string();
            let mut names_text = caps[2].to_string();

            // Parenthesized multi-line list: absorb continuation lines
            // up to the closer.
            if names_text.contains('(') && !names_text.contains(')') {
                while i + 1 < masked.len() {
                    i += 1;
                    is_import_line[i] = true;
                    names_text.push(',');
                    names_text.push_str(&masked[i]);
                    if masked[i].contains(')') {
                        break;
                    }
                }
            }
            let names_text = names_text.replace(['(', ')'], " ");

            // `__future__` imports are declarations, not bindings.
            if package != "__future__" {
                for part in names_text.split(',') {
                    if let Some(caps) = FROM_NAME.captures(part) {
                        let name = &caps[1];
                        if name == "*" {
                            continue;
                        }
                        let alias = caps.get(2).map(|m| m.as_str()).unwrap_or(name);
                        bindings.push(Binding {
                            name: alias.to_string(),
                            reported: format!("{package}.{name}"),
                        });
                    }
                }
            }
        } else if let Some(caps) = IMPORT_STMT.captures(line) {
            is_import_line[i] = true;
            for part in caps[1].split(',') {
                if let Some(caps) = MODULE_NAME.captures(part) {
                    let module = caps[1].to_string();
                    let alias = caps
                        .get(2)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_else(|| {
                            module.split('.').next().unwrap_or(&module).to_string()
                        });
                    bindings.push(Binding {
                        name: alias,
                        reported: module,
                    });
                }
            }
        }

        i += 1;
    }

    (bindings, is_import_line)
}

/// Names listed in a module-level `__all__` literal.
fn parse_exports(source: &str) -> Vec<String> {
    let Some(position) = source.find("__all__") else {
        return Vec::new();
    };
    let tail = &source[position..];

    // Collect quoted names until the bracket that opened the literal
    // closes; anything fancier than a literal list is ignored.
    let mut names = Vec::new();
    let mut depth = 0i32;
    let mut span_end = 0;
    for (offset, c) in tail.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth -= 1;
                if depth <= 0 {
                    span_end = offset;
                    break;
                }
            }
            _ => {}
        }
    }
    if span_end == 0 {
        return Vec::new();
    }
    for caps in STRING_ITEM.captures_iter(&tail[..span_end]) {
        let name = caps.get(1).or_else(|| caps.get(2));
        if let Some(name) = name {
            names.push(name.as_str().to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use reimport_source::DiagnosticKind;

    fn kinds(source: &str, kind: DiagnosticKind) -> Vec<String> {
        analyze(source)
            .into_iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.symbol)
            .collect()
    }

    #[test]
    fn reports_unused_plain_import() {
        let diagnostics = kinds("import os\nimport sys\nos.getcwd()\n", DiagnosticKind::UnusedImport);
        assert_eq!(diagnostics, ["sys"]);
    }

    #[test]
    fn reports_unused_from_import_with_dotted_name() {
        let diagnostics = kinds(
            "from typing import List, Dict\nx: List = []\n",
            DiagnosticKind::UnusedImport,
        );
        assert_eq!(diagnostics, ["typing.Dict"]);
    }

    #[test]
    fn reports_unused_aliased_import_under_module_name() {
        let diagnostics = kinds("import numpy as np\n", DiagnosticKind::UnusedImport);
        assert_eq!(diagnostics, ["numpy"]);
    }

    #[test]
    fn aliased_import_is_used_via_alias() {
        let diagnostics = kinds(
            "import numpy as np\nnp.zeros(3)\n",
            DiagnosticKind::UnusedImport,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn multiline_import_names_are_tracked() {
        let source = "from typing import (\n    List,\n    Dict,\n)\nx: List = []\n";
        let diagnostics = kinds(source, DiagnosticKind::UnusedImport);
        assert_eq!(diagnostics, ["typing.Dict"]);
    }

    #[test]
    fn future_imports_are_never_unused() {
        let diagnostics = kinds(
            "from __future__ import annotations\nx = 1\n",
            DiagnosticKind::UnusedImport,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn reports_undefined_name() {
        let diagnostics = kinds("foo = Path('x')\n", DiagnosticKind::UndefinedName);
        assert_eq!(diagnostics, ["Path"]);
    }

    #[test]
    fn unpacking_targets_are_not_undefined() {
        let diagnostics = kinds(
            "config, other = load()\nprint(config, other)\n",
            DiagnosticKind::UndefinedName,
        );
        assert_eq!(diagnostics, ["load"]);
    }

    #[test]
    fn builtins_are_never_undefined() {
        let diagnostics = kinds("print(len('x'))\n", DiagnosticKind::UndefinedName);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn imported_names_are_not_undefined() {
        let diagnostics = kinds(
            "from pathlib import Path\nfoo = Path('x')\n",
            DiagnosticKind::UndefinedName,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn names_used_in_strings_are_not_uses() {
        let diagnostics = kinds("x = 'Path'\n", DiagnosticKind::UndefinedName);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn all_export_counts_as_use() {
        let diagnostics = kinds(
            "from pkg import handler\n__all__ = [\"handler\"]\n",
            DiagnosticKind::UnusedImport,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_all_export_is_reported() {
        let diagnostics = kinds(
            "__all__ = [\"missing\"]\nx = 1\n",
            DiagnosticKind::UndefinedExport,
        );
        assert_eq!(diagnostics, ["missing"]);
    }

    #[test]
    fn self_and_dunders_are_ignored() {
        let source = "class A:\n    def f(self):\n        return self.x, __name__\n";
        let diagnostics = kinds(source, DiagnosticKind::UndefinedName);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn try_guarded_imports_bind_both_arms() {
        let source = "try:\n    import ujson as json\nexcept ImportError:\n    import json\njson.dumps({})\n";
        let diagnostics = kinds(source, DiagnosticKind::UnusedImport);
        assert!(diagnostics.is_empty());
    }
}
