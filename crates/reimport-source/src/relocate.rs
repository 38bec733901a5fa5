//! Lifting import statements out of the body and into the import block.

use crate::SourceFile;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// An import statement at any indent, with no quote after the keyword.
static IMPORT_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:from .*)?import .[^'"]*$"#).unwrap());

static FMT_SKIP_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"# ?fmt:.*?skip").unwrap());
static NOQA_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"# ?noqa:.*?reimport").unwrap());

/// Whether a line carries one of the two markers that exempt it from
/// relocation and pruning.
pub(crate) fn should_ignore_line(line: &str) -> bool {
    FMT_SKIP_MARKER.is_match(line) || NOQA_MARKER.is_match(line)
}

/// Whether this line opens or closes a triple-quoted string run.
/// Single-line strings (a matched pair of delimiters) don't toggle.
fn toggles_multiline_string(line: &str) -> bool {
    for delimiter in ["\"\"\"", "'''"] {
        if line.matches(delimiter).count() % 2 == 1 {
            return true;
        }
    }
    false
}

/// Split a `import os; os.getcwd()` line at the statement separator,
/// re-indenting the remainder to the original leading whitespace.
fn split_separation_line(line: &str) -> (String, String) {
    let (first, rest) = line.split_once(';').unwrap_or((line, ""));
    let indent = &first[..first.len() - first.trim_start().len()];
    (first.to_string(), format!("{}{}", indent, rest.trim_start()))
}

impl SourceFile {
    /// Move every import statement found in the body into the import
    /// block, in encounter order, leaving all other body lines in
    /// their original relative order.
    pub(crate) fn move_imports_to_top(&mut self) {
        let mut multiline_import = false;
        let mut multiline_string = false;
        let mut kept: Vec<String> = Vec::with_capacity(self.code.len());
        let mut lifted: Vec<String> = Vec::new();

        for line in &self.code {
            // A line that opens a triple-quoted run without closing it
            // flips the toggle; while inside, nothing is an import no
            // matter how import-shaped the string contents look.
            if toggles_multiline_string(line) {
                multiline_string = !multiline_string;
                kept.push(line.clone());
                continue;
            }

            let looks_like_import = !line.contains('=')
                && !multiline_string
                && IMPORT_CANDIDATE.is_match(line);

            if !looks_like_import && !multiline_import {
                kept.push(line.clone());
                continue;
            }

            if should_ignore_line(line) {
                kept.push(line.clone());
                continue;
            }

            // `import os; os.getcwd()`: lift the import half, keep the
            // remainder in place at the original indent.
            if line.contains(';') {
                let (import_part, remainder) = split_separation_line(line);
                lifted.push(import_part.trim().to_string());
                kept.push(remainder);
                continue;
            }

            if line.contains('(') {
                multiline_import = true;
            } else if line.contains(')') {
                multiline_import = false;
            }

            // Continuation lines keep their indentation; complete
            // statements are stored stripped.
            if multiline_import {
                lifted.push(line.clone());
            } else {
                lifted.push(line.trim().to_string());
            }
        }

        if !lifted.is_empty() {
            debug!(count = lifted.len(), "relocated body imports");
        }
        self.code = kept;
        self.imports.extend(lifted);
    }
}
