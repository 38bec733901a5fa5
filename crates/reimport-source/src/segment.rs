//! Splitting source text into header, import, typing and body sections.

use crate::{ResolveOptions, SourceFile};
use regex::Regex;
use std::sync::LazyLock;

static SINGLE_LINE_DOCSTRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"{3}.*"{3}"#).unwrap());
static DOCSTRING_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"{3}.*"#).unwrap());
static DOCSTRING_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"{3} ?"#).unwrap());

/// An import statement, or its tail: `import x`, `from x import y`,
/// continuation text. Quotes after the keyword are excluded so strings
/// that merely mention "import" don't match.
static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(from .*)?import.[^'"]*$"#).unwrap());
static TRY_GUARD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(try|except.*):$").unwrap());
static TYPE_CHECKING_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^if TYPE_CHECKING:$").unwrap());

/// Where the header's docstring scan currently stands.
#[derive(PartialEq)]
enum DocstringState {
    None,
    Open,
    Closed,
}

pub(crate) fn split(source: &str, options: ResolveOptions) -> SourceFile {
    let lines: Vec<&str> = source.lines().collect();

    let header = extract_header(&lines);
    let imports = extract_imports(&lines, header.len());
    let typing = extract_typing(&lines, header.len() + imports.len());
    let code = lines[header.len() + imports.len() + typing.len()..]
        .iter()
        .map(|line| line.to_string())
        .collect();

    SourceFile {
        header,
        imports,
        typing,
        code,
        trailing_newline: source.ends_with('\n'),
        options,
    }
}

/// Leading comments and the module docstring.
///
/// A single-line docstring ends the header immediately (inclusive).
/// Comments and blank lines are always absorbed, even inside an open
/// docstring; the header ends at the first line that is none of those.
fn extract_header(lines: &[&str]) -> Vec<String> {
    let mut header = Vec::new();
    let mut state = DocstringState::None;

    for line in lines {
        if SINGLE_LINE_DOCSTRING.is_match(line) {
            header.push(line.to_string());
            break;
        }

        if state == DocstringState::Open && DOCSTRING_CLOSE.is_match(line) {
            state = DocstringState::Closed;
        } else if DOCSTRING_OPEN.is_match(line) {
            state = DocstringState::Open;
        } else if line.starts_with('#') || line.is_empty() {
            // Leading comments and blanks.
        } else if state != DocstringState::Open {
            break;
        }
        header.push(line.to_string());
    }

    header
}

/// The contiguous run of import statements following the header.
///
/// Accumulates import-shaped lines, blanks, continuation lines of an
/// open parenthesized import, and `try:`/`except …:` lines directly
/// guarding an import. Stops at `if TYPE_CHECKING:` or the first line
/// matching nothing above.
fn extract_imports(lines: &[&str], start: usize) -> Vec<String> {
    let mut imports = Vec::new();
    let mut multiline_import = false;
    let mut try_line: Option<String> = None;

    for line in &lines[start..] {
        if TYPE_CHECKING_OPENER.is_match(line) {
            break;
        }
        if TRY_GUARD.is_match(line) {
            try_line = Some(line.to_string());
        } else if IMPORT_LINE.is_match(line) || line.is_empty() || multiline_import {
            if line.contains('(') {
                multiline_import = true;
            } else if line.contains(')') {
                multiline_import = false;
            }

            if let Some(guard) = try_line.take() {
                imports.push(guard);
            }
            imports.push(line.to_string());
        } else {
            break;
        }
    }

    imports
}

/// The `if TYPE_CHECKING:` block, if one directly follows the imports:
/// the opener plus every indented or blank line after it.
fn extract_typing(lines: &[&str], start: usize) -> Vec<String> {
    let mut typing = Vec::new();

    if start < lines.len() && TYPE_CHECKING_OPENER.is_match(lines[start]) {
        typing.push(lines[start].to_string());
        for line in &lines[start + 1..] {
            if !line.starts_with(|c: char| c.is_whitespace()) && !line.is_empty() {
                break;
            }
            typing.push(line.to_string());
        }
    }

    typing
}
