//! String masking and identifier collection.
//!
//! The scan works on "masked" lines: string literals and comments are
//! blanked out (interpolated fragments of f-strings are kept, since
//! they reference real names) so that identifier shapes can be matched
//! without a grammar.

use crate::builtins::is_keyword;
use std::collections::HashSet;

/// Blank out comments and string literal contents, line by line.
/// Triple-quoted runs are tracked across lines.
pub(crate) fn mask_lines(source: &str) -> Vec<String> {
    let mut masked = Vec::new();
    let mut triple: Option<(char, bool)> = None; // (quote char, is f-string)
    let mut brace_depth = 0usize;

    for line in source.lines() {
        masked.push(mask_line(line, &mut triple, &mut brace_depth));
    }
    masked
}

fn is_triple(chars: &[char], at: usize, quote: char) -> bool {
    chars[at] == quote && chars.get(at + 1) == Some(&quote) && chars.get(at + 2) == Some(&quote)
}

fn mask_line(line: &str, triple: &mut Option<(char, bool)>, brace_depth: &mut usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        if let Some((quote, fstring)) = *triple {
            if is_triple(&chars, i, quote) {
                *triple = None;
                *brace_depth = 0;
                out.push_str("   ");
                i += 3;
            } else {
                mask_string_char(&chars, &mut i, &mut out, fstring, brace_depth);
            }
            continue;
        }

        let c = chars[i];
        if c == '#' {
            break;
        }
        if c == '"' || c == '\'' {
            let fstring = blank_string_prefix(&mut out);
            if is_triple(&chars, i, c) {
                out.push_str("   ");
                i += 3;
                // Closed on the same line?
                let mut j = i;
                let mut closed = false;
                while j < chars.len() {
                    if is_triple(&chars, j, c) {
                        closed = true;
                        break;
                    }
                    j += 1;
                }
                let mut depth = 0usize;
                if closed {
                    while i < j {
                        mask_string_char(&chars, &mut i, &mut out, fstring, &mut depth);
                    }
                    out.push_str("   ");
                    i = j + 3;
                } else {
                    *triple = Some((c, fstring));
                    while i < chars.len() {
                        mask_string_char(&chars, &mut i, &mut out, fstring, &mut depth);
                    }
                    *brace_depth = depth;
                }
            } else {
                // Single-quoted string, ends at the matching quote or
                // at end of line if unterminated.
                out.push(' ');
                i += 1;
                let mut depth = 0usize;
                while i < chars.len() && chars[i] != c {
                    mask_string_char(&chars, &mut i, &mut out, fstring, &mut depth);
                }
                if i < chars.len() {
                    out.push(' ');
                    i += 1;
                }
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Mask one character inside a string. For f-strings, characters
/// inside `{…}` are emitted so interpolated names still count as uses.
fn mask_string_char(
    chars: &[char],
    i: &mut usize,
    out: &mut String,
    fstring: bool,
    brace_depth: &mut usize,
) {
    let c = chars[*i];
    if c == '\\' {
        out.push_str(if *i + 1 < chars.len() { "  " } else { " " });
        *i += 2;
        return;
    }
    if fstring && c == '{' {
        *brace_depth += 1;
        out.push(' ');
    } else if fstring && c == '}' {
        *brace_depth = brace_depth.saturating_sub(1);
        out.push(' ');
    } else if fstring && *brace_depth > 0 {
        out.push(c);
    } else {
        out.push(' ');
    }
    *i += 1;
}

/// Blank a string-prefix identifier (`f`, `rb`, …) already emitted to
/// the masked output, returning whether it marks an f-string.
fn blank_string_prefix(out: &mut String) -> bool {
    let tail: String = out
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if tail.is_empty() || tail.len() > 2 || !tail.chars().all(|c| "rbfuRBFU".contains(c)) {
        return false;
    }
    let fstring = tail.to_ascii_lowercase().contains('f');
    let cut = out.len() - tail.len();
    out.truncate(cut);
    for _ in 0..tail.len() {
        out.push(' ');
    }
    fstring
}

/// Names a file defines and names it uses.
#[derive(Debug, Default)]
pub(crate) struct Names {
    pub defined: HashSet<String>,
    pub used: HashSet<String>,
}

impl Names {
    fn define(&mut self, word: &str) {
        self.defined.insert(word.to_string());
    }

    fn use_(&mut self, word: &str) {
        self.used.insert(word.to_string());
    }
}

/// What a `def`/`class` keyword is waiting for.
#[derive(PartialEq, Clone, Copy)]
enum Pending {
    None,
    Def,
    Class,
}

/// Classify every identifier of the masked, non-import lines as a
/// definition or a use.
pub(crate) fn collect_names(masked: &[String], is_import_line: &[bool]) -> Names {
    let mut names = Names::default();
    let mut depth: i32 = 0;
    // Bracket depth below which an open `def` signature ends.
    let mut signature: Option<i32> = None;

    for (index, line) in masked.iter().enumerate() {
        if is_import_line.get(index).copied().unwrap_or(false) {
            continue;
        }
        scan_line(line, &mut names, &mut depth, &mut signature);
    }

    names
}

fn scan_line(line: &str, names: &mut Names, depth: &mut i32, signature: &mut Option<i32>) {
    let chars: Vec<char> = line.chars().collect();
    let mut prev_word: Option<String> = None;
    let mut prev_char: Option<char> = None;
    let mut pending = Pending::None;
    let mut signature_armed = false;
    let mut for_target = false;
    let mut lambda_params = false;
    let mut annotation = false;
    let global_decl = {
        let head = line.trim_start();
        head.starts_with("global ") || head.starts_with("nonlocal ")
    };
    let top_assign = top_assign_position(&chars);

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let first_token = prev_word.is_none() && prev_char.is_none();
            let next = next_nonspace(&chars, i);

            if is_keyword(&word) {
                match word.as_str() {
                    "def" => pending = Pending::Def,
                    "class" => pending = Pending::Class,
                    "for" => for_target = true,
                    "in" => for_target = false,
                    "lambda" => lambda_params = true,
                    _ => {}
                }
            } else if prev_char == Some('.') {
                // Attribute access never counts the member name.
            } else if pending != Pending::None {
                names.define(&word);
                signature_armed = pending == Pending::Def;
                pending = Pending::None;
            } else if global_decl || for_target || prev_word.as_deref() == Some("as") {
                names.define(&word);
            } else if signature.is_some() {
                // Parameter names follow `(`, `,` or `*`; anything
                // after `:` or `=` is an annotation or default.
                if matches!(prev_char, None | Some('(') | Some(',') | Some('*')) {
                    names.define(&word);
                } else {
                    names.use_(&word);
                }
            } else if lambda_params {
                if prev_char == Some('=') {
                    names.use_(&word);
                } else {
                    names.define(&word);
                }
            } else if annotation {
                names.use_(&word);
            } else {
                match next {
                    // Assignment target, or a keyword argument when
                    // inside brackets (which is neither a definition
                    // nor a use). `==` comparisons fall through.
                    Some(('=', after)) if after != Some('=') => {
                        if *depth == 0 {
                            names.define(&word);
                        }
                    }
                    // Walrus target.
                    Some((':', Some('='))) => names.define(&word),
                    // Annotated assignment header: `x: int = 1`.
                    Some((':', _)) if first_token && *depth == 0 => {
                        names.define(&word);
                        annotation = true;
                    }
                    // Tuple-unpacking target: a name before the
                    // statement's top-level `=`, as in `a, b = pair`.
                    Some((',', _))
                        if *depth == 0 && top_assign.is_some_and(|pos| start < pos) =>
                    {
                        names.define(&word)
                    }
                    // Augmented assignment target: `total += delta`.
                    Some((op, Some('=')))
                        if *depth == 0 && matches!(op, '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '@') =>
                    {
                        names.define(&word)
                    }
                    _ => names.use_(&word),
                }
            }

            prev_char = Some(chars[i - 1]);
            prev_word = Some(word);
            continue;
        }

        match c {
            '(' | '[' | '{' => {
                if c == '(' && signature_armed {
                    *signature = Some(*depth);
                    signature_armed = false;
                }
                *depth += 1;
            }
            ')' | ']' | '}' => {
                *depth -= 1;
                if signature.is_some_and(|base| *depth <= base) {
                    *signature = None;
                }
            }
            ':' => lambda_params = false,
            '=' => annotation = false,
            _ => {}
        }
        if !c.is_whitespace() {
            prev_char = Some(c);
        }
        i += 1;
    }
}

/// Position of the line's top-level assignment `=`: outside brackets
/// and not part of `==`, `!=`, `<=`, `>=` or `:=`. Augmented operators
/// (`+=` and friends) count.
fn top_assign_position(chars: &[char]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '=' if depth == 0 => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                if chars.get(i + 1) != Some(&'=')
                    && !matches!(prev, Some('=' | '!' | '<' | '>' | ':'))
                {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn next_nonspace(chars: &[char], from: usize) -> Option<(char, Option<char>)> {
    let mut i = from;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if i < chars.len() {
        Some((chars[i], chars.get(i + 1).copied()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str) -> Names {
        let masked = mask_lines(source);
        let flags = vec![false; masked.len()];
        collect_names(&masked, &flags)
    }

    #[test]
    fn masks_comments_and_strings() {
        let masked = mask_lines("x = 'import os'  # import sys\n");
        assert_eq!(masked[0].trim_end(), "x =");
        assert_eq!(masked[0].len(), "x = 'import os'  ".len());
    }

    #[test]
    fn masks_triple_quoted_runs_across_lines() {
        let masked = mask_lines("s = '''\nimport os\n'''\ny = 1\n");
        assert_eq!(masked[1].trim(), "");
        assert_eq!(masked[3], "y = 1");
    }

    #[test]
    fn keeps_fstring_interpolations() {
        let collected = names("m = f\"path: {path}\"\n");
        assert!(collected.used.contains("path"));
        assert!(collected.defined.contains("m"));
    }

    #[test]
    fn assignment_targets_are_defined_uses_are_used() {
        let collected = names("foo = Path('x')\n");
        assert!(collected.defined.contains("foo"));
        assert!(collected.used.contains("Path"));
        assert!(!collected.used.contains("foo"));
    }

    #[test]
    fn attributes_are_not_uses() {
        let collected = names("os.getcwd()\n");
        assert!(collected.used.contains("os"));
        assert!(!collected.used.contains("getcwd"));
    }

    #[test]
    fn def_name_and_params_are_defined_annotations_are_used() {
        let collected =
            names("def handler(request: Request, *, timeout=DEFAULT) -> Response:\n    pass\n");
        for defined in ["handler", "request", "timeout"] {
            assert!(collected.defined.contains(defined), "{defined} not defined");
        }
        for used in ["Request", "Response", "DEFAULT"] {
            assert!(collected.used.contains(used), "{used} not used");
        }
    }

    #[test]
    fn call_parens_are_not_a_signature() {
        let collected = names("handler = make()\nhandler(payload)\n");
        assert!(collected.used.contains("payload"));
        assert!(!collected.defined.contains("payload"));
    }

    #[test]
    fn keyword_arguments_are_not_uses() {
        let collected = names("run(timeout=5)\n");
        assert!(collected.used.contains("run"));
        assert!(!collected.used.contains("timeout"));
        assert!(!collected.defined.contains("timeout"));
    }

    #[test]
    fn tuple_unpacking_targets_are_defined() {
        let collected = names("config, other = load()\nprint(config, other)\n");
        assert!(collected.defined.contains("config"));
        assert!(collected.defined.contains("other"));
        assert!(collected.used.contains("load"));
    }

    #[test]
    fn subscripted_unpacking_target_is_a_use() {
        let collected = names("cache[key], rest = parts\n");
        assert!(collected.used.contains("cache"));
        assert!(collected.defined.contains("rest"));
        assert!(!collected.defined.contains("cache"));
    }

    #[test]
    fn augmented_assignment_target_is_defined() {
        let collected = names("total += delta\n");
        assert!(collected.defined.contains("total"));
        assert!(collected.used.contains("delta"));
    }

    #[test]
    fn for_and_with_targets_are_defined() {
        let collected = names("for item in items:\n    with open(item) as handle:\n        pass\n");
        assert!(collected.defined.contains("item"));
        assert!(collected.defined.contains("handle"));
        assert!(collected.used.contains("items"));
    }

    #[test]
    fn annotated_assignment_target_is_defined() {
        let collected = names("count: int = 0\n");
        assert!(collected.defined.contains("count"));
        assert!(collected.used.contains("int"));
    }

    #[test]
    fn walrus_target_is_defined() {
        let collected = names("while chunk := read():\n    pass\n");
        assert!(collected.defined.contains("chunk"));
        assert!(collected.used.contains("read"));
    }

    #[test]
    fn lambda_params_are_defined() {
        let collected = names("key = lambda pair: pair[1]\n");
        assert!(collected.defined.contains("pair"));
    }

    #[test]
    fn multiline_signature_params_are_defined() {
        let collected = names("def f(\n    first,\n    second: Wide = DEFAULT,\n) -> None:\n    pass\n");
        assert!(collected.defined.contains("first"));
        assert!(collected.defined.contains("second"));
        assert!(collected.used.contains("Wide"));
        assert!(collected.used.contains("DEFAULT"));
    }
}
