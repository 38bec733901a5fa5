//! Deleting the declaration of an unused symbol from the import block.

use crate::SourceFile;
use crate::relocate::should_ignore_line;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FROM_IMPORT_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*from .* import").unwrap());

impl SourceFile {
    /// Delete exactly the reference to `import_name` (a dotted name
    /// such as `typing.List`) from the import block, preserving every
    /// other symbol and line. A name whose declaring line can't be
    /// matched is silently left alone.
    pub(crate) fn remove_unused(&mut self, import_name: &str) {
        let mut segments: Vec<&str> = import_name.split('.').collect();
        let object = segments.pop().unwrap_or(import_name);
        let package = segments.join(".");

        let esc_package = regex::escape(&package);
        let esc_object = regex::escape(object);

        // The only symbol on the line, possibly aliased or commented.
        let whole_line = Regex::new(&format!(
            r"^(from {esc_package} )?import ({esc_package}\.)?{esc_object}( *as \w+)?( *#.*)?$"
        ))
        .unwrap();
        // One of several symbols on a single line.
        let shared_line =
            Regex::new(&format!(r"^from {esc_package} import .*?{esc_object}")).unwrap();
        let shared_parts = Regex::new(&format!(
            r"^(?P<from>from {esc_package} import) (?P<imports>[^#]*)(?P<comment>#.*)?"
        ))
        .unwrap();
        // Opener of a parenthesized multi-line symbol list.
        let multiline_opener =
            Regex::new(&format!(r"^from {esc_package} import .*?\($")).unwrap();
        let continuation = Regex::new(&format!(r"^\s*{esc_object},?")).unwrap();

        for index in 0..self.imports.len() {
            let line = self.imports[index].clone();
            if should_ignore_line(&line) {
                continue;
            }

            if whole_line.is_match(&line) {
                debug!(symbol = import_name, "removing import line");
                self.imports.remove(index);
                return;
            }

            if shared_line.is_match(&line)
                && let Some(parts) = shared_parts.captures(&line)
            {
                let mut names: Vec<&str> = parts["imports"]
                    .split(", ")
                    .map(str::trim)
                    .collect();
                // The detection regex also fires on prefixes of longer
                // names (`List` in `ListView`); only edit the line when
                // the parsed list really contains the symbol.
                let Some(position) = names.iter().position(|name| *name == object) else {
                    continue;
                };
                names.remove(position);

                let mut rebuilt = names.join(", ");
                if let Some(comment) = parts.name("comment") {
                    rebuilt.push_str("  ");
                    rebuilt.push_str(comment.as_str());
                }
                debug!(symbol = import_name, "removing symbol from shared line");
                self.imports[index] = format!("{} {}", &parts["from"], rebuilt);
                return;
            }

            if multiline_opener.is_match(&line) {
                // Walk the continuation lines for the one naming the
                // symbol and drop it.
                let mut cursor = index;
                while cursor + 1 < self.imports.len() {
                    cursor += 1;
                    if continuation.is_match(&self.imports[cursor]) {
                        debug!(symbol = import_name, "removing symbol from multi-line list");
                        self.imports.remove(cursor);
                        break;
                    }
                }

                // Collapse the whole statement when the list emptied:
                // opener directly followed by the lone closer.
                if cursor > 0
                    && cursor < self.imports.len()
                    && FROM_IMPORT_OPENER.is_match(&self.imports[cursor - 1])
                    && self.imports[cursor] == ")"
                {
                    self.imports.remove(cursor);
                    self.imports.remove(cursor - 1);
                }
                return;
            }
        }
    }
}
