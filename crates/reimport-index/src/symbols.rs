//! Extracting importable names from a package tree on disk.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::trace;
use walkdir::WalkDir;

static DEF_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:async\s+)?def\s+(\w+)|^class\s+(\w+)").unwrap());
static ASSIGN_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)\s*(:|=)").unwrap());
static REEXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from\s+[\w.]+\s+import\s+(.+)$").unwrap());
static REEXPORT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\w+)(?:\s+as\s+(\w+))?").unwrap());

/// Walk the module or package at `path` and map every public top-level
/// name to the dotted module it should be imported from. The first
/// definition of a name wins.
pub(crate) fn extract(path: &Path, base: &str) -> HashMap<String, String> {
    let mut symbols = HashMap::new();

    if path.is_file() {
        scan_file(path, base, &mut symbols);
        return symbols;
    }

    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !should_skip(entry.file_name().to_string_lossy().as_ref()));
    for entry in walker.flatten() {
        if !entry.file_type().is_file() || entry.path().extension().is_none_or(|e| e != "py") {
            continue;
        }
        let Some(module) = module_path(path, entry.path(), base) else {
            continue;
        };
        scan_file(entry.path(), &module, &mut symbols);
    }

    trace!(base, count = symbols.len(), "indexed package");
    symbols
}

/// Directory and file names the walk never descends into: private
/// modules, caches and packaging metadata. `__init__.py` stays, it
/// carries the package's re-exports.
fn should_skip(name: &str) -> bool {
    if name == "__init__.py" {
        return false;
    }
    name.starts_with('_')
        || name == "__pycache__"
        || name.ends_with(".dist-info")
        || name.ends_with(".egg-info")
}

/// Dotted module path of `file` relative to the package root `root`
/// named `base`. `__init__.py` maps to its directory's path.
fn module_path(root: &Path, file: &Path, base: &str) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts = vec![base.to_string()];
    for component in relative.components() {
        let name = component.as_os_str().to_string_lossy();
        if name == "__init__.py" {
            break;
        }
        parts.push(name.trim_end_matches(".py").to_string());
    }
    Some(parts.join("."))
}

/// Record the public top-level names a single module file defines.
fn scan_file(path: &Path, module: &str, symbols: &mut HashMap<String, String>) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    for line in content.lines() {
        let name = if let Some(caps) = DEF_NAME.captures(line) {
            caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
        } else if let Some(caps) = ASSIGN_NAME.captures(line) {
            Some(caps.get(1).unwrap().as_str())
        } else {
            if let Some(caps) = REEXPORT.captures(line) {
                for part in caps[1].split(',') {
                    if let Some(caps) = REEXPORT_NAME.captures(part) {
                        let name = caps.get(2).or_else(|| caps.get(1)).unwrap().as_str();
                        record(symbols, name, module);
                    }
                }
            }
            None
        };
        if let Some(name) = name {
            record(symbols, name, module);
        }
    }
}

fn record(symbols: &mut HashMap<String, String>, name: &str, module: &str) {
    if name.starts_with('_') || symbols.contains_key(name) {
        return;
    }
    symbols.insert(name.to_string(), module.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn single_module_file_maps_names_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("things.py");
        fs::write(&module, "class Widget:\n    pass\n\ndef make():\n    pass\nLIMIT = 3\n_hidden = 1\n").unwrap();

        let symbols = extract(&module, "things");
        assert_eq!(symbols.get("Widget"), Some(&"things".to_string()));
        assert_eq!(symbols.get("make"), Some(&"things".to_string()));
        assert_eq!(symbols.get("LIMIT"), Some(&"things".to_string()));
        assert!(!symbols.contains_key("_hidden"));
    }

    #[test]
    fn package_walk_builds_dotted_paths() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("__init__.py"), "").unwrap();
        fs::write(pkg.join("core.py"), "def run():\n    pass\n").unwrap();
        fs::write(pkg.join("sub").join("__init__.py"), "").unwrap();
        fs::write(pkg.join("sub").join("deep.py"), "class Deep:\n    pass\n").unwrap();

        let symbols = extract(&pkg, "pkg");
        assert_eq!(symbols.get("run"), Some(&"pkg.core".to_string()));
        assert_eq!(symbols.get("Deep"), Some(&"pkg.sub.deep".to_string()));
    }

    #[test]
    fn init_reexport_wins_over_deeper_definition() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("__init__.py"), "from pkg.core import run\n").unwrap();
        fs::write(pkg.join("core.py"), "def run():\n    pass\n").unwrap();

        let symbols = extract(&pkg, "pkg");
        assert_eq!(symbols.get("run"), Some(&"pkg".to_string()));
    }

    #[test]
    fn private_modules_and_caches_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join("__pycache__")).unwrap();
        fs::write(pkg.join("__init__.py"), "").unwrap();
        fs::write(pkg.join("_internal.py"), "def secret():\n    pass\n").unwrap();
        fs::write(pkg.join("__pycache__").join("x.py"), "def cached():\n    pass\n").unwrap();

        let symbols = extract(&pkg, "pkg");
        assert!(symbols.is_empty());
    }
}
