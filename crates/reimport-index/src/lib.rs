//! Filesystem-backed symbol lookup for installed Python packages.
//!
//! Resolution never runs a Python interpreter. Installed modules and
//! their importable names are found by walking the directories Python
//! itself would search: `PYTHONPATH` entries, the site-packages of a
//! venv next to the project, and the standard library of the
//! interpreter on `PATH`.

mod paths;
mod symbols;

use reimport_source::SymbolProvider;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Top-level standard-library modules with no `.py` file on disk
/// (builtin or extension modules). Sorted for binary search.
const BUILTIN_MODULES: &[&str] = &[
    "_thread", "array", "atexit", "binascii", "builtins", "cmath", "errno", "faulthandler", "gc",
    "itertools", "marshal", "math", "posix", "pwd", "select", "sys", "syslog", "time", "unicodedata",
    "winreg", "zlib",
];

/// Symbol provider backed by the filesystem layout of a project and
/// its Python environment.
#[derive(Debug)]
pub struct FsSymbolProvider {
    project_root: PathBuf,
    search_paths: Mutex<Vec<PathBuf>>,
}

impl FsSymbolProvider {
    /// Build a provider for the project rooted at `project_root`,
    /// seeding search paths from `PYTHONPATH`, a sibling venv and the
    /// stdlib of the `python3` on `PATH`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let mut search_paths = paths::pythonpath_entries();
        if let Some(site_packages) = paths::find_site_packages(&project_root) {
            search_paths.push(site_packages);
        }
        if let Some(stdlib) = paths::find_stdlib() {
            search_paths.push(stdlib);
        }
        debug!(root = %project_root.display(), paths = search_paths.len(), "symbol provider ready");
        Self {
            project_root,
            search_paths: Mutex::new(search_paths),
        }
    }

    /// Build a provider rooted at the project containing `start`.
    pub fn discover(start: &Path) -> Self {
        Self::new(find_project_root(start))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The directory or module file a top-level module name resolves
    /// to, if any search path contains it.
    fn locate_module(&self, name: &str) -> Option<PathBuf> {
        let search_paths = self.search_paths.lock().unwrap();
        for base in search_paths.iter() {
            let as_file = base.join(format!("{name}.py"));
            if as_file.is_file() {
                return Some(as_file);
            }
            let as_package = base.join(name);
            if as_package.is_dir() {
                return Some(as_package);
            }
        }
        None
    }
}

impl SymbolProvider for FsSymbolProvider {
    fn module_is_installed(&self, name: &str) -> bool {
        let top = name.split('.').next().unwrap_or(name);
        BUILTIN_MODULES.binary_search(&top).is_ok() || self.locate_module(top).is_some()
    }

    fn library_symbols(&self, library: &str) -> HashMap<String, String> {
        match self.locate_module(library) {
            Some(path) => symbols::extract(&path, library),
            None => {
                debug!(library, "library not found on any search path");
                HashMap::new()
            }
        }
    }

    fn project_packages(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.project_root) else {
            return Vec::new();
        };
        let mut packages: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().join("__init__.py").is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name != "tests")
            .collect();
        packages.sort();
        packages
    }

    fn ensure_project_on_path(&self) {
        let mut search_paths = self.search_paths.lock().unwrap();
        if !search_paths.contains(&self.project_root) {
            search_paths.insert(0, self.project_root.clone());
        }
    }
}

/// Walk up from `start` looking for a project marker; fall back to
/// `start` itself when none is found.
pub fn find_project_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        for marker in ["pyproject.toml", "setup.py", "setup.cfg", ".git"] {
            if dir.join(marker).exists() {
                return dir.to_path_buf();
            }
        }
    }
    start.to_path_buf()
}
