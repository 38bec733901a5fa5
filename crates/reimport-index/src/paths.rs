//! Locating Python search paths from filesystem structure alone;
//! no interpreter subprocess is ever spawned.

use std::path::{Path, PathBuf};

/// Entries of the `PYTHONPATH` environment variable, in order.
pub(crate) fn pythonpath_entries() -> Vec<PathBuf> {
    match std::env::var_os("PYTHONPATH") {
        Some(value) => std::env::split_paths(&value).collect(),
        None => Vec::new(),
    }
}

/// Find the site-packages directory serving a project: a `.venv` or
/// `venv` under the project root, or one in a parent directory.
pub(crate) fn find_site_packages(project_root: &Path) -> Option<PathBuf> {
    for dir in project_root.ancestors() {
        for venv_name in [".venv", "venv"] {
            let venv = dir.join(venv_name);
            if venv.is_dir()
                && let Some(site_packages) = site_packages_in_venv(&venv)
            {
                return Some(site_packages);
            }
        }
    }
    None
}

/// Find site-packages within a venv directory.
fn site_packages_in_venv(venv: &Path) -> Option<PathBuf> {
    // Unix: lib/pythonX.Y/site-packages
    let lib_dir = venv.join("lib");
    if lib_dir.is_dir()
        && let Ok(entries) = std::fs::read_dir(&lib_dir)
    {
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with("python") {
                let site_packages = entry.path().join("site-packages");
                if site_packages.is_dir() {
                    return Some(site_packages);
                }
            }
        }
    }

    // Windows: Lib/site-packages
    let lib_dir = venv.join("Lib").join("site-packages");
    if lib_dir.is_dir() {
        return Some(lib_dir);
    }

    None
}

/// Find the standard-library directory of the `python3` (or `python`)
/// on `PATH`: the binary sits at `<prefix>/bin/`, the stdlib at
/// `<prefix>/lib/pythonX.Y/`.
pub(crate) fn find_stdlib() -> Option<PathBuf> {
    let python_bin = std::env::var("PATH").ok().and_then(|path| {
        for dir in std::env::split_paths(&path) {
            for name in ["python3", "python"] {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
        None
    })?;

    // Resolve symlinks to find the real installation prefix.
    let python_real = std::fs::canonicalize(&python_bin).unwrap_or(python_bin);
    let lib = python_real.parent()?.parent()?.join("lib");

    let mut best: Option<(String, PathBuf)> = None;
    for entry in std::fs::read_dir(&lib).ok()?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(version) = name.strip_prefix("python")
            && version.contains('.')
            && version.starts_with(|c: char| c.is_ascii_digit())
            && entry.path().is_dir()
            && best.as_ref().is_none_or(|(v, _)| version > v.as_str())
        {
            best = Some((version.to_string(), entry.path()));
        }
    }

    best.map(|(_, path)| path)
}
