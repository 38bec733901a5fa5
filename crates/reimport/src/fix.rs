//! File and string entry points.

use crate::{Config, Error};
use reimport_analyze::LineAnalyzer;
use reimport_index::FsSymbolProvider;
use reimport_source::{Analyzer, ResolveOptions, SourceFile, SymbolProvider};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fix the imports of one source text with the bundled analyzer and a
/// symbol provider discovered from the working directory.
pub fn fix_code(source: &str, config: &Config) -> String {
    let provider = FsSymbolProvider::discover(&working_dir());
    fix_code_with(source, config, &LineAnalyzer::new(), &provider)
}

/// Fix the imports of one source text with caller-supplied analyzer
/// and symbol provider.
pub fn fix_code_with(
    source: &str,
    config: &Config,
    analyzer: &dyn Analyzer,
    provider: &dyn SymbolProvider,
) -> String {
    let options = ResolveOptions::new(config.common_statements.clone());
    SourceFile::parse(source, options).fix(analyzer, provider)
}

/// Fix files in place, writing only those whose text changed. Returns
/// the number of files rewritten.
pub fn fix_files(paths: &[PathBuf], config: &Config) -> Result<usize, Error> {
    let analyzer = LineAnalyzer::new();
    let provider = FsSymbolProvider::discover(&working_dir());

    let mut changed = 0;
    for path in paths {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        let fixed = fix_code_with(&source, config, &analyzer, &provider);
        if fixed == source {
            debug!(path = %path.display(), "already clean");
            continue;
        }
        std::fs::write(path, &fixed).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "fixed");
        changed += 1;
    }
    Ok(changed)
}

fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf())
}
