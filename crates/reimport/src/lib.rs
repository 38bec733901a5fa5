//! Library facade over the import repair engine: configuration
//! loading and the file/stdin entry points the CLI is built on.

pub mod config;

mod fix;

pub use config::Config;
pub use fix::{fix_code, fix_code_with, fix_files};

use std::path::PathBuf;

/// Errors surfaced by the batch layer. The fix engine itself never
/// fails; only I/O and configuration parsing can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}
