//! Configuration loading.
//!
//! Overrides for the common-statement table live in the project's
//! `pyproject.toml`:
//!
//! ```toml
//! [tool.reimport.common_statements]
//! np = "import numpy as np"
//! Deps = "from myapp.deps import Deps"
//! ```
//!
//! A top-level `common_statements` table (the shape of a standalone
//! config file) is still read as a deprecated alias.

use crate::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// User-facing configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Symbol name to full import statement, merged over the built-in
    /// table at resolver construction.
    pub common_statements: HashMap<String, String>,
}

impl Config {
    /// Load configuration from an explicit TOML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Document = toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(document.flatten())
    }

    /// Load configuration from the project's `pyproject.toml`, or the
    /// defaults when the project has none.
    pub fn discover(project_root: &Path) -> Result<Self, Error> {
        let path = project_root.join("pyproject.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// The shape of a pyproject.toml, reduced to the parts that matter.
/// The flat top-level table is the shape of a standalone config file
/// passed via `--config-file`; it is kept as a deprecated alias.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Document {
    tool: ToolSection,
    common_statements: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ToolSection {
    reimport: ReimportSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ReimportSection {
    common_statements: Option<HashMap<String, String>>,
}

impl Document {
    fn flatten(self) -> Config {
        let common_statements = match (self.tool.reimport.common_statements, self.common_statements)
        {
            (Some(canonical), _) => canonical,
            (None, Some(flat)) => {
                warn!("top-level common_statements is deprecated; move it under [tool.reimport]");
                flat
            }
            (None, None) => HashMap::new(),
        };
        Config { common_statements }
    }
}
