//! Resolving an undefined name to an import statement.
//!
//! Lookup tiers, first non-empty wins: the merged common-statement
//! table, the installed-module namespace, a short list of common
//! libraries, the current project's own packages. A name that no tier
//! resolves is dropped without error.

use crate::diag::SymbolProvider;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Libraries whose exports are searched for any undefined name, in
/// priority order.
pub const COMMON_LIBRARIES: &[&str] = &["typing", "collections", "dataclasses"];

/// Built-in name -> import statement table for frequently used
/// standard-library and third-party names.
pub const COMMON_STATEMENTS: &[(&str, &str)] = &[
    ("ABC", "from abc import ABC"),
    ("BaseModel", "from pydantic import BaseModel"),
    ("BeautifulSoup", "from bs4 import BeautifulSoup"),
    ("Enum", "from enum import Enum"),
    ("Field", "from pydantic import Field"),
    ("MagicMock", "from unittest.mock import MagicMock"),
    ("Path", "from pathlib import Path"),
    ("StringIO", "from io import StringIO"),
    ("ValidationError", "from pydantic import ValidationError"),
    ("YAMLError", "from yaml import YAMLError"),
    ("abstractmethod", "from abc import abstractmethod"),
    ("config", "from decouple import config"),
    ("datetime", "from datetime import datetime"),
    ("logger", "from loguru import logger"),
    ("patch", "from unittest.mock import patch"),
    ("suppress", "from contextlib import suppress"),
    ("timedelta", "from datetime import timedelta"),
    ("timezone", "from datetime import timezone"),
    ("tz", "from dateutil import tz"),
];

/// Resolution configuration: the built-in common-statement table with
/// caller overrides merged in, once, at construction.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    statements: HashMap<String, String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl ResolveOptions {
    /// Merge `overrides` over the built-in table. Later entries win,
    /// so an override can both extend and replace built-ins.
    pub fn new(overrides: HashMap<String, String>) -> Self {
        let mut statements: HashMap<String, String> = COMMON_STATEMENTS
            .iter()
            .map(|(name, import)| (name.to_string(), import.to_string()))
            .collect();
        statements.extend(overrides);
        Self { statements }
    }

    fn common_statement(&self, name: &str) -> Option<&str> {
        self.statements.get(name).map(String::as_str)
    }
}

/// Produce the import statement for an undefined `name`, or `None`
/// when no lookup tier knows it.
pub(crate) fn find_import(
    name: &str,
    options: &ResolveOptions,
    provider: &dyn SymbolProvider,
) -> Option<String> {
    if let Some(statement) = options.common_statement(name) {
        trace!(name, "resolved from common statements");
        return Some(statement.to_string());
    }

    if provider.module_is_installed(name) {
        trace!(name, "resolved as installed module");
        return Some(format!("import {name}"));
    }

    for library in COMMON_LIBRARIES.iter().copied() {
        if let Some(module) = provider.library_symbols(library).get(name) {
            trace!(name, library, "resolved from common library");
            return Some(format!("from {module} import {name}"));
        }
    }

    provider.ensure_project_on_path();
    for package in provider.project_packages() {
        if let Some(module) = provider.library_symbols(&package).get(name) {
            trace!(name, %package, "resolved from project package");
            return Some(format!("from {module} import {name}"));
        }
    }

    debug!(name, "no import found");
    None
}
