//! Loading of DeepLabCut project configuration files.
//!
//! The schema of the file belongs to DeepLabCut. This module only checks that
//! the file exists and is a YAML mapping; the few accessors below are used for
//! diagnostics and never reject a configuration.

use crate::error::Error;
use serde_yaml::Value;
use std::{collections::BTreeMap, fmt, path::Path};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProjectConfig {
    entries: BTreeMap<String, Value>,
}

/// Which trained snapshot(s) DeepLabCut will evaluate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SnapshotIndex {
    /// Negative values count from the most recent snapshot.
    At(i64),
    All,
}

impl fmt::Display for SnapshotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{}", index),
            Self::All => f.write_str("all"),
        }
    }
}

impl ProjectConfig {
    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn task(&self) -> Option<&str> {
        self.get("Task").and_then(Value::as_str)
    }

    pub(crate) fn snapshot_index(&self) -> Option<SnapshotIndex> {
        match self.get("snapshotindex")? {
            Value::Number(number) => number.as_i64().map(SnapshotIndex::At),
            Value::String(s) if s == "all" => Some(SnapshotIndex::All),
            _ => None,
        }
    }
}

/// Load the DeepLabCut config at `path`.
pub(crate) fn load_config<P>(path: P) -> Result<ProjectConfig, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_owned()));
    }

    let contents = std::fs::read(path).map_err(|e| Error::ReadConfig(e, path.to_owned()))?;
    // invalid UTF-8 is a YAML error, not an I/O one
    let document: Value = serde_yaml::from_slice(&contents)
        .map_err(|e| Error::ConfigMalformed(e, path.to_owned()))?;

    // an empty document parses to null
    if document.is_null() {
        return Ok(ProjectConfig::default());
    }

    let entries =
        serde_yaml::from_value(document).map_err(|e| Error::ConfigMalformed(e, path.to_owned()))?;
    Ok(ProjectConfig { entries })
}
