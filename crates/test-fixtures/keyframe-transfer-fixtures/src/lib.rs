use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    snapshots: HashMap<String, SnapshotEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        valid: Option<bool>,
    },
}

impl SnapshotEntry {
    fn as_path(&self) -> &str {
        match self {
            SnapshotEntry::Path(path) => path,
            SnapshotEntry::Detailed { path, .. } => path,
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            SnapshotEntry::Path(_) => true,
            SnapshotEntry::Detailed { valid, .. } => valid.unwrap_or(true),
        }
    }
}

/// Fixture paths in the manifest are relative to the workspace `fixtures/` directory.
fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel)
}

fn read_fixture(rel: &str) -> Result<String> {
    let path = fixture_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("cannot read fixture document {}", path.display()))
}

fn parse_fixture<T: DeserializeOwned>(rel: &str) -> Result<T> {
    serde_json::from_str(&read_fixture(rel)?)
        .with_context(|| format!("fixture {rel} is not the expected JSON shape"))
}

fn entry<'a, T>(entries: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    entries
        .get(name)
        .ok_or_else(|| anyhow!("no {kind} fixture named '{name}' in the manifest"))
}

/// Persisted snapshot documents.
pub mod snapshots {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.snapshots.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Fixtures that must load cleanly; the rest exercise validation failures.
    pub fn valid_keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST
            .snapshots
            .iter()
            .filter(|(_, entry)| entry.is_valid())
            .map(|(name, _)| name.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let doc = entry(&MANIFEST.snapshots, "snapshot", name)?;
        read_fixture(doc.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let doc = entry(&MANIFEST.snapshots, "snapshot", name)?;
        parse_fixture(doc.as_path())
    }
}

/// Transfer configuration documents.
pub mod configs {
    use super::*;

    pub fn json(name: &str) -> Result<String> {
        let rel = entry(&MANIFEST.configs, "config", name)?;
        read_fixture(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_is_readable() {
        for name in snapshots::keys() {
            snapshots::json(&name).unwrap();
        }
        for name in MANIFEST.configs.keys() {
            configs::json(name).unwrap();
        }
        assert!(snapshots::json("missing").is_err());
    }
}
