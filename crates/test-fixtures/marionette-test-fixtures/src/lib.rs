//! Shared JSON fixtures for the marionette crates' tests and benches.
//!
//! Fixture files live under the workspace `fixtures/` directory and are
//! indexed by `fixtures/manifest.json`. Loaders are generic so each crate
//! deserializes into its own descriptor types.

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
    models: HashMap<String, String>,
    motions: HashMap<String, String>,
    expressions: HashMap<String, String>,
    physics: HashMap<String, String>,
    poses: HashMap<String, String>,
    puppets: HashMap<String, PuppetEntry>,
}

/// A model together with the assets authored for it.
#[derive(Debug, Deserialize)]
struct PuppetEntry {
    model: String,
    #[serde(default)]
    motions: Vec<String>,
    #[serde(default)]
    expressions: Vec<String>,
    #[serde(default)]
    physics: Option<String>,
    #[serde(default)]
    pose: Option<String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

macro_rules! asset_kind {
    ($module:ident, $field:ident, $kind:literal) => {
        pub mod $module {
            use super::*;

            pub fn keys() -> Vec<String> {
                sorted_keys(&MANIFEST.$field)
            }

            pub fn json(name: &str) -> Result<String> {
                let rel = lookup(&MANIFEST.$field, $kind, name)?;
                read_to_string(rel)
            }

            pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
                let rel = lookup(&MANIFEST.$field, $kind, name)?;
                super::load_json(rel)
            }

            pub fn path(name: &str) -> Result<PathBuf> {
                let rel = lookup(&MANIFEST.$field, $kind, name)?;
                Ok(resolve_path(rel))
            }
        }
    };
}

asset_kind!(models, models, "model");
asset_kind!(motions, motions, "motion");
asset_kind!(expressions, expressions, "expression");
asset_kind!(physics, physics, "physics");
asset_kind!(poses, poses, "pose");

/// Bundles that reference the other kinds by name.
pub mod puppets {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.puppets)
    }

    pub fn model<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.puppets, "puppet", name)?;
        super::models::load(&entry.model)
    }

    pub fn motions<T: DeserializeOwned>(name: &str) -> Result<Vec<T>> {
        let entry = lookup(&MANIFEST.puppets, "puppet", name)?;
        entry
            .motions
            .iter()
            .map(|m| super::motions::load(m))
            .collect()
    }

    pub fn expressions<T: DeserializeOwned>(name: &str) -> Result<Vec<T>> {
        let entry = lookup(&MANIFEST.puppets, "puppet", name)?;
        entry
            .expressions
            .iter()
            .map(|e| super::expressions::load(e))
            .collect()
    }

    pub fn physics<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.puppets, "puppet", name)?;
        match &entry.physics {
            Some(p) => super::physics::load(p).map(Some),
            None => Ok(None),
        }
    }

    pub fn pose<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.puppets, "puppet", name)?;
        match &entry.pose {
            Some(p) => super::poses::load(p).map(Some),
            None => Ok(None),
        }
    }
}
