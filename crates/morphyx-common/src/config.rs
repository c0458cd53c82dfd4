//! Run configuration.
//!
//! A run is described by two YAML files: a main config holding the species
//! data (expression matrices, clusterings, gene mappings) that rarely
//! changes, and a run config holding what changes between runs (bait groups,
//! top_k). Top-level keys of the run config override the main config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::entities::BaitGroup;
use crate::error::{MorphyxError, Result};

/// Baits required in both matrix and clustering before a combination is ranked.
pub const DEFAULT_MIN_BAITS_PRESENT: usize = 8;

/// Rank positions at or beyond this window contribute nothing to the AUSR.
pub const DEFAULT_AUSR_WINDOW: usize = 1000;

/// Complete run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Number of candidates kept in each reported ranking
    pub top_k: usize,

    #[serde(default = "default_min_baits_present")]
    pub min_baits_present: usize,

    #[serde(default = "default_ausr_window")]
    pub ausr_window: usize,

    /// Species name -> species data
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesConfig>,

    /// Species name -> bait group id -> bait group
    #[serde(default)]
    pub bait_groups: BTreeMap<String, BTreeMap<String, BaitGroupConfig>>,
}

fn default_min_baits_present() -> usize { DEFAULT_MIN_BAITS_PRESENT }
fn default_ausr_window() -> usize { DEFAULT_AUSR_WINDOW }

// ── Species data ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Optional YAML gene name mapping (name -> list of mapped names)
    pub gene_mapping: Option<PathBuf>,

    /// Matrix name -> matrix file and its clusterings
    #[serde(default)]
    pub expression_matrices: BTreeMap<String, MatrixConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    pub path: PathBuf,

    /// Clustering name -> clustering file
    #[serde(default)]
    pub clusterings: BTreeMap<String, PathBuf>,
}

// ── Bait groups ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaitGroupConfig {
    pub name: String,
    pub genes: Vec<String>,
}

impl BaitGroupConfig {
    /// Bait group with the configured gene names, duplicates collapsed.
    /// Name mapping is applied by the ingestion layer.
    pub fn to_bait_group(&self, id: &str) -> BaitGroup {
        BaitGroup::new(id, self.name.clone(), self.genes.iter().cloned())
    }
}

// ── Ranking settings ──────────────────────────────────────────────────────────

/// The numeric knobs of a ranking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSettings {
    pub min_baits_present: usize,
    pub top_k: usize,
    pub ausr_window: usize,
}

impl RankSettings {
    pub fn new(top_k: usize) -> Self {
        Self {
            min_baits_present: DEFAULT_MIN_BAITS_PRESENT,
            top_k,
            ausr_window: DEFAULT_AUSR_WINDOW,
        }
    }

    pub fn with_min_baits_present(mut self, min_baits_present: usize) -> Self {
        self.min_baits_present = min_baits_present;
        self
    }

    pub fn with_ausr_window(mut self, ausr_window: usize) -> Self {
        self.ausr_window = ausr_window;
        self
    }

    /// All settings must be integers >= 1.
    pub fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(MorphyxError::Config(format!("top_k must be >= 1. Got: {}", self.top_k)));
        }
        if self.min_baits_present < 1 {
            return Err(MorphyxError::Config(format!(
                "min_baits_present must be >= 1. Got: {}",
                self.min_baits_present
            )));
        }
        if self.ausr_window < 1 {
            return Err(MorphyxError::Config(format!(
                "ausr_window must be >= 1. Got: {}",
                self.ausr_window
            )));
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl MorphConfig {
    /// Load and merge the main config and the run config.
    ///
    /// Relative paths are resolved against the directory of the file that
    /// declares them.
    pub fn load(config_path: &Path, run_config_path: &Path) -> Result<Self> {
        let mut merged = read_yaml_value(config_path)?;
        let run = read_yaml_value(run_config_path)?;

        let (Value::Mapping(base), Value::Mapping(overrides)) = (&mut merged, run) else {
            return Err(MorphyxError::Config("config files must contain a YAML mapping".into()));
        };
        for (key, value) in overrides {
            if base.contains_key(&key) {
                debug!("Run config overrides '{}'", key.as_str().unwrap_or("?"));
            }
            base.insert(key, value);
        }

        Self::from_value(merged)
    }

    /// Load a single self-contained YAML config file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        Self::from_value(read_yaml_value(path)?)
    }

    /// Load a single self-contained JSON config file. Relative paths are
    /// resolved as in [`MorphConfig::load`].
    pub fn from_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MorphyxError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut value: Value = serde_json::from_str(&content)?;
        resolve_species_paths(&mut value, base_dir_of(path));
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn settings(&self) -> RankSettings {
        RankSettings {
            min_baits_present: self.min_baits_present,
            top_k: self.top_k,
            ausr_window: self.ausr_window,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.settings().validate()?;
        for species_name in self.bait_groups.keys() {
            if !self.species.contains_key(species_name) {
                return Err(MorphyxError::Config(format!(
                    "bait groups given for species '{species_name}', which is not declared under 'species'"
                )));
            }
        }
        Ok(())
    }

    /// Total number of configured bait groups over all species.
    pub fn bait_group_count(&self) -> usize {
        self.bait_groups.values().map(BTreeMap::len).sum()
    }
}

fn read_yaml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MorphyxError::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut value: Value = serde_yaml::from_str(&content)?;
    resolve_species_paths(&mut value, base_dir_of(path));
    Ok(value)
}

fn base_dir_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Rewrite the relative file paths under `species` to be relative to `base_dir`.
fn resolve_species_paths(value: &mut Value, base_dir: &Path) {
    let Some(species) = value.get_mut("species").and_then(Value::as_mapping_mut) else {
        return;
    };
    for (_, species_info) in species.iter_mut() {
        if let Some(mapping) = species_info.get_mut("gene_mapping") {
            resolve_path(mapping, base_dir);
        }
        let Some(matrices) = species_info
            .get_mut("expression_matrices")
            .and_then(Value::as_mapping_mut)
        else {
            continue;
        };
        for (_, matrix_info) in matrices.iter_mut() {
            if let Some(path) = matrix_info.get_mut("path") {
                resolve_path(path, base_dir);
            }
            if let Some(clusterings) = matrix_info.get_mut("clusterings").and_then(Value::as_mapping_mut) {
                for (_, path) in clusterings.iter_mut() {
                    resolve_path(path, base_dir);
                }
            }
        }
    }
}

fn resolve_path(value: &mut Value, base_dir: &Path) {
    if let Value::String(s) = value {
        let path = Path::new(s.as_str());
        if path.is_relative() {
            *s = base_dir.join(path).to_string_lossy().into_owned();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
