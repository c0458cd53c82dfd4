//! Gene name mapping.
//!
//! Bait groups are curated with the names biologists use; expression data
//! uses database identifiers. A mapping file translates the former into the
//! latter:
//!
//! ```yaml
//! CHS: [AT5G13930]
//! PAL: [AT2G37040, AT3G53260]
//! F3H: AT3G51240
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use morphyx_common::{BaitGroup, GeneId, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Mapped {
    One(String),
    Many(Vec<String>),
}

/// Name -> mapped names. Names without an entry map to themselves.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct GeneMapping {
    entries: HashMap<String, Mapped>,
}

impl GeneMapping {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserialises to unit, not to an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading gene mapping {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace each name by its mapped names. Duplicates collapse.
    pub fn map_genes<'a, I>(&self, names: I) -> BTreeSet<GeneId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapped = BTreeSet::new();
        for name in names {
            match self.entries.get(name) {
                Some(Mapped::One(gene)) => {
                    mapped.insert(gene.clone());
                }
                Some(Mapped::Many(genes)) => mapped.extend(genes.iter().cloned()),
                None => {
                    mapped.insert(name.to_string());
                }
            }
        }
        mapped
    }

    pub fn map_group(&self, group: &BaitGroup) -> BaitGroup {
        BaitGroup::new(
            group.id.clone(),
            group.name.clone(),
            self.map_genes(group.genes.iter().map(String::as_str)),
        )
    }
}
