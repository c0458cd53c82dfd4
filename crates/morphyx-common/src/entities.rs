/// Core input types handed to the ranking engine.
/// Everything here is read-only once built; parsers live in morphyx-ingestion.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{MorphyxError, Result};

/// Gene identifier, unique within a species after name mapping.
pub type GeneId = String;

// ---------------------------------------------------------------------------
// Expression matrix
// ---------------------------------------------------------------------------

/// Genes (rows) × samples (columns) expression values, stored row-major.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    genes: Vec<GeneId>,
    samples: Vec<String>,
    values: Vec<f64>,
    index: HashMap<GeneId, usize>,
}

impl ExpressionMatrix {
    /// Build a matrix from one value vector per gene.
    ///
    /// Fails on duplicate gene ids or when a row length differs from the
    /// number of samples.
    pub fn new(genes: Vec<GeneId>, samples: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if genes.len() != rows.len() {
            return Err(MorphyxError::Shape(format!(
                "expression matrix has {} gene ids but {} rows",
                genes.len(),
                rows.len()
            )));
        }

        let n_samples = samples.len();
        let mut index = HashMap::with_capacity(genes.len());
        let mut values = Vec::with_capacity(genes.len() * n_samples);
        for (i, (gene, row)) in genes.iter().zip(rows).enumerate() {
            if row.len() != n_samples {
                return Err(MorphyxError::Shape(format!(
                    "row '{}' has {} values, expected {}",
                    gene,
                    row.len(),
                    n_samples
                )));
            }
            if index.insert(gene.clone(), i).is_some() {
                return Err(MorphyxError::Shape(format!("duplicate gene '{gene}' in expression matrix")));
            }
            values.extend(row);
        }

        Ok(Self { genes, samples, values, index })
    }

    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Expression profile of the i-th gene.
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.samples.len();
        &self.values[i * n..(i + 1) * n]
    }

    pub fn index_of(&self, gene: &str) -> Option<usize> {
        self.index.get(gene).copied()
    }

    pub fn profile(&self, gene: &str) -> Option<&[f64]> {
        self.index_of(gene).map(|i| self.row(i))
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.index.contains_key(gene)
    }

    /// The given genes that are rows of this matrix, in iteration order.
    pub fn present<'a, I>(&self, genes: I) -> Vec<GeneId>
    where
        I: IntoIterator<Item = &'a GeneId>,
    {
        genes.into_iter().filter(|g| self.contains(g)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Assignment of genes to named clusters. A gene belongs to at most one cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clustering {
    assignment: HashMap<GeneId, String>,
}

impl Clustering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `gene` to `cluster`.
    ///
    /// Repeating an existing assignment is a no-op; moving a gene to a second
    /// cluster is an error.
    pub fn assign(&mut self, gene: impl Into<GeneId>, cluster: impl Into<String>) -> Result<()> {
        let gene = gene.into();
        let cluster = cluster.into();
        match self.assignment.get(&gene) {
            Some(existing) if *existing == cluster => Ok(()),
            Some(existing) => Err(MorphyxError::Shape(format!(
                "gene '{gene}' assigned to both cluster '{existing}' and '{cluster}'"
            ))),
            None => {
                self.assignment.insert(gene, cluster);
                Ok(())
            }
        }
    }

    /// Build from (gene, cluster) pairs.
    pub fn from_pairs<I, G, C>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (G, C)>,
        G: Into<GeneId>,
        C: Into<String>,
    {
        let mut clustering = Self::new();
        for (gene, cluster) in pairs {
            clustering.assign(gene, cluster)?;
        }
        Ok(clustering)
    }

    pub fn cluster_of(&self, gene: &str) -> Option<&str> {
        self.assignment.get(gene).map(String::as_str)
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.assignment.contains_key(gene)
    }

    /// Number of clustered genes.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Cluster label → sorted member genes.
    pub fn clusters(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut clusters: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (gene, cluster) in &self.assignment {
            clusters.entry(cluster.as_str()).or_default().push(gene.as_str());
        }
        for members in clusters.values_mut() {
            members.sort_unstable();
        }
        clusters
    }
}

// ---------------------------------------------------------------------------
// Bait group
// ---------------------------------------------------------------------------

/// A curated set of genes known to belong to one pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaitGroup {
    pub id: String,
    pub name: String,
    /// Name-mapped, de-duplicated gene ids.
    pub genes: BTreeSet<GeneId>,
}

impl BaitGroup {
    pub fn new<I, G>(id: impl Into<String>, name: impl Into<String>, genes: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GeneId>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            genes: genes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
