//! Run driver: ranks every (expression matrix, clustering, bait group)
//! combination and produces one [`MorphResult`] per combination.
//!
//! Baits missing from the matrix or the clustering are excluded from that
//! combination, including from its AUSR. Correlations are computed once per
//! (matrix, bait group) and shared by the clusterings of that matrix, which
//! are ranked in parallel.

use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use morphyx_common::{BaitGroup, Clustering, ExpressionMatrix, GeneId, MorphyxError, RankSettings, Result};

use crate::correlation::{compute_correlations, CorrelationTable};
use crate::observer::{Combination, RankObserver};
use crate::scorer::{rank_genes, RankDiagnostics, Ranking};

/// Why a combination has no ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer baits in both matrix and clustering than required
    InsufficientBaits { present: usize, required: usize },
    /// Ranking hit malformed input; only this combination is affected
    Failed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientBaits { required, .. } => {
                write!(f, "need at least {required} baits present")
            }
            SkipReason::Failed { message } => write!(f, "ranking failed: {message}"),
        }
    }
}

/// Outcome of one (matrix, clustering, bait group) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphResult {
    pub bait_group_id: String,
    pub bait_group_name: String,
    pub matrix_name: String,
    pub clustering_name: String,
    /// Baits present in both the expression matrix and the clustering
    pub present_baits: BTreeSet<GeneId>,
    /// Baits of the group missing from the matrix or the clustering
    pub missing_baits: BTreeSet<GeneId>,
    /// Top-k candidates, best first; `None` when skipped
    pub ranking: Option<Ranking>,
    pub ausr: Option<f64>,
    pub skip_reason: Option<SkipReason>,
    pub diagnostics: Option<RankDiagnostics>,
}

impl MorphResult {
    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}

/// A named clustering of one expression matrix.
#[derive(Debug, Clone)]
pub struct ClusteringData {
    pub name: String,
    pub clustering: Clustering,
}

/// A named expression matrix with its clusterings.
#[derive(Debug, Clone)]
pub struct MatrixData {
    pub name: String,
    pub matrix: ExpressionMatrix,
    pub clusterings: Vec<ClusteringData>,
}

/// Everything needed to rank one species' bait groups.
#[derive(Debug, Clone)]
pub struct SpeciesData {
    pub name: String,
    pub matrices: Vec<MatrixData>,
    pub bait_groups: Vec<BaitGroup>,
}

/// Rank every combination of every species.
///
/// Results are stably sorted by bait group id; within a bait group they keep
/// evaluation order (species, matrix, clustering, as given).
pub fn run_morph(
    settings: &RankSettings,
    species: &[SpeciesData],
    observer: &dyn RankObserver,
) -> Result<Vec<MorphResult>> {
    settings.validate()?;

    info!(
        "For each expression matrix and clustering combination, baits missing from either are \
         temporarily excluded. The excluded baits are also excluded from the AUSR calculation."
    );

    let mut results = Vec::new();
    for data in species {
        info!("Ranking '{}' bait groups", data.name);
        results.extend(run_species(settings, data, observer));
    }

    results.sort_by(|a, b| a.bait_group_id.cmp(&b.bait_group_id));
    Ok(results)
}

/// Rank every combination of one species, in evaluation order.
pub fn run_species(
    settings: &RankSettings,
    species: &SpeciesData,
    observer: &dyn RankObserver,
) -> Vec<MorphResult> {
    let mut results = Vec::new();
    for matrix in &species.matrices {
        for group in &species.bait_groups {
            let baits_in_matrix = matrix.matrix.present(&group.genes);
            debug!(
                "'{}': '{}': correlating {} baits",
                matrix.name,
                group.name,
                baits_in_matrix.len()
            );

            match compute_correlations(&matrix.matrix, &baits_in_matrix) {
                Ok(correlations) => {
                    let ranked: Vec<MorphResult> = matrix
                        .clusterings
                        .par_iter()
                        .map(|c| rank_combination(settings, group, &matrix.name, &correlations, c, observer))
                        .collect();
                    results.extend(ranked);
                }
                Err(e) => {
                    results.extend(
                        matrix
                            .clusterings
                            .iter()
                            .map(|c| failed_combination(group, &matrix.name, c, &e, observer)),
                    );
                }
            }
        }
    }
    results
}

/// Rank one combination, given the correlations of the matrix genes to the
/// group's baits that are present in the matrix.
pub fn rank_combination(
    settings: &RankSettings,
    group: &BaitGroup,
    matrix_name: &str,
    correlations: &CorrelationTable,
    clustering: &ClusteringData,
    observer: &dyn RankObserver,
) -> MorphResult {
    let combination = Combination {
        matrix: matrix_name,
        bait_group: &group.name,
        clustering: &clustering.name,
    };
    let baits_in_both: Vec<GeneId> = correlations
        .baits()
        .iter()
        .filter(|b| clustering.clustering.contains(b))
        .cloned()
        .collect();
    let present: BTreeSet<GeneId> = baits_in_both.iter().cloned().collect();
    let missing: BTreeSet<GeneId> = group.genes.difference(&present).cloned().collect();

    let mut result = MorphResult {
        bait_group_id: group.id.clone(),
        bait_group_name: group.name.clone(),
        matrix_name: matrix_name.to_string(),
        clustering_name: clustering.name.clone(),
        present_baits: present,
        missing_baits: missing,
        ranking: None,
        ausr: None,
        skip_reason: None,
        diagnostics: None,
    };

    if baits_in_both.len() < settings.min_baits_present {
        let reason = SkipReason::InsufficientBaits {
            present: baits_in_both.len(),
            required: settings.min_baits_present,
        };
        observer.on_skipped(&combination, baits_in_both.len(), group.len(), &reason);
        result.skip_reason = Some(reason);
        return result;
    }

    observer.on_ranking(&combination, baits_in_both.len(), group.len());
    let outcome = correlations
        .select_baits(&baits_in_both)
        .and_then(|table| rank_genes(&table, &clustering.clustering, settings.ausr_window));

    match outcome {
        Ok(outcome) => {
            observer.on_ranked(&combination, &outcome.diagnostics, outcome.ausr);
            result.ranking = Some(outcome.ranking.top(settings.top_k));
            result.ausr = Some(outcome.ausr);
            result.diagnostics = Some(outcome.diagnostics);
        }
        Err(e) => {
            observer.on_failed(&combination, &e);
            result.skip_reason = Some(SkipReason::Failed { message: e.to_string() });
        }
    }
    result
}

/// Record for a combination whose correlations could not be computed.
fn failed_combination(
    group: &BaitGroup,
    matrix_name: &str,
    clustering: &ClusteringData,
    error: &MorphyxError,
    observer: &dyn RankObserver,
) -> MorphResult {
    let combination = Combination {
        matrix: matrix_name,
        bait_group: &group.name,
        clustering: &clustering.name,
    };
    observer.on_failed(&combination, error);

    MorphResult {
        bait_group_id: group.id.clone(),
        bait_group_name: group.name.clone(),
        matrix_name: matrix_name.to_string(),
        clustering_name: clustering.name.clone(),
        present_baits: BTreeSet::new(),
        missing_baits: group.genes.clone(),
        ranking: None,
        ausr: None,
        skip_reason: Some(SkipReason::Failed { message: error.to_string() }),
        diagnostics: None,
    }
}
