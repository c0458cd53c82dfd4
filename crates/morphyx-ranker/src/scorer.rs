//! Ranking & validation engine.
//!
//! Genes are scored per cluster by their summed correlation to the baits of
//! that cluster; scores are made comparable across clusters by
//! [`finalise_cluster`]. The quality of the ranking is measured by holding
//! out each bait in turn and checking where the remaining baits rank it
//! (see [`crate::ausr`]).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use morphyx_common::{Clustering, GeneId, MorphyxError, Result};

use crate::ausr::compute_ausr;
use crate::correlation::CorrelationTable;
use crate::normalise::{sort_best_first, zscore};

/// Genes ordered best (most bait-like) first, with their finalised scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    #[serde(with = "nan_as_null")]
    entries: Vec<(GeneId, f64)>,
}

/// JSON has no NaN: NaN scores are written as `null` and read back as NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    use morphyx_common::GeneId;

    pub fn serialize<S: Serializer>(entries: &[(GeneId, f64)], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            entries
                .iter()
                .map(|(gene, score)| (gene, if score.is_nan() { None } else { Some(*score) })),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(GeneId, f64)>, D::Error> {
        let entries: Vec<(GeneId, Option<f64>)> = Vec::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(gene, score)| (gene, score.unwrap_or(f64::NAN)))
            .collect())
    }
}

impl Ranking {
    /// Sort `entries` best first (NaN last, ties in input order).
    pub fn from_unsorted(mut entries: Vec<(GeneId, f64)>) -> Self {
        sort_best_first(&mut entries);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(g, s)| (g.as_str(), *s))
    }

    pub fn genes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(g, _)| g.as_str())
    }

    pub fn score_of(&self, gene: &str) -> Option<f64> {
        self.entries.iter().find(|(g, _)| g == gene).map(|(_, s)| *s)
    }

    pub fn position_of(&self, gene: &str) -> Option<usize> {
        self.entries.iter().position(|(g, _)| g == gene)
    }

    /// The best `k` entries.
    pub fn top(&self, k: usize) -> Self {
        Self {
            entries: self.entries.iter().take(k).cloned().collect(),
        }
    }
}

/// Where a held-out bait was recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldOutBait {
    pub bait: GeneId,
    pub cluster: String,
    /// 0-indexed position in the cluster's leave-one-out ranking
    pub position: usize,
}

/// Structured facts about one ranking, for logging and reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDiagnostics {
    /// Rows of the correlation table
    pub total_rows: usize,
    /// Rows dropped because their gene is not in the clustering
    pub dropped_rows: usize,
    /// Clusters holding at least one bait
    pub clusters_ranked: usize,
    /// Clusters holding no bait, left out of ranking and validation
    pub clusters_without_baits: usize,
    /// Genes, baits included, in clusters holding at least one bait
    pub participating_genes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Full ranking of non-bait genes over all bait-holding clusters
    pub ranking: Ranking,
    pub ausr: f64,
    /// One entry per held-out bait, in cluster order
    pub held_out: Vec<HeldOutBait>,
    pub diagnostics: RankDiagnostics,
}

/// One cluster of the correlation table.
struct ClusterRows<'a> {
    label: &'a str,
    /// Table rows of the members, in table order
    rows: Vec<usize>,
    /// (bait column, bait gene) of the baits that are members
    baits: Vec<(usize, &'a str)>,
}

/// Partition the clustered rows of `table` by cluster label, in label order.
/// Returns the clusters and the number of rows whose gene is not clustered.
fn partition<'a>(table: &'a CorrelationTable, clustering: &'a Clustering) -> (Vec<ClusterRows<'a>>, usize) {
    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut clustered = 0;
    for (row, gene) in table.genes().iter().enumerate() {
        if let Some(label) = clustering.cluster_of(gene) {
            members.entry(label).or_default().push(row);
            clustered += 1;
        }
    }

    let rows_of: HashSet<&str> = table.genes().iter().map(String::as_str).collect();
    let mut baits: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
    for (col, bait) in table.baits().iter().enumerate() {
        if !rows_of.contains(bait.as_str()) {
            continue;
        }
        if let Some(label) = clustering.cluster_of(bait) {
            baits.entry(label).or_default().push((col, bait.as_str()));
        }
    }

    let clusters = members
        .into_iter()
        .map(|(label, rows)| ClusterRows {
            label,
            rows,
            baits: baits.remove(label).unwrap_or_default(),
        })
        .collect();

    (clusters, table.n_genes() - clustered)
}

/// Finalise one cluster's raw scores.
///
/// Bait rows are dropped, the rest are divided by the number of baits and
/// z-scored within the cluster. An empty bait set leaves the scores
/// unscaled before the z-score. Returns nothing when only baits remain.
pub fn finalise_cluster<'a>(raw_scores: &[(&'a str, f64)], baits: &HashSet<&str>) -> Vec<(&'a str, f64)> {
    let candidates: Vec<(&'a str, f64)> = raw_scores
        .iter()
        .filter(|(gene, _)| !baits.contains(gene))
        .copied()
        .collect();
    if candidates.is_empty() {
        return candidates;
    }

    let bait_count = baits.len().max(1) as f64;
    let averaged: Vec<f64> = candidates.iter().map(|(_, raw)| raw / bait_count).collect();
    candidates
        .iter()
        .zip(zscore(&averaged))
        .map(|((gene, _), z)| (*gene, z))
        .collect()
}

/// Rank the genes of `correlations` by their bait clusters and validate the
/// ranking by leave-one-out.
///
/// The caller guarantees enough baits are present; this only fails on
/// malformed input or when no bait belongs to any cluster.
pub fn rank_genes(
    correlations: &CorrelationTable,
    clustering: &Clustering,
    ausr_window: usize,
) -> Result<RankOutcome> {
    let (clusters, dropped_rows) = partition(correlations, clustering);
    let genes = correlations.genes();

    let mut diagnostics = RankDiagnostics {
        total_rows: correlations.n_genes(),
        dropped_rows,
        ..Default::default()
    };
    let mut ranked: Vec<(GeneId, f64)> = Vec::new();
    let mut held_out: Vec<HeldOutBait> = Vec::new();

    for cluster in &clusters {
        if cluster.baits.is_empty() {
            diagnostics.clusters_without_baits += 1;
            continue;
        }
        diagnostics.clusters_ranked += 1;
        diagnostics.participating_genes += cluster.rows.len();

        let raw: Vec<(&str, f64)> = cluster
            .rows
            .iter()
            .map(|&row| {
                let sum: f64 = cluster.baits.iter().map(|&(col, _)| correlations.get(row, col)).sum();
                (genes[row].as_str(), sum)
            })
            .collect();
        let bait_set: HashSet<&str> = cluster.baits.iter().map(|&(_, bait)| bait).collect();

        ranked.extend(
            finalise_cluster(&raw, &bait_set)
                .into_iter()
                .map(|(gene, score)| (gene.to_string(), score)),
        );

        for &(col, bait) in &cluster.baits {
            let position = recover_position(correlations, cluster, &raw, &bait_set, col, bait)?;
            held_out.push(HeldOutBait {
                bait: bait.to_string(),
                cluster: cluster.label.to_string(),
                position,
            });
        }
    }

    let positions: Vec<usize> = held_out.iter().map(|h| h.position).collect();
    let ausr = compute_ausr(&positions, ausr_window).ok_or_else(|| {
        MorphyxError::Ranking(format!(
            "no leave-one-out samples: none of the {} baits is in a clustered row (window {})",
            correlations.n_baits(),
            ausr_window
        ))
    })?;

    Ok(RankOutcome {
        ranking: Ranking::from_unsorted(ranked),
        ausr,
        held_out,
        diagnostics,
    })
}

/// Position of `bait` in its cluster's ranking when it is not used as a bait.
fn recover_position(
    correlations: &CorrelationTable,
    cluster: &ClusterRows<'_>,
    raw: &[(&str, f64)],
    bait_set: &HashSet<&str>,
    bait_col: usize,
    bait: &str,
) -> Result<usize> {
    let without_bait: Vec<(&str, f64)> = raw
        .iter()
        .zip(&cluster.rows)
        .map(|(&(gene, score), &row)| (gene, score - correlations.get(row, bait_col)))
        .collect();
    let mut remaining = bait_set.clone();
    remaining.remove(bait);

    let mut finalised = finalise_cluster(&without_bait, &remaining);
    sort_best_first(&mut finalised);
    finalised
        .iter()
        .position(|(gene, _)| *gene == bait)
        .ok_or_else(|| {
            MorphyxError::Ranking(format!("held-out bait '{bait}' missing from cluster '{}'", cluster.label))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(genes: &[&str], baits: &[&str], values: Vec<f64>) -> CorrelationTable {
        CorrelationTable::new(
            genes.iter().map(|g| g.to_string()).collect(),
            baits.iter().map(|b| b.to_string()).collect(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn test_ranking_json_keeps_nan_scores() {
        let ranking = Ranking::from_unsorted(vec![
            ("flat".to_string(), f64::NAN),
            ("g1".to_string(), 0.5),
        ]);
        let json = serde_json::to_string(&ranking).unwrap();
        assert_eq!(json, r#"{"entries":[["g1",0.5],["flat",null]]}"#);

        let back: Ranking = serde_json::from_str(&json).unwrap();
        assert_eq!(back.genes().collect::<Vec<_>>(), vec!["g1", "flat"]);
        assert_eq!(back.score_of("g1"), Some(0.5));
        assert!(back.score_of("flat").unwrap().is_nan());
    }

    #[test]
    fn test_finalise_drops_baits_and_zscores() {
        let raw = vec![("b1", 3.0), ("g1", 1.0), ("g2", 3.0)];
        let baits: HashSet<&str> = ["b1"].into_iter().collect();
        let out = finalise_cluster(&raw, &baits);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, "g1");
        assert!((out[0].1 + 1.0).abs() < 1e-12);
        assert!((out[1].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_finalise_only_baits_is_empty() {
        let raw = vec![("b1", 1.0), ("b2", 2.0)];
        let baits: HashSet<&str> = ["b1", "b2"].into_iter().collect();
        assert!(finalise_cluster(&raw, &baits).is_empty());
    }

    #[test]
    fn test_finalise_is_pure() {
        let raw = vec![("g1", 0.2), ("g2", 0.8), ("b1", 1.0)];
        let baits: HashSet<&str> = ["b1"].into_iter().collect();
        assert_eq!(finalise_cluster(&raw, &baits), finalise_cluster(&raw, &baits));
    }

    #[test]
    fn test_rank_two_baits_one_cluster() {
        // b1 and b2 correlate with each other; g1 follows them, g2 does not.
        let t = table(
            &["g1", "g2", "b1", "b2"],
            &["b1", "b2"],
            vec![
                0.9, 0.8, //
                -0.5, -0.4, //
                1.0, 0.7, //
                0.7, 1.0,
            ],
        );
        let clustering = Clustering::from_pairs([("g1", "A"), ("g2", "A"), ("b1", "A"), ("b2", "A")]).unwrap();

        let out = rank_genes(&t, &clustering, 1000).unwrap();
        assert_eq!(out.ranking.genes().collect::<Vec<_>>(), vec!["g1", "g2"]);
        assert_eq!(out.held_out.len(), 2);
        // Holding out b1: scores by b2 alone are g1 0.8, g2 -0.4, b1 0.7 -> b1 second.
        assert_eq!(out.held_out[0], HeldOutBait { bait: "b1".into(), cluster: "A".into(), position: 1 });
        // Holding out b2: scores by b1 alone are g1 0.9, g2 -0.5, b2 0.7 -> b2 second.
        assert_eq!(out.held_out[1].position, 1);
        assert!((out.ausr - 2.0 / 2000.0).abs() < 1e-12);
    }

    #[test]
    fn test_unclustered_rows_dropped_and_reported() {
        let t = table(&["g1", "b1", "lost"], &["b1"], vec![0.5, 1.0, 0.9]);
        let clustering = Clustering::from_pairs([("g1", "A"), ("b1", "A")]).unwrap();

        let out = rank_genes(&t, &clustering, 1000).unwrap();
        assert_eq!(out.diagnostics.total_rows, 3);
        assert_eq!(out.diagnostics.dropped_rows, 1);
        assert!(out.ranking.position_of("lost").is_none());
    }

    #[test]
    fn test_single_bait_cluster_still_validated() {
        // With its only bait held out, the cluster has no evidence left: every
        // score is NaN and the bait keeps its table position.
        let t = table(&["g1", "b1", "g2"], &["b1"], vec![0.3, 1.0, 0.1]);
        let clustering = Clustering::from_pairs([("g1", "A"), ("b1", "A"), ("g2", "A")]).unwrap();

        let out = rank_genes(&t, &clustering, 1000).unwrap();
        assert_eq!(out.held_out.len(), 1);
        assert_eq!(out.held_out[0].position, 1);
        assert_eq!(out.ranking.len(), 2);
    }

    #[test]
    fn test_bait_only_cluster_validated_but_not_ranked() {
        let t = table(
            &["g1", "g2", "b1", "b2", "b3"],
            &["b1", "b2", "b3"],
            vec![
                0.8, 0.1, 0.2, //
                -0.3, 0.0, 0.1, //
                1.0, 0.2, 0.1, //
                0.2, 1.0, 0.7, //
                0.1, 0.7, 1.0,
            ],
        );
        let clustering = Clustering::from_pairs([
            ("g1", "A"), ("g2", "A"), ("b1", "A"), ("b2", "B"), ("b3", "B"),
        ])
        .unwrap();

        let out = rank_genes(&t, &clustering, 1000).unwrap();
        assert_eq!(out.ranking.genes().collect::<Vec<_>>(), vec!["g1", "g2"]);
        assert_eq!(out.diagnostics.clusters_ranked, 2);

        let in_b: Vec<(&str, usize)> = out
            .held_out
            .iter()
            .filter(|h| h.cluster == "B")
            .map(|h| (h.bait.as_str(), h.position))
            .collect();
        assert_eq!(in_b, vec![("b2", 0), ("b3", 0)]);
        assert_eq!(out.held_out.len(), 3);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let t = table(
            &["flat", "g1", "g2", "b1", "b2"],
            &["b1", "b2"],
            vec![
                f64::NAN, f64::NAN, //
                0.9, 0.8, //
                0.1, 0.2, //
                1.0, 0.6, //
                0.6, 1.0,
            ],
        );
        let clustering = Clustering::from_pairs([
            ("flat", "A"), ("g1", "A"), ("g2", "A"), ("b1", "A"), ("b2", "A"),
        ])
        .unwrap();

        let out = rank_genes(&t, &clustering, 1000).unwrap();
        // NaN in one member poisons the cluster mean, so every z-score is NaN
        // and the stable order is the table order.
        assert!(out.ranking.iter().all(|(_, s)| s.is_nan()));
        assert_eq!(out.ranking.genes().collect::<Vec<_>>(), vec!["flat", "g1", "g2"]);
    }

    #[test]
    fn test_no_clustered_bait_is_ranking_error() {
        let t = table(&["g1", "b1"], &["b1"], vec![0.5, 1.0]);
        let clustering = Clustering::from_pairs([("g1", "A")]).unwrap();
        assert!(matches!(rank_genes(&t, &clustering, 1000), Err(MorphyxError::Ranking(_))));
    }

    #[test]
    fn test_ranking_top() {
        let ranking = Ranking::from_unsorted(vec![("a".into(), 0.1), ("b".into(), 2.0), ("c".into(), 1.0)]);
        let top = ranking.top(2);
        assert_eq!(top.genes().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(ranking.top(10).len(), 3);
        assert_eq!(ranking.score_of("c"), Some(1.0));
    }
}
