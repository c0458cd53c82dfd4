//! Output files of a run.
//!
//! ```text
//! <output>/rankings/<bait group id>.txt   best ranking per bait group
//! <output>/overview.txt                   best AUSR of every bait group
//! <output>/results.json                   every combination, skipped ones included
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use morphyx_ranker::{MorphResult, Ranking};

use crate::stats::Summary;

const NA: &str = "NA";

/// Results grouped by bait group id, each group in evaluation order.
pub fn group_by_bait_group(results: &[MorphResult]) -> BTreeMap<&str, Vec<&MorphResult>> {
    let mut groups: BTreeMap<&str, Vec<&MorphResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.bait_group_id.as_str()).or_default().push(result);
    }
    groups
}

/// Highest-AUSR result of a group; the first one on ties. `None` when every
/// combination was skipped.
pub fn best_result<'a>(group: &[&'a MorphResult]) -> Option<&'a MorphResult> {
    let mut best: Option<(&MorphResult, f64)> = None;
    for result in group {
        let Some(ausr) = result.ausr else { continue };
        match best {
            Some((_, best_ausr)) if ausr <= best_ausr => {}
            _ => best = Some((result, ausr)),
        }
    }
    best.map(|(result, _)| result)
}

fn join_genes<'a>(genes: impl IntoIterator<Item = &'a String>) -> String {
    genes.into_iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Candidates table, best first.
fn render_candidates(ranking: &Ranking) -> String {
    let rows: Vec<String> = ranking
        .iter()
        .enumerate()
        .map(|(i, (gene, score))| format!("{}\t{gene}\t{score}", i + 1))
        .collect();
    format!("rank\tgene\tscore\n{}", rows.join("\n"))
}

/// Report of one bait group's best ranking.
pub fn render_ranking_report(group: &[&MorphResult]) -> String {
    let Some(first) = group.first() else {
        return String::new();
    };

    let (shown, ausr, matrix, clustering, stats, candidates) = match best_result(group) {
        Some(best) => {
            let ausrs: Vec<f64> = group.iter().filter_map(|r| r.ausr).collect();
            (
                best,
                best.ausr.map_or_else(|| NA.to_string(), |a| a.to_string()),
                best.matrix_name.as_str(),
                best.clustering_name.as_str(),
                Summary::describe(&ausrs).map_or_else(|| NA.to_string(), |s| s.to_string()),
                best.ranking.as_ref().map_or_else(|| NA.to_string(), render_candidates),
            )
        }
        None => (*first, NA.to_string(), NA, NA, NA.to_string(), NA.to_string()),
    };

    format!(
        "AUSR: {ausr}\n\
         Bait group: {name}\n\
         Expression matrix used: {matrix}\n\
         Clustering used: {clustering}\n\
         Baits present in both ({n_present}): {present}\n\
         Baits missing ({n_missing}): {missing}\n\
         \n\
         Statistics of AUSRs of other rankings of same bait group:\n\
         {stats}\n\
         \n\
         Candidates:\n\
         {candidates}\n",
        name = shown.bait_group_name,
        n_present = shown.present_baits.len(),
        present = join_genes(&shown.present_baits),
        n_missing = shown.missing_baits.len(),
        missing = join_genes(&shown.missing_baits),
    )
}

/// Best AUSR of every bait group, best first. Groups without any AUSR come
/// last, in id order, and are left out of the statistics.
pub fn render_overview(results: &[MorphResult]) -> String {
    let groups = group_by_bait_group(results);
    let mut best: Vec<(&str, Option<f64>)> = groups
        .iter()
        .map(|(id, group)| (*id, best_result(group).and_then(|r| r.ausr)))
        .collect();
    best.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let ausrs: Vec<f64> = best.iter().filter_map(|(_, a)| *a).collect();
    let stats = Summary::describe(&ausrs).map_or_else(|| NA.to_string(), |s| s.to_string());
    let list: Vec<String> = best
        .iter()
        .map(|(id, ausr)| match ausr {
            Some(a) => format!("{id}\t{a}"),
            None => format!("{id}\t{NA}"),
        })
        .collect();

    format!(
        "Statistics of best AUSRs:\n{stats}\n\nList of best AUSRs:\n{}\n",
        list.join("\n")
    )
}

/// Write every report into `output_dir`, creating directories as needed.
pub fn write_reports(output_dir: &Path, results: &[MorphResult]) -> anyhow::Result<()> {
    let rankings_dir = output_dir.join("rankings");
    std::fs::create_dir_all(&rankings_dir)
        .with_context(|| format!("creating {}", rankings_dir.display()))?;

    for (id, group) in group_by_bait_group(results) {
        let path = rankings_dir.join(format!("{id}.txt"));
        info!("Writing result to {}", path.display());
        std::fs::write(&path, render_ranking_report(&group))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let overview = output_dir.join("overview.txt");
    info!("Writing overview of results to {}", overview.display());
    std::fs::write(&overview, render_overview(results))
        .with_context(|| format!("writing {}", overview.display()))?;

    let json_path = output_dir.join("results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    Ok(())
}
