//! Fixtures shared by the morphyx test suites.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use morphyx_common::{BaitGroup, Clustering, ExpressionMatrix, GeneId};

pub use pretty_assertions;

/// Thirteen genes (candidates g1..g10, baits b1..b3) over samples s1..s5.
pub fn scenario_matrix() -> ExpressionMatrix {
    let rows: Vec<(&str, [f64; 5])> = vec![
        ("g1", [1.0, 2.0, 3.0, 5.0, 5.0]),
        ("g2", [5.0, 4.0, 3.0, 2.0, 1.0]),
        ("g3", [1.0, 3.0, 2.0, 4.0, 3.0]),
        ("g4", [3.0, 1.0, 4.0, 2.0, 5.0]),
        ("g5", [1.0, 5.0, 2.0, 4.0, 1.0]),
        ("g6", [2.0, 3.0, 1.0, 4.0, 2.0]),
        ("g7", [7.0, 1.0, 3.0, 3.0, 2.0]),
        ("g8", [4.0, 4.0, 1.0, 0.0, 2.0]),
        ("g9", [0.5, 1.5, 0.5, 2.5, 9.0]),
        ("g10", [6.0, 2.0, 8.0, 1.0, 3.0]),
        ("b1", [1.0, 2.0, 3.0, 4.0, 5.0]),
        ("b2", [2.0, 3.0, 4.0, 5.0, 7.0]),
        ("b3", [3.0, 1.0, 4.0, 1.0, 5.0]),
    ];
    matrix_from_rows(&rows)
}

/// A: g1 g2 g3 b1 b2, B: g4 g5 b3, C: g6..g10 (no baits).
pub fn scenario_clustering() -> Clustering {
    let mut pairs: Vec<(String, &str)> = ["g1", "g2", "g3", "b1", "b2"]
        .iter()
        .map(|g| (g.to_string(), "A"))
        .collect();
    pairs.extend(["g4", "g5", "b3"].iter().map(|g| (g.to_string(), "B")));
    pairs.extend((6..=10).map(|i| (format!("g{i}"), "C")));
    Clustering::from_pairs(pairs).expect("scenario clustering is a partition")
}

pub fn scenario_bait_group() -> BaitGroup {
    BaitGroup::new("1", "scenario pathway", ["b1", "b2", "b3"])
}

/// Build a matrix from (gene, profile) rows; samples are named s1, s2, ...
pub fn matrix_from_rows<const N: usize>(rows: &[(&str, [f64; N])]) -> ExpressionMatrix {
    let genes: Vec<GeneId> = rows.iter().map(|(g, _)| g.to_string()).collect();
    let samples: Vec<String> = (1..=N).map(|i| format!("s{i}")).collect();
    let values: Vec<Vec<f64>> = rows.iter().map(|(_, v)| v.to_vec()).collect();
    ExpressionMatrix::new(genes, samples, values).expect("fixture matrix is well formed")
}

/// Seeded random matrix with genes gene0, gene1, ...
pub fn random_matrix(n_genes: usize, n_samples: usize, seed: u64) -> ExpressionMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let genes: Vec<GeneId> = (0..n_genes).map(|i| format!("gene{i}")).collect();
    let samples: Vec<String> = (0..n_samples).map(|i| format!("sample{i}")).collect();
    let values: Vec<Vec<f64>> = (0..n_genes)
        .map(|_| (0..n_samples).map(|_| rng.gen_range(0.0..100.0)).collect())
        .collect();
    ExpressionMatrix::new(genes, samples, values).expect("random matrix is well formed")
}

/// Seeded random assignment of every matrix gene to one of `n_clusters` clusters.
pub fn random_clustering(matrix: &ExpressionMatrix, n_clusters: usize, seed: u64) -> Clustering {
    let mut rng = StdRng::seed_from_u64(seed);
    let pairs: Vec<(GeneId, String)> = matrix
        .genes()
        .iter()
        .map(|g| (g.clone(), format!("cluster{}", rng.gen_range(0..n_clusters))))
        .collect();
    Clustering::from_pairs(pairs).expect("random clustering is a partition")
}

/// Render a matrix in the tab-separated file format.
pub fn matrix_to_tsv(matrix: &ExpressionMatrix) -> String {
    let mut out = format!("gene\t{}\n", matrix.samples().join("\t"));
    for (i, gene) in matrix.genes().iter().enumerate() {
        let values: Vec<String> = matrix.row(i).iter().map(f64::to_string).collect();
        out.push_str(&format!("{gene}\t{}\n", values.join("\t")));
    }
    out
}

/// Render a clustering in the tab-separated file format, one line per cluster.
pub fn clustering_to_tsv(clustering: &Clustering) -> String {
    clustering
        .clusters()
        .iter()
        .map(|(label, members)| format!("{label}\t{}\n", members.join("\t")))
        .collect()
}

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}
