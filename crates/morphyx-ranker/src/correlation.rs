//! Correlation engine.
//!
//! Pearson correlation between every gene of an expression matrix and each
//! bait gene. Zero-variance profiles give NaN, which is kept as-is so that it
//! propagates into the per-cluster sums.

use rayon::prelude::*;

use morphyx_common::{ExpressionMatrix, GeneId, MorphyxError, Result};

/// Dense gene × bait correlation table, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationTable {
    genes: Vec<GeneId>,
    baits: Vec<GeneId>,
    values: Vec<f64>,
}

impl CorrelationTable {
    /// Build a table from row-major values (`genes.len() * baits.len()`).
    pub fn new(genes: Vec<GeneId>, baits: Vec<GeneId>, values: Vec<f64>) -> Result<Self> {
        if values.len() != genes.len() * baits.len() {
            return Err(MorphyxError::Shape(format!(
                "correlation table of {} genes x {} baits needs {} values, got {}",
                genes.len(),
                baits.len(),
                genes.len() * baits.len(),
                values.len()
            )));
        }
        Ok(Self { genes, baits, values })
    }

    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }

    pub fn baits(&self) -> &[GeneId] {
        &self.baits
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_baits(&self) -> usize {
        self.baits.len()
    }

    /// Correlations of the gene in row `row` to every bait column.
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.baits.len();
        &self.values[row * n..(row + 1) * n]
    }

    pub fn get(&self, row: usize, bait_col: usize) -> f64 {
        self.values[row * self.baits.len() + bait_col]
    }

    pub fn bait_column(&self, bait: &str) -> Option<usize> {
        self.baits.iter().position(|b| b == bait)
    }

    /// Restrict the table to a subset of its bait columns, in the given order.
    pub fn select_baits(&self, baits: &[GeneId]) -> Result<Self> {
        let columns = baits
            .iter()
            .map(|b| {
                self.bait_column(b).ok_or_else(|| {
                    MorphyxError::Shape(format!("bait '{b}' is not a column of the correlation table"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let values = (0..self.n_genes())
            .flat_map(|row| columns.iter().map(move |&col| (row, col)))
            .map(|(row, col)| self.get(row, col))
            .collect();

        Ok(Self {
            genes: self.genes.clone(),
            baits: baits.to_vec(),
            values,
        })
    }
}

/// Mean-centred profile and its Euclidean norm.
struct Centred {
    deviations: Vec<f64>,
    norm: f64,
}

impl Centred {
    fn new(profile: &[f64]) -> Self {
        let mean = profile.iter().sum::<f64>() / profile.len() as f64;
        let deviations: Vec<f64> = profile.iter().map(|x| x - mean).collect();
        let norm = deviations.iter().map(|d| d * d).sum::<f64>().sqrt();
        Self { deviations, norm }
    }

    /// NaN when either side has zero variance (0 / 0).
    fn pearson(&self, other: &Centred) -> f64 {
        let cov: f64 = self
            .deviations
            .iter()
            .zip(&other.deviations)
            .map(|(a, b)| a * b)
            .sum();
        cov / (self.norm * other.norm)
    }
}

/// Pearson correlation between two equally long profiles.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    Centred::new(x).pearson(&Centred::new(y))
}

/// Correlate every gene of `matrix` to each of `baits`.
///
/// `baits` must already be restricted to rows of the matrix; an unknown bait
/// is a shape error.
pub fn compute_correlations(matrix: &ExpressionMatrix, baits: &[GeneId]) -> Result<CorrelationTable> {
    let bait_rows = baits
        .iter()
        .map(|b| {
            matrix.index_of(b).ok_or_else(|| {
                MorphyxError::Shape(format!("bait '{b}' is not a row of the expression matrix"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let centred: Vec<Centred> = (0..matrix.n_genes())
        .into_par_iter()
        .map(|i| Centred::new(matrix.row(i)))
        .collect();

    let rows: Vec<Vec<f64>> = centred
        .par_iter()
        .map(|gene| bait_rows.iter().map(|&b| gene.pearson(&centred[b])).collect())
        .collect();

    CorrelationTable::new(matrix.genes().to_vec(), baits.to_vec(), rows.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ExpressionMatrix {
        ExpressionMatrix::new(
            vec!["up".into(), "down".into(), "flat".into(), "bait".into()],
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            vec![
                vec![1.0, 2.0, 3.0, 4.0],
                vec![8.0, 6.0, 4.0, 2.0],
                vec![5.0, 5.0, 5.0, 5.0],
                vec![2.0, 4.0, 6.0, 8.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pearson_perfect_correlations() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        // r = 0.8 for this textbook pair
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]);
        assert!((r - 0.8).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn test_zero_variance_is_nan_not_zero() {
        assert!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_table_layout() {
        let table = compute_correlations(&matrix(), &["bait".to_string()]).unwrap();
        assert_eq!(table.n_genes(), 4);
        assert_eq!(table.n_baits(), 1);
        assert!((table.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((table.get(1, 0) + 1.0).abs() < 1e-12);
        assert!(table.get(2, 0).is_nan());
        assert!((table.get(3, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_bait_is_shape_error() {
        let err = compute_correlations(&matrix(), &["nope".to_string()]);
        assert!(matches!(err, Err(MorphyxError::Shape(_))));
    }

    #[test]
    fn test_no_baits_gives_zero_columns() {
        let table = compute_correlations(&matrix(), &[]).unwrap();
        assert_eq!(table.n_genes(), 4);
        assert_eq!(table.n_baits(), 0);
    }

    #[test]
    fn test_select_baits_reorders_columns() {
        let baits = vec!["up".to_string(), "bait".to_string()];
        let table = compute_correlations(&matrix(), &baits).unwrap();
        let sub = table.select_baits(&["bait".to_string()]).unwrap();
        assert_eq!(sub.baits(), &["bait".to_string()]);
        assert_eq!(sub.row(1), &[table.get(1, 1)]);
        assert!(table.select_baits(&["flat".to_string()]).is_err());
    }
}
