//! Clustering files: one cluster per line, `cluster<TAB>gene[<TAB>gene...]`.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use morphyx_common::{Clustering, MorphyxError, Result};

use crate::matrix::{in_file, line_of, tsv_reader};

/// Parse a tab-separated clustering. A cluster may span several lines; a gene
/// may appear in only one cluster.
pub fn parse_clustering<R: Read>(reader: R) -> Result<Clustering> {
    let mut reader = tsv_reader(reader);
    let mut clustering = Clustering::new();

    for result in reader.records() {
        let record = result?;
        let line = line_of(&record);

        let cluster = record.get(0).unwrap_or_default();
        let genes: Vec<&str> = record.iter().skip(1).filter(|g| !g.is_empty()).collect();
        if cluster.is_empty() || genes.is_empty() {
            return Err(MorphyxError::Parse(format!(
                "line {line}: expected a cluster name followed by at least one gene"
            )));
        }

        for gene in genes {
            clustering
                .assign(gene, cluster)
                .map_err(|e| MorphyxError::Parse(format!("line {line}: {e}")))?;
        }
    }

    debug!("Parsed clustering: {} genes", clustering.len());
    Ok(clustering)
}

/// Read a clustering file.
pub fn load_clustering(path: &Path) -> Result<Clustering> {
    info!("Loading clustering {:?}", path);
    let file = std::fs::File::open(path)?;
    parse_clustering(std::io::BufReader::new(file)).map_err(|e| in_file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_clusters() {
        let input = "# mcl output\n\
                     c1\tg1\tg2\tg3\n\
                     c2\tg4\n\
                     c1\tg5\n";
        let clustering = parse_clustering(input.as_bytes()).unwrap();
        assert_eq!(clustering.len(), 5);
        assert_eq!(clustering.cluster_of("g5"), Some("c1"));

        let clusters = clustering.clusters();
        assert_eq!(clusters["c1"], vec!["g1", "g2", "g3", "g5"]);
        assert_eq!(clusters["c2"], vec!["g4"]);
    }

    #[test]
    fn test_repeated_gene_in_same_cluster_is_fine() {
        let clustering = parse_clustering("c1\tg1\tg1\n".as_bytes()).unwrap();
        assert_eq!(clustering.len(), 1);
    }

    #[test]
    fn test_gene_in_two_clusters_rejected() {
        let err = parse_clustering("c1\tg1\nc2\tg1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MorphyxError::Parse(_)));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_cluster_without_genes_rejected() {
        assert!(parse_clustering("c1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_empty_clustering() {
        let clustering = parse_clustering("".as_bytes()).unwrap();
        assert!(clustering.is_empty());
    }
}
