//! morphyx-ingestion: Parsers for expression matrices, clusterings and gene
//! mappings, and assembly of the ranker's per-species inputs from a config.

pub mod matrix;
pub mod clustering;
pub mod gene_mapping;
pub mod loader;

pub use clustering::{load_clustering, parse_clustering};
pub use gene_mapping::GeneMapping;
pub use loader::{load_bait_groups, load_species};
pub use matrix::{load_expression_matrix, parse_expression_matrix};
