//! morphyx-ranker: Bait-guided candidate gene ranking.
//!
//! Correlates genes to bait genes, scores them per cluster, and measures the
//! quality of each ranking by leave-one-out cross-validation (AUSR).

pub mod correlation;
pub mod normalise;
pub mod scorer;
pub mod ausr;
pub mod observer;
pub mod pipeline;

pub use correlation::{compute_correlations, CorrelationTable};
pub use observer::{RankObserver, TracingObserver};
pub use pipeline::{run_morph, MorphResult, SkipReason, SpeciesData, MatrixData, ClusteringData};
pub use scorer::{finalise_cluster, rank_genes, RankOutcome, Ranking};
