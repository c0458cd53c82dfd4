//! morphyx-common: Shared types, errors, and configuration used across all morphyx crates.

pub mod error;
pub mod entities;
pub mod config;

// Re-export commonly used types
pub use config::{MorphConfig, RankSettings, SpeciesConfig, MatrixConfig, BaitGroupConfig};
pub use entities::{BaitGroup, Clustering, ExpressionMatrix, GeneId};
pub use error::{MorphyxError, Result};
