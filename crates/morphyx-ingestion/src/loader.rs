//! Materialise the configured inputs of every species.

use std::collections::BTreeMap;

use tracing::{debug, info};

use morphyx_common::{BaitGroup, BaitGroupConfig, MorphConfig, Result, SpeciesConfig};
use morphyx_ranker::{ClusteringData, MatrixData, SpeciesData};

use crate::clustering::load_clustering;
use crate::gene_mapping::GeneMapping;
use crate::matrix::load_expression_matrix;

/// Load every species that has at least one bait group.
///
/// Species without bait groups are not read from disk.
pub fn load_species(config: &MorphConfig) -> Result<Vec<SpeciesData>> {
    let mut loaded = Vec::new();
    for (name, species) in &config.species {
        let Some(groups) = config.bait_groups.get(name).filter(|g| !g.is_empty()) else {
            debug!("Species '{}' has no bait groups, not loading its data", name);
            continue;
        };
        loaded.push(load_one_species(name, species, groups)?);
    }
    Ok(loaded)
}

fn load_one_species(
    name: &str,
    species: &SpeciesConfig,
    groups: &BTreeMap<String, BaitGroupConfig>,
) -> Result<SpeciesData> {
    info!("Loading species '{}'", name);

    let mapping = match &species.gene_mapping {
        Some(path) => GeneMapping::load(path)?,
        None => GeneMapping::default(),
    };
    let bait_groups = load_bait_groups(groups, &mapping);

    let mut matrices = Vec::with_capacity(species.expression_matrices.len());
    for (matrix_name, matrix_config) in &species.expression_matrices {
        let matrix = load_expression_matrix(&matrix_config.path)?;
        let clusterings = matrix_config
            .clusterings
            .iter()
            .map(|(clustering_name, path)| {
                Ok(ClusteringData {
                    name: clustering_name.clone(),
                    clustering: load_clustering(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            "'{}': {} genes, {} samples, {} clusterings",
            matrix_name,
            matrix.n_genes(),
            matrix.n_samples(),
            clusterings.len()
        );
        matrices.push(MatrixData {
            name: matrix_name.clone(),
            matrix,
            clusterings,
        });
    }

    Ok(SpeciesData {
        name: name.to_string(),
        matrices,
        bait_groups,
    })
}

/// Bait groups in id order, with gene names mapped.
pub fn load_bait_groups(
    groups: &BTreeMap<String, BaitGroupConfig>,
    mapping: &GeneMapping,
) -> Vec<BaitGroup> {
    groups
        .iter()
        .map(|(id, group)| mapping.map_group(&group.to_bait_group(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bait_groups_maps_names() {
        let mapping = GeneMapping::from_yaml_str("CHS: [AT5G13930]\nTT4: [AT5G13930]\n").unwrap();
        let mut groups = BTreeMap::new();
        groups.insert(
            "2".to_string(),
            BaitGroupConfig { name: "Anthocyanin".into(), genes: vec!["CHS".into(), "TT4".into(), "DFR".into()] },
        );
        groups.insert(
            "1".to_string(),
            BaitGroupConfig { name: "Flavonol".into(), genes: vec!["FLS1".into()] },
        );

        let loaded = load_bait_groups(&groups, &mapping);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "1");
        assert_eq!(loaded[1].name, "Anthocyanin");
        assert_eq!(loaded[1].len(), 2);
        assert!(loaded[1].genes.contains("AT5G13930"));
        assert!(loaded[1].genes.contains("DFR"));
    }
}
