use super::config::SelectionConfig;
use super::error::EngineError;
use super::nr::NrGrouper;
use crate::core::io::traits::GeometryStore;
use crate::core::models::chain::Chain;
use crate::core::models::ids::ChainDbId;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info};

/// One unit of comparison work: a chain and the chains to compare it with.
pub type ComparisonBatch = (ChainDbId, Vec<ChainDbId>);

/// Enumerates the chain pairs inside each NR group that need a discrepancy.
pub struct PairSelector<'a> {
    grouper: &'a dyn NrGrouper,
    geometry: &'a dyn GeometryStore,
    config: &'a SelectionConfig,
}

impl<'a> PairSelector<'a> {
    pub fn new(
        grouper: &'a dyn NrGrouper,
        geometry: &'a dyn GeometryStore,
        config: &'a SelectionConfig,
    ) -> Self {
        Self {
            grouper,
            geometry,
            config,
        }
    }

    /// Whether a chain is usable for comparison at all: long enough, and
    /// resolved well enough when a resolution is known.
    pub fn valid_chain(&self, chain: &Chain) -> bool {
        chain.length >= self.config.min_length
            && chain
                .resolution
                .is_none_or(|r| r <= self.config.max_resolution)
    }

    /// Builds the comparison batches for `pdbs`.
    ///
    /// Every NR group contributes all unordered pairs of its usable members.
    /// Pairs are gathered by first chain, keeping the first-seen order of the
    /// second chains. A batch is kept only when its size, the first chain
    /// included, equals the configured comparison limit exactly; every other
    /// batch is logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] when grouping yields no groups.
    pub fn to_process(&self, pdbs: &[String]) -> Result<Vec<ComparisonBatch>, EngineError> {
        let groups = self.grouper.groups(pdbs)?;
        if groups.is_empty() {
            return Err(EngineError::InvalidState(
                "No NR groups found for the requested structures".to_string(),
            ));
        }

        let with_centers = self.geometry.chains_with_centers()?;
        let with_rotations = self.geometry.chains_with_rotations()?;
        let has_geometry = |chain: &Chain| {
            let key = (chain.pdb.clone(), chain.name.clone());
            with_centers.contains(&key) && with_rotations.contains(&key)
        };

        let mut pairs: Vec<(ChainDbId, ChainDbId)> = Vec::new();
        for group in &groups {
            let usable: Vec<ChainDbId> = group
                .members
                .iter()
                .filter(|c| self.valid_chain(c) && has_geometry(c))
                .map(|c| c.db_id)
                .collect();
            pairs.extend(usable.into_iter().tuple_combinations::<(_, _)>());
        }
        pairs.sort_by_key(|(first, _)| *first);

        let mut batches = Vec::new();
        let mut dropped = 0usize;
        for (first, chunk) in &pairs.into_iter().chunk_by(|(first, _)| *first) {
            let seconds: Vec<ChainDbId> = chunk.map(|(_, second)| second).unique().collect();
            if seconds.len() + 1 == self.config.comparison_limit {
                batches.push((first, seconds));
            } else {
                debug!(
                    chain_id = %first,
                    size = seconds.len() + 1,
                    limit = self.config.comparison_limit,
                    "Skipping batch outside the comparison limit"
                );
                dropped += 1;
            }
        }

        info!(
            groups = groups.len(),
            batches = batches.len(),
            dropped,
            "Selected chain pairs to compare"
        );
        Ok(batches)
    }
}

/// Collects the distinct chains referenced by a set of batches.
pub fn batch_chains(batches: &[ComparisonBatch]) -> HashSet<ChainDbId> {
    batches
        .iter()
        .flat_map(|(first, seconds)| std::iter::once(*first).chain(seconds.iter().copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::TableStore;
    use crate::engine::nr::NrGroup;
    use crate::core::models::unit::UnitId;
    use nalgebra::{Matrix3, Vector3};

    struct FixedGroups(Vec<NrGroup>);

    impl NrGrouper for FixedGroups {
        fn groups(&self, _pdbs: &[String]) -> Result<Vec<NrGroup>, EngineError> {
            Ok(self.0.clone())
        }
    }

    fn chain(id: u64, pdb: &str) -> Chain {
        Chain::new(ChainDbId(id), pdb, 1, "A", 20, 12)
    }

    fn with_geometry(store: TableStore, pdb: &str) -> TableStore {
        let unit: UnitId = format!("{pdb}|1|A|G|1").parse().unwrap();
        store.with_unit(unit, Vector3::zeros(), Matrix3::identity())
    }

    fn config(limit: usize) -> SelectionConfig {
        SelectionConfig {
            comparison_limit: limit,
            ..SelectionConfig::default()
        }
    }

    fn geometry_for(pdbs: &[&str]) -> TableStore {
        pdbs.iter()
            .fold(TableStore::new(), |store, pdb| with_geometry(store, pdb))
    }

    #[test]
    fn keeps_only_batches_matching_the_limit_exactly() {
        let grouper = FixedGroups(vec![NrGroup {
            members: vec![chain(1, "1FJG"), chain(2, "1J5E"), chain(3, "1N32")],
        }]);
        let geometry = geometry_for(&["1FJG", "1J5E", "1N32"]);
        let config = config(3);
        let selector = PairSelector::new(&grouper, &geometry, &config);
        let batches = selector.to_process(&[]).unwrap();
        assert_eq!(
            batches,
            vec![(ChainDbId(1), vec![ChainDbId(2), ChainDbId(3)])]
        );
    }

    #[test]
    fn smaller_limit_keeps_the_tail_batch_instead() {
        let grouper = FixedGroups(vec![NrGroup {
            members: vec![chain(1, "1FJG"), chain(2, "1J5E"), chain(3, "1N32")],
        }]);
        let geometry = geometry_for(&["1FJG", "1J5E", "1N32"]);
        let config = config(2);
        let selector = PairSelector::new(&grouper, &geometry, &config);
        let batches = selector.to_process(&[]).unwrap();
        assert_eq!(batches, vec![(ChainDbId(2), vec![ChainDbId(3)])]);
    }

    #[test]
    fn filters_invalid_chains_and_chains_without_geometry() {
        let grouper = FixedGroups(vec![NrGroup {
            members: vec![
                chain(1, "1FJG"),
                chain(2, "1J5E").with_resolution(5.5),
                chain(3, "1N32"),
                chain(4, "1N33"),
            ],
        }]);
        let geometry = geometry_for(&["1FJG", "1J5E", "1N32"]);
        let config = config(2);
        let selector = PairSelector::new(&grouper, &geometry, &config);
        let batches = selector.to_process(&[]).unwrap();
        assert_eq!(batches, vec![(ChainDbId(1), vec![ChainDbId(3)])]);
    }

    #[test]
    fn pairs_never_cross_groups() {
        let grouper = FixedGroups(vec![
            NrGroup {
                members: vec![chain(1, "1FJG"), chain(2, "1J5E")],
            },
            NrGroup {
                members: vec![chain(3, "2AW4"), chain(4, "2AVY")],
            },
        ]);
        let geometry = geometry_for(&["1FJG", "1J5E", "2AW4", "2AVY"]);
        let config = config(2);
        let selector = PairSelector::new(&grouper, &geometry, &config);
        let batches = selector.to_process(&[]).unwrap();
        assert_eq!(
            batches,
            vec![
                (ChainDbId(1), vec![ChainDbId(2)]),
                (ChainDbId(3), vec![ChainDbId(4)])
            ]
        );
        assert_eq!(batch_chains(&batches).len(), 4);
    }

    #[test]
    fn no_groups_is_invalid_state() {
        let grouper = FixedGroups(Vec::new());
        let geometry = TableStore::new();
        let config = SelectionConfig::default();
        let selector = PairSelector::new(&grouper, &geometry, &config);
        assert!(matches!(
            selector.to_process(&[]),
            Err(EngineError::InvalidState(_))
        ));
    }

    #[test]
    fn valid_chain_checks_length_and_known_resolution() {
        let grouper = FixedGroups(Vec::new());
        let geometry = TableStore::new();
        let config = SelectionConfig::default();
        let selector = PairSelector::new(&grouper, &geometry, &config);
        assert!(selector.valid_chain(&chain(1, "1FJG")));
        assert!(selector.valid_chain(&chain(1, "1FJG").with_resolution(4.0)));
        assert!(!selector.valid_chain(&chain(1, "1FJG").with_resolution(4.1)));
        assert!(!selector.valid_chain(&Chain::new(ChainDbId(1), "1FJG", 1, "A", 2, 0)));
    }
}
