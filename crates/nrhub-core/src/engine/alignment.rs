use super::config::AlignmentConfig;
use super::error::EngineError;
use crate::core::io::traits::CorrespondenceStore;
use crate::core::models::correspondence::{ExpSeqInfo, SYNTHETIC_SPECIES_ID};
use crate::core::models::ids::ExpSeqId;
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Plans which experimental sequence pairs still need a sequence alignment.
pub struct AlignmentPlanner<'a> {
    store: &'a dyn CorrespondenceStore,
    config: AlignmentConfig,
}

impl<'a> AlignmentPlanner<'a> {
    pub fn new(store: &'a dyn CorrespondenceStore, config: AlignmentConfig) -> Self {
        Self { store, config }
    }

    /// Whether a sequence of length `candidate` is worth aligning to one of
    /// length `query`.
    ///
    /// Short sequences only match sequences of identical length. Longer ones
    /// match lengths within half to double of their own, never below the
    /// short cutoff, and never across the huge cutoff.
    pub fn lengths_compatible(&self, query: u32, candidate: u32) -> bool {
        let small = self.config.small_cutoff;
        if query < small {
            return candidate == query;
        }
        let lower = (0.5 * query as f64).max(small as f64);
        let upper = 2 * u64::from(query);
        let huge = self.config.huge_cutoff;
        candidate as f64 >= lower
            && u64::from(candidate) <= upper
            && (query >= huge) == (candidate >= huge)
    }

    /// Returns the normalised `(smaller, larger)` sequence pairs to align for
    /// the chains of `pdbs`, sorted, excluding pairs that already have a
    /// correspondence record in either direction.
    pub fn pairs(&self, pdbs: &[String]) -> Result<Vec<(ExpSeqId, ExpSeqId)>, EngineError> {
        let known = self.store.sequences()?;
        let by_id: HashMap<ExpSeqId, &ExpSeqInfo> =
            known.iter().map(|s| (s.exp_seq_id, s)).collect();

        let mut planned: BTreeSet<(ExpSeqId, ExpSeqId)> = BTreeSet::new();
        for pdb in pdbs.iter().unique() {
            for (exp_seq_id, species) in self.store.sequences_for_pdb(pdb)? {
                let Some(query) = by_id.get(&exp_seq_id) else {
                    warn!(pdb = %pdb, exp_seq_id = %exp_seq_id, "Sequence has no length record, skipping");
                    continue;
                };
                planned.insert((exp_seq_id, exp_seq_id));
                for candidate in &known {
                    if self.lengths_compatible(query.length, candidate.length)
                        && species_allowed(species, &candidate.species)
                    {
                        let (a, b) = (exp_seq_id, candidate.exp_seq_id);
                        planned.insert((a.min(b), a.max(b)));
                    }
                }
            }
        }

        let mut pairs = Vec::with_capacity(planned.len());
        for (a, b) in planned {
            if self.aligned(a, b)? {
                debug!(exp_seq_id_1 = %a, exp_seq_id_2 = %b, "Already aligned");
                continue;
            }
            pairs.push((a, b));
        }
        info!(structures = pdbs.len(), pairs = pairs.len(), "Planned sequence alignments");
        Ok(pairs)
    }

    fn aligned(&self, a: ExpSeqId, b: ExpSeqId) -> Result<bool, EngineError> {
        Ok(!self.store.correspondences(a, b)?.is_empty()
            || !self.store.correspondences(b, a)?.is_empty())
    }
}

/// An unknown or synthetic query species accepts anything. Otherwise some
/// chain of the candidate must be of unknown, synthetic or equal species.
fn species_allowed(query: Option<u32>, candidate: &[Option<u32>]) -> bool {
    match query {
        None | Some(SYNTHETIC_SPECIES_ID) => true,
        Some(query) => candidate
            .iter()
            .any(|s| s.is_none_or(|s| s == query || s == SYNTHETIC_SPECIES_ID)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::TableStore;
    use crate::core::models::chain::Chain;
    use crate::core::models::correspondence::CorrespondenceRecord;
    use crate::core::models::ids::{ChainDbId, CorrespondenceId};

    fn planner(store: &TableStore) -> AlignmentPlanner<'_> {
        AlignmentPlanner::new(store, AlignmentConfig::default())
    }

    #[test]
    fn short_sequences_need_identical_length() {
        let store = TableStore::new();
        let planner = planner(&store);
        assert!(planner.lengths_compatible(20, 20));
        assert!(!planner.lengths_compatible(20, 21));
        assert!(!planner.lengths_compatible(20, 36));
    }

    #[test]
    fn long_sequences_match_half_to_double() {
        let store = TableStore::new();
        let planner = planner(&store);
        assert!(planner.lengths_compatible(100, 50));
        assert!(planner.lengths_compatible(100, 200));
        assert!(!planner.lengths_compatible(100, 49));
        assert!(!planner.lengths_compatible(100, 201));
        assert!(!planner.lengths_compatible(40, 35));
        assert!(planner.lengths_compatible(40, 36));
    }

    #[test]
    fn huge_cutoff_is_never_crossed() {
        let store = TableStore::new();
        let planner = planner(&store);
        assert!(!planner.lengths_compatible(1500, 2900));
        assert!(planner.lengths_compatible(2900, 2000));
        assert!(!planner.lengths_compatible(2100, 1999));
    }

    #[test]
    fn species_rule() {
        assert!(species_allowed(None, &[]));
        assert!(species_allowed(Some(SYNTHETIC_SPECIES_ID), &[Some(562)]));
        assert!(species_allowed(Some(562), &[Some(274), None]));
        assert!(species_allowed(Some(562), &[Some(SYNTHETIC_SPECIES_ID)]));
        assert!(!species_allowed(Some(562), &[Some(274)]));
        assert!(!species_allowed(Some(562), &[]));
    }

    fn fixture() -> TableStore {
        TableStore::new()
            .with_chain(Chain::new(ChainDbId(1), "1FJG", 1, "A", 1522, 700).with_species(274))
            .with_chain(Chain::new(ChainDbId(2), "1J5E", 1, "A", 1500, 690).with_species(274))
            .with_chain(Chain::new(ChainDbId(3), "2AW4", 1, "A", 1540, 700).with_species(562))
            .with_chain(Chain::new(ChainDbId(4), "1EHZ", 1, "A", 76, 30).with_species(274))
            .with_sequence(ExpSeqId(10), 1522)
            .with_sequence(ExpSeqId(20), 1500)
            .with_sequence(ExpSeqId(30), 1540)
            .with_sequence(ExpSeqId(40), 76)
            .with_sequence_chain(ExpSeqId(10), ChainDbId(1))
            .with_sequence_chain(ExpSeqId(20), ChainDbId(2))
            .with_sequence_chain(ExpSeqId(30), ChainDbId(3))
            .with_sequence_chain(ExpSeqId(40), ChainDbId(4))
    }

    #[test]
    fn plans_compatible_pairs_including_self() {
        let store = fixture();
        let pairs = planner(&store).pairs(&["1FJG".to_string()]).unwrap();
        assert_eq!(
            pairs,
            vec![(ExpSeqId(10), ExpSeqId(10)), (ExpSeqId(10), ExpSeqId(20))]
        );
    }

    #[test]
    fn existing_alignments_are_excluded_in_either_direction() {
        let store = fixture().with_correspondence(CorrespondenceRecord {
            correspondence_id: CorrespondenceId(1),
            exp_seq_id_1: ExpSeqId(20),
            exp_seq_id_2: ExpSeqId(10),
            good_alignment: false,
        });
        let pairs = planner(&store).pairs(&["1FJG".to_string()]).unwrap();
        assert_eq!(pairs, vec![(ExpSeqId(10), ExpSeqId(10))]);
    }
}
