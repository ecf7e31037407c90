use super::error::EngineError;
use crate::core::io::traits::CorrespondenceStore;
use crate::core::models::ids::{ChainDbId, CorrespondenceId};
use tracing::{debug, warn};

/// A good correspondence usable for a chain pair.
///
/// `reversed` is set when the record aligns the second chain's sequence to
/// the first chain's, so its aligned unit rows list the second chain first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairAlignment {
    pub id: CorrespondenceId,
    pub reversed: bool,
}

impl PairAlignment {
    pub fn forward(id: CorrespondenceId) -> Self {
        Self {
            id,
            reversed: false,
        }
    }

    pub fn reverse(id: CorrespondenceId) -> Self {
        Self { id, reversed: true }
    }
}

/// Finds the good sequence alignment, if any, between two chains.
///
/// Correspondence records are directional, but a good alignment in either
/// direction makes the pair comparable.
pub struct CorrespondenceResolver<'a> {
    store: &'a dyn CorrespondenceStore,
}

impl<'a> CorrespondenceResolver<'a> {
    pub fn new(store: &'a dyn CorrespondenceStore) -> Self {
        Self { store }
    }

    /// The first good correspondence aligning a sequence of `chain_1` to a
    /// sequence of `chain_2`, in that direction only.
    pub fn directed(
        &self,
        chain_1: ChainDbId,
        chain_2: ChainDbId,
    ) -> Result<Option<CorrespondenceId>, EngineError> {
        let sequences_2 = self.store.sequence_ids(chain_2)?;
        for seq_1 in self.store.sequence_ids(chain_1)? {
            for &seq_2 in &sequences_2 {
                let good = self
                    .store
                    .correspondences(seq_1, seq_2)?
                    .into_iter()
                    .find(|r| r.good_alignment);
                if let Some(record) = good {
                    return Ok(Some(record.correspondence_id));
                }
            }
        }
        Ok(None)
    }

    /// Like [`CorrespondenceResolver::corr_id`] but silent when nothing is
    /// found.
    pub fn between(
        &self,
        chain_1: ChainDbId,
        chain_2: ChainDbId,
    ) -> Result<Option<PairAlignment>, EngineError> {
        if let Some(id) = self.directed(chain_1, chain_2)? {
            return Ok(Some(PairAlignment::forward(id)));
        }
        Ok(self.directed(chain_2, chain_1)?.map(PairAlignment::reverse))
    }

    /// Returns the correspondence to align `chain_1` and `chain_2` with,
    /// trying the given direction first and then the reverse.
    ///
    /// `None` means the pair cannot be compared on this run; it is logged and
    /// left to the caller to skip.
    pub fn corr_id(
        &self,
        chain_1: ChainDbId,
        chain_2: ChainDbId,
    ) -> Result<Option<PairAlignment>, EngineError> {
        let found = self.between(chain_1, chain_2)?;
        match found {
            Some(found) => debug!(
                %chain_1,
                %chain_2,
                correspondence_id = %found.id,
                reversed = found.reversed,
                "Found correspondence"
            ),
            None => warn!(%chain_1, %chain_2, "No good correspondence between chains"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::TableStore;
    use crate::core::models::correspondence::CorrespondenceRecord;
    use crate::core::models::ids::ExpSeqId;

    fn record(id: u64, seq_1: u64, seq_2: u64, good: bool) -> CorrespondenceRecord {
        CorrespondenceRecord {
            correspondence_id: CorrespondenceId(id),
            exp_seq_id_1: ExpSeqId(seq_1),
            exp_seq_id_2: ExpSeqId(seq_2),
            good_alignment: good,
        }
    }

    fn store() -> TableStore {
        TableStore::new()
            .with_sequence_chain(ExpSeqId(10), ChainDbId(1))
            .with_sequence_chain(ExpSeqId(20), ChainDbId(2))
            .with_sequence_chain(ExpSeqId(30), ChainDbId(3))
            .with_correspondence(record(100, 10, 20, true))
            .with_correspondence(record(200, 10, 30, false))
    }

    #[test]
    fn finds_forward_direction() {
        let store = store();
        let resolver = CorrespondenceResolver::new(&store);
        assert_eq!(
            resolver.corr_id(ChainDbId(1), ChainDbId(2)).unwrap(),
            Some(PairAlignment::forward(CorrespondenceId(100)))
        );
    }

    #[test]
    fn falls_back_to_reverse_direction() {
        let store = store();
        let resolver = CorrespondenceResolver::new(&store);
        assert_eq!(resolver.directed(ChainDbId(2), ChainDbId(1)).unwrap(), None);
        assert_eq!(
            resolver.corr_id(ChainDbId(2), ChainDbId(1)).unwrap(),
            Some(PairAlignment::reverse(CorrespondenceId(100)))
        );
    }

    #[test]
    fn ignores_bad_alignments() {
        let store = store();
        let resolver = CorrespondenceResolver::new(&store);
        assert_eq!(resolver.corr_id(ChainDbId(1), ChainDbId(3)).unwrap(), None);
    }

    #[test]
    fn unmapped_chain_has_no_correspondence() {
        let store = store();
        let resolver = CorrespondenceResolver::new(&store);
        assert_eq!(resolver.corr_id(ChainDbId(1), ChainDbId(99)).unwrap(), None);
    }
}
