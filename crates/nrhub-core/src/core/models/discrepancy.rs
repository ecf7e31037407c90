use super::ids::{ChainDbId, CorrespondenceId};
use serde::{Deserialize, Serialize};

/// Discrepancy recorded when the geometric comparison of a pair failed.
pub const FAILED_DISCREPANCY: f64 = -1.0;

/// A persisted chain-to-chain discrepancy row.
///
/// Rows come in pairs: the forward row and the same values with the chain and
/// model fields swapped. `discrepancy` is non-negative, or
/// [`FAILED_DISCREPANCY`] with `num_nucleotides == 0` when the comparison
/// could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyEntry {
    pub chain_id_1: ChainDbId,
    pub chain_id_2: ChainDbId,
    pub model_1: u32,
    pub model_2: u32,
    pub correspondence_id: CorrespondenceId,
    pub discrepancy: f64,
    pub num_nucleotides: u32,
}

impl DiscrepancyEntry {
    pub fn is_failed(&self) -> bool {
        self.discrepancy == FAILED_DISCREPANCY && self.num_nucleotides == 0
    }

    /// The same measurement seen from the second chain.
    pub fn reversed(&self) -> Self {
        Self {
            chain_id_1: self.chain_id_2,
            chain_id_2: self.chain_id_1,
            model_1: self.model_2,
            model_2: self.model_1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DiscrepancyEntry {
        DiscrepancyEntry {
            chain_id_1: ChainDbId(1),
            chain_id_2: ChainDbId(2),
            model_1: 1,
            model_2: 3,
            correspondence_id: CorrespondenceId(9),
            discrepancy: 0.25,
            num_nucleotides: 76,
        }
    }

    #[test]
    fn reversed_swaps_chains_and_models_only() {
        let reversed = entry().reversed();
        assert_eq!(reversed.chain_id_1, ChainDbId(2));
        assert_eq!(reversed.chain_id_2, ChainDbId(1));
        assert_eq!(reversed.model_1, 3);
        assert_eq!(reversed.model_2, 1);
        assert_eq!(reversed.discrepancy, 0.25);
        assert_eq!(reversed.num_nucleotides, 76);
        assert_eq!(reversed.reversed(), entry());
    }

    #[test]
    fn failed_rows_use_the_sentinel_pair() {
        let mut failed = entry();
        assert!(!failed.is_failed());
        failed.discrepancy = FAILED_DISCREPANCY;
        failed.num_nucleotides = 0;
        assert!(failed.is_failed());
    }
}
