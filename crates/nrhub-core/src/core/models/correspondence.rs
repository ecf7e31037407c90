use super::ids::{CorrespondenceId, ExpSeqId};

/// Taxon id of synthetic constructs, compatible with every species.
///
/// This is the NCBI "synthetic construct" taxon. Data keyed by the
/// transposed 32360 is not treated as synthetic.
pub const SYNTHETIC_SPECIES_ID: u32 = 32630;

/// A directed alignment between two experimental sequences. Only records with
/// `good_alignment` set may be used to compare chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrespondenceRecord {
    pub correspondence_id: CorrespondenceId,
    pub exp_seq_id_1: ExpSeqId,
    pub exp_seq_id_2: ExpSeqId,
    pub good_alignment: bool,
}

/// One aligned position of a correspondence: the unit of the first sequence's
/// chain matched to the unit of the second.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitCorrespondence {
    pub correspondence_id: CorrespondenceId,
    pub index: u32,
    pub unit_id_1: String,
    pub unit_id_2: String,
}

/// Which chain of a correspondence the aligned units are requested for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlignedChain {
    pub pdb: String,
    pub chain_name: String,
}

impl AlignedChain {
    pub fn new(pdb: impl Into<String>, chain_name: impl Into<String>) -> Self {
        Self {
            pdb: pdb.into(),
            chain_name: chain_name.into(),
        }
    }
}

/// An experimental sequence with the species of the chains mapped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpSeqInfo {
    pub exp_seq_id: ExpSeqId,
    pub length: u32,
    pub species: Vec<Option<u32>>,
}

/// Whether two species annotations may share an NR class: equal, either
/// unknown, or either synthetic.
pub fn species_compatible(a: Option<u32>, b: Option<u32>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b || a == SYNTHETIC_SPECIES_ID || b == SYNTHETIC_SPECIES_ID,
        _ => true,
    }
}
