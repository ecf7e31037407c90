use crate::core::models::chain::Chain;
use crate::core::models::correspondence::{
    AlignedChain, CorrespondenceRecord, ExpSeqInfo, UnitCorrespondence,
};
use crate::core::models::discrepancy::DiscrepancyEntry;
use crate::core::models::ids::{ChainDbId, CorrespondenceId, ExpSeqId};
use crate::core::models::info::IfeMembership;
use crate::core::models::interactions::InteractionMatrix;
use crate::core::models::unit::{ParseUnitIdError, UnitGeometry, UnitPose};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Malformed unit id in '{path}': {source}")]
    MalformedUnitId {
        path: String,
        source: ParseUnitIdError,
    },
    #[error("The discrepancy table lock was poisoned")]
    Poisoned,
}

/// Exact-match filter used to check for recorded unit geometry of one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryQuery<'a> {
    pub pdb: &'a str,
    pub chain: &'a str,
    pub model: u32,
    pub sym_op: &'a str,
}

/// Supplies the chains of a structure and the interaction counts between them.
pub trait StructureSource: Sync {
    /// Returns the chains of `pdb` in the provider's order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn chains(&self, pdb: &str) -> Result<Vec<Chain>, StoreError>;

    /// Returns the interaction counts between the chains of `pdb`, keyed by
    /// chain name. A structure without recorded interactions yields an empty
    /// matrix.
    fn interactions(&self, pdb: &str) -> Result<InteractionMatrix, StoreError>;
}

/// Supplies the metadata needed to resolve a chain for comparison.
pub trait ChainInfoSource: Sync {
    /// Returns one row per new-style IFE the chain belongs to.
    fn ife_memberships(&self, chain_id: ChainDbId) -> Result<Vec<IfeMembership>, StoreError>;

    /// Returns the distinct symmetry operator and alternate id combinations of
    /// the chain's units that have both a center and a rotation recorded.
    fn observed_poses(&self, chain_id: ChainDbId) -> Result<Vec<UnitPose>, StoreError>;
}

/// Per-unit center and rotation records.
pub trait GeometryStore: Sync {
    fn has_centers(&self, query: &GeometryQuery<'_>) -> Result<bool, StoreError>;

    fn has_rotations(&self, query: &GeometryQuery<'_>) -> Result<bool, StoreError>;

    /// Every `(pdb, chain)` with at least one unit center.
    fn chains_with_centers(&self) -> Result<HashSet<(String, String)>, StoreError>;

    /// Every `(pdb, chain)` with at least one unit rotation.
    fn chains_with_rotations(&self) -> Result<HashSet<(String, String)>, StoreError>;

    /// Returns the units of one chain, all models included, that have both a
    /// center and a rotation. Filtering by model, alternate id and symmetry
    /// operator is left to the caller.
    fn chain_units(&self, pdb: &str, chain: &str) -> Result<Vec<UnitGeometry>, StoreError>;
}

/// Experimental sequences and the alignments between them.
pub trait CorrespondenceStore: Sync {
    /// Returns the experimental sequences a chain maps to.
    fn sequence_ids(&self, chain_id: ChainDbId) -> Result<Vec<ExpSeqId>, StoreError>;

    /// Returns the correspondence records aligning `exp_seq_1` to `exp_seq_2`,
    /// in that direction only, good or not.
    fn correspondences(
        &self,
        exp_seq_1: ExpSeqId,
        exp_seq_2: ExpSeqId,
    ) -> Result<Vec<CorrespondenceRecord>, StoreError>;

    /// Returns the aligned unit pairs of a correspondence whose first unit
    /// belongs to `first` and second unit to `second`, ordered by alignment
    /// index.
    fn aligned_units(
        &self,
        correspondence_id: CorrespondenceId,
        first: &AlignedChain,
        second: &AlignedChain,
    ) -> Result<Vec<UnitCorrespondence>, StoreError>;

    /// Returns every known experimental sequence with the species of the
    /// chains mapped to it.
    fn sequences(&self) -> Result<Vec<ExpSeqInfo>, StoreError>;

    /// Returns the distinct `(sequence, species)` combinations of the chains
    /// of `pdb`.
    fn sequences_for_pdb(&self, pdb: &str) -> Result<Vec<(ExpSeqId, Option<u32>)>, StoreError>;
}

/// Persistent store of computed discrepancies.
///
/// The existence check and the insert are separate calls. Nothing locks the
/// pair between them, so two runs racing on the same store may both compute
/// and insert one pair.
pub trait DiscrepancySink: Sync {
    /// Returns the stored `(chain_id_1, chain_id_2)` pairs that pair `chain`
    /// with any of `candidates`, in either order.
    fn known_pairs(
        &self,
        chain: ChainDbId,
        candidates: &[ChainDbId],
    ) -> Result<Vec<(ChainDbId, ChainDbId)>, StoreError>;

    fn insert(&self, entries: &[DiscrepancyEntry]) -> Result<(), StoreError>;
}
