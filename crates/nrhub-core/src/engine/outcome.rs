use super::error::EngineError;
use crate::core::models::discrepancy::DiscrepancyEntry;
use crate::core::models::ids::ChainDbId;
use std::fmt;

/// Why a pair produced no rows. Skipped pairs are not recorded anywhere and
/// are tried again on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No good correspondence in either direction.
    NoCorrespondence,
    /// One chain lacks center or rotation records for its resolved pose.
    MissingGeometry { chain_id: ChainDbId },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCorrespondence => f.write_str("no good correspondence"),
            SkipReason::MissingGeometry { chain_id } => {
                write!(f, "missing geometry for chain {chain_id}")
            }
        }
    }
}

/// Result of comparing one chain pair.
#[derive(Debug)]
pub enum PairOutcome {
    /// The forward and reversed rows. A degenerate comparison still lands
    /// here, carrying the `(-1, 0)` sentinel.
    Computed([DiscrepancyEntry; 2]),
    Skipped {
        chain_id_1: ChainDbId,
        chain_id_2: ChainDbId,
        reason: SkipReason,
    },
    Failed {
        chain_id_1: ChainDbId,
        chain_id_2: ChainDbId,
        error: EngineError,
    },
}

impl PairOutcome {
    pub fn pair(&self) -> (ChainDbId, ChainDbId) {
        match self {
            PairOutcome::Computed([forward, _]) => (forward.chain_id_1, forward.chain_id_2),
            PairOutcome::Skipped {
                chain_id_1,
                chain_id_2,
                ..
            }
            | PairOutcome::Failed {
                chain_id_1,
                chain_id_2,
                ..
            } => (*chain_id_1, *chain_id_2),
        }
    }

    pub fn entries(&self) -> &[DiscrepancyEntry] {
        match self {
            PairOutcome::Computed(entries) => entries,
            _ => &[],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, PairOutcome::Computed([forward, _]) if forward.is_failed())
    }
}
