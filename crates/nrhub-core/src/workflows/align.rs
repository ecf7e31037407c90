use crate::core::io::traits::CorrespondenceStore;
use crate::core::models::ids::ExpSeqId;
use crate::engine::alignment::AlignmentPlanner;
use crate::engine::config::AlignmentConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::instrument;

/// Lists the experimental sequence pairs of `pdbs` that have no alignment
/// yet, as `(smaller, larger)` id pairs in ascending order.
#[instrument(skip_all, name = "alignment_workflow")]
pub fn run(
    store: &dyn CorrespondenceStore,
    pdbs: &[String],
    config: AlignmentConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<(ExpSeqId, ExpSeqId)>, EngineError> {
    if pdbs.is_empty() {
        return Err(EngineError::InvalidState(
            "No structures given to plan alignments for".to_string(),
        ));
    }
    reporter.report(Progress::StageStart {
        name: "Planning alignments",
    });
    let pairs = AlignmentPlanner::new(store, config).pairs(pdbs)?;
    reporter.report(Progress::StageFinish);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::TableStore;
    use crate::core::models::chain::Chain;
    use crate::core::models::ids::ChainDbId;

    #[test]
    fn plans_pairs_for_requested_structures() {
        let store = TableStore::new()
            .with_chain(Chain::new(ChainDbId(1), "1EHZ", 1, "A", 76, 30))
            .with_chain(Chain::new(ChainDbId(2), "1EVV", 1, "A", 76, 30))
            .with_sequence(ExpSeqId(1), 76)
            .with_sequence(ExpSeqId(2), 76)
            .with_sequence_chain(ExpSeqId(1), ChainDbId(1))
            .with_sequence_chain(ExpSeqId(2), ChainDbId(2));
        let pairs = run(
            &store,
            &["1EHZ".to_string()],
            AlignmentConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(
            pairs,
            vec![(ExpSeqId(1), ExpSeqId(1)), (ExpSeqId(1), ExpSeqId(2))]
        );
    }

    #[test]
    fn empty_request_is_invalid_state() {
        let store = TableStore::new();
        let result = run(&store, &[], AlignmentConfig::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::InvalidState(_))));
    }
}
