use crate::core::geometry::discrepancy::GeometryEngine;
use crate::core::io::traits::{
    ChainInfoSource, CorrespondenceStore, DiscrepancySink, GeometryStore, StructureSource,
};
use crate::engine::config::ComparisonConfig;
use crate::engine::discrepancy::{ComparisonSources, DiscrepancyComputer};
use crate::engine::error::EngineError;
use crate::engine::grouping::IfeGrouper;
use crate::engine::nr::SequenceGrouper;
use crate::engine::outcome::PairOutcome;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selection::{PairSelector, batch_chains};
use tracing::{error, info, instrument, warn};

/// Tally of one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub batches: usize,
    /// Batches abandoned because their first chain could not be resolved.
    pub failed_batches: usize,
    pub computed: usize,
    /// Computed pairs carrying the `(-1, 0)` sentinel, counted in `computed`.
    pub sentinel: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows_written: usize,
}

impl ComparisonSummary {
    pub fn record(&mut self, outcome: &PairOutcome) {
        match outcome {
            PairOutcome::Computed(_) => {
                self.computed += 1;
                if outcome.is_sentinel() {
                    self.sentinel += 1;
                }
            }
            PairOutcome::Skipped { .. } => self.skipped += 1,
            PairOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.failed_batches > 0
    }
}

/// Selects the chain pairs of `pdbs` that need a discrepancy, computes them
/// and inserts the resulting rows into `store`.
///
/// Rows are inserted pair by pair, right after each computation.
///
/// # Errors
///
/// Fails when pair selection fails or the store rejects an insert. Per-pair
/// and per-batch problems are only counted in the summary.
#[instrument(skip_all, name = "comparison_workflow")]
pub fn run<S>(
    store: &S,
    pdbs: &[String],
    config: &ComparisonConfig,
    engine: &dyn GeometryEngine,
    reporter: &ProgressReporter,
) -> Result<ComparisonSummary, EngineError>
where
    S: StructureSource + ChainInfoSource + GeometryStore + CorrespondenceStore + DiscrepancySink,
{
    reporter.report(Progress::StageStart {
        name: "Selecting pairs",
    });
    let grouper = SequenceGrouper::new(store, store, IfeGrouper::new(config.grouping.clone()));
    let selector = PairSelector::new(&grouper, store, &config.selection);
    let batches = selector.to_process(pdbs)?;
    reporter.report(Progress::StageFinish);
    info!(
        batches = batches.len(),
        chains = batch_chains(&batches).len(),
        "Pair selection complete"
    );

    reporter.report(Progress::StageStart {
        name: "Comparing chains",
    });
    reporter.report(Progress::BatchStart {
        total: batches.len() as u64,
    });

    let computer = DiscrepancyComputer::new(
        ComparisonSources::uniform(store),
        engine,
        &config.discrepancy,
    );
    let mut summary = ComparisonSummary {
        batches: batches.len(),
        ..ComparisonSummary::default()
    };

    for (chain, candidates) in &batches {
        let outcomes = match computer.data(*chain, candidates) {
            Ok(outcomes) => outcomes,
            Err(err) => {
                error!(chain_id = %chain, error = %err, "Could not prepare comparisons");
                reporter.report(Progress::Message(format!("chain {chain}: {err}")));
                summary.failed_batches += 1;
                reporter.report(Progress::ItemDone);
                continue;
            }
        };
        for outcome in outcomes {
            summary.record(&outcome);
            match &outcome {
                PairOutcome::Skipped {
                    chain_id_1,
                    chain_id_2,
                    reason,
                } => warn!(%chain_id_1, %chain_id_2, %reason, "Skipped pair"),
                PairOutcome::Failed {
                    chain_id_1,
                    chain_id_2,
                    error,
                } => reporter.report(Progress::Message(format!(
                    "pair ({chain_id_1}, {chain_id_2}): {error}"
                ))),
                PairOutcome::Computed(_) => {}
            }
            let rows = outcome.entries();
            if !rows.is_empty() {
                store.insert(rows)?;
                summary.rows_written += rows.len();
            }
        }
        reporter.report(Progress::ItemDone);
    }

    reporter.report(Progress::BatchFinish);
    reporter.report(Progress::StageFinish);
    info!(
        computed = summary.computed,
        sentinel = summary.sentinel,
        skipped = summary.skipped,
        failed = summary.failed,
        rows = summary.rows_written,
        "Comparison complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::discrepancy::MatrixDiscrepancy;
    use crate::core::io::tables::TableStore;
    use crate::core::models::chain::Chain;
    use crate::core::models::correspondence::{CorrespondenceRecord, UnitCorrespondence};
    use crate::core::models::ids::{ChainDbId, CorrespondenceId, ExpSeqId};
    use crate::core::models::unit::UnitId;
    use crate::engine::config::SelectionConfig;
    use nalgebra::{Matrix3, Vector3};

    const CORR: CorrespondenceId = CorrespondenceId(7);

    /// Two copies of one molecule sharing a sequence, with four aligned units.
    fn store() -> TableStore {
        let mut store = TableStore::new()
            .with_chain(Chain::new(ChainDbId(1), "1FJG", 1, "A", 20, 12).with_species(274))
            .with_chain(Chain::new(ChainDbId(2), "1J5E", 1, "A", 20, 12).with_species(274))
            .with_ife_chain("1FJG|1|A", ChainDbId(1), true)
            .with_ife_chain("1J5E|1|A", ChainDbId(2), true)
            .with_sequence(ExpSeqId(10), 20)
            .with_sequence_chain(ExpSeqId(10), ChainDbId(1))
            .with_sequence_chain(ExpSeqId(10), ChainDbId(2))
            .with_correspondence(CorrespondenceRecord {
                correspondence_id: CORR,
                exp_seq_id_1: ExpSeqId(10),
                exp_seq_id_2: ExpSeqId(10),
                good_alignment: true,
            });
        let points = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(0.0, 0.0, 2.0),
        ];
        for (i, point) in points.iter().enumerate() {
            let u1 = format!("1FJG|1|A|G|{}", i + 1);
            let u2 = format!("1J5E|1|A|G|{}", i + 1);
            let unit_1: UnitId = u1.parse().unwrap();
            let unit_2: UnitId = u2.parse().unwrap();
            store = store
                .with_unit(unit_1, *point, Matrix3::identity())
                .with_unit(unit_2, point * 1.1, Matrix3::identity())
                .with_aligned_unit(UnitCorrespondence {
                    correspondence_id: CORR,
                    index: i as u32,
                    unit_id_1: u1,
                    unit_id_2: u2,
                });
        }
        store
    }

    fn config() -> ComparisonConfig {
        ComparisonConfig {
            selection: SelectionConfig {
                comparison_limit: 2,
                ..SelectionConfig::default()
            },
            ..ComparisonConfig::default()
        }
    }

    fn pdbs() -> Vec<String> {
        vec!["1FJG".to_string(), "1J5E".to_string()]
    }

    #[test]
    fn computes_and_stores_both_rows() {
        let store = store();
        let summary = run(
            &store,
            &pdbs(),
            &config(),
            &MatrixDiscrepancy::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(summary.batches, 1);
        assert_eq!(summary.computed, 1);
        assert_eq!(summary.sentinel, 0);
        assert_eq!(summary.rows_written, 2);
        assert!(!summary.has_failures());

        let rows = store.discrepancies().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].num_nucleotides, 4);
        assert!(rows[0].discrepancy > 0.0);
    }

    #[test]
    fn rerun_is_a_no_op() {
        let store = store();
        let config = config();
        let engine = MatrixDiscrepancy::new();
        let reporter = ProgressReporter::new();
        run(&store, &pdbs(), &config, &engine, &reporter).unwrap();
        let second = run(&store, &pdbs(), &config, &engine, &reporter).unwrap();
        assert_eq!(second.computed, 0);
        assert_eq!(second.rows_written, 0);
        assert_eq!(store.discrepancies().unwrap().len(), 2);
    }

    #[test]
    fn batches_outside_the_limit_compute_nothing() {
        let store = store();
        let summary = run(
            &store,
            &pdbs(),
            &ComparisonConfig::default(),
            &MatrixDiscrepancy::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(summary.batches, 0);
        assert!(store.discrepancies().unwrap().is_empty());
    }

    #[test]
    fn summary_counts_sentinels_within_computed() {
        let store = store();
        let config = config();
        struct Nan;
        impl GeometryEngine for Nan {
            fn discrepancy(
                &self,
                _: &[Vector3<f64>],
                _: &[Matrix3<f64>],
                _: &[Vector3<f64>],
                _: &[Matrix3<f64>],
            ) -> Result<f64, crate::core::geometry::discrepancy::GeometryError> {
                Ok(f64::NAN)
            }
        }
        let summary = run(&store, &pdbs(), &config, &Nan, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.computed, 1);
        assert_eq!(summary.sentinel, 1);
        let rows = store.discrepancies().unwrap();
        assert!(rows.iter().all(|r| r.is_failed()));
    }
}
