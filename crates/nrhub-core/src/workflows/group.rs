use crate::core::io::traits::StructureSource;
use crate::core::models::ife::IfeGroup;
use crate::engine::config::GroupingConfig;
use crate::engine::error::EngineError;
use crate::engine::grouping::IfeGrouper;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The IFEs of one structure.
#[derive(Debug, Clone)]
pub struct StructureGrouping {
    pub pdb: String,
    pub groups: Vec<IfeGroup>,
}

#[derive(Debug, Default)]
pub struct GroupingReport {
    pub structures: Vec<StructureGrouping>,
    pub failures: Vec<(String, EngineError)>,
}

impl GroupingReport {
    pub fn ife_count(&self) -> usize {
        self.structures.iter().map(|s| s.groups.len()).sum()
    }
}

#[instrument(skip_all, name = "grouping_workflow")]
pub fn run(
    source: &dyn StructureSource,
    pdbs: &[String],
    config: &GroupingConfig,
    reporter: &ProgressReporter,
) -> Result<GroupingReport, EngineError> {
    if pdbs.is_empty() {
        return Err(EngineError::InvalidState(
            "No structures given to group".to_string(),
        ));
    }
    let pdbs: Vec<&String> = pdbs.iter().unique().collect();
    let grouper = IfeGrouper::new(config.clone());

    reporter.report(Progress::StageStart {
        name: "IFE grouping",
    });
    reporter.report(Progress::BatchStart {
        total: pdbs.len() as u64,
    });

    let iterator = pdbs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pdbs.par_iter();

    let results: Vec<(String, Result<Vec<IfeGroup>, EngineError>)> = iterator
        .map(|pdb| {
            let result = group_structure(source, &grouper, pdb);
            reporter.report(Progress::ItemDone);
            (pdb.to_string(), result)
        })
        .collect();

    reporter.report(Progress::BatchFinish);

    let mut report = GroupingReport::default();
    for (pdb, result) in results {
        match result {
            Ok(groups) => report.structures.push(StructureGrouping { pdb, groups }),
            Err(err) => {
                warn!(pdb = %pdb, error = %err, "Could not group structure");
                reporter.report(Progress::Message(format!("{pdb}: {err}")));
                report.failures.push((pdb, err));
            }
        }
    }

    reporter.report(Progress::StageFinish);
    info!(
        structures = report.structures.len(),
        ifes = report.ife_count(),
        failures = report.failures.len(),
        "Grouping complete"
    );
    Ok(report)
}

fn group_structure(
    source: &dyn StructureSource,
    grouper: &IfeGrouper,
    pdb: &str,
) -> Result<Vec<IfeGroup>, EngineError> {
    let chains = source.chains(pdb)?;
    let interactions = source.interactions(pdb)?;
    grouper.group(chains, &interactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::tables::TableStore;
    use crate::core::models::chain::Chain;
    use crate::core::models::ids::ChainDbId;
    use std::sync::{Arc, Mutex};

    fn store() -> TableStore {
        TableStore::new()
            .with_chain(Chain::new(ChainDbId(1), "1FJG", 1, "A", 20, 12))
            .with_chain(Chain::new(ChainDbId(2), "1FJG", 1, "V", 10, 0))
            .with_chain(Chain::new(ChainDbId(3), "1EHZ", 1, "A", 20, 12))
            .with_interaction("1FJG", "A", "V", 8)
    }

    fn pdbs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_every_structure_once() {
        let store = store();
        let report = run(
            &store,
            &pdbs(&["1FJG", "1EHZ", "1FJG"]),
            &GroupingConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.structures.len(), 2);
        let fjg = report
            .structures
            .iter()
            .find(|s| s.pdb == "1FJG")
            .unwrap();
        assert_eq!(fjg.groups.len(), 1);
        assert_eq!(fjg.groups[0].id(), "1FJG|1|A");
        assert_eq!(fjg.groups[0].len(), 2);
        assert_eq!(report.ife_count(), 2);
    }

    #[test]
    fn unknown_structure_is_reported_not_fatal() {
        let store = store();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        let report = run(
            &store,
            &pdbs(&["1EHZ", "0XXX"]),
            &GroupingConfig::default(),
            &reporter,
        )
        .unwrap();
        assert_eq!(report.structures.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "0XXX");
        assert!(matches!(report.failures[0].1, EngineError::InvalidState(_)));

        let events = events.lock().unwrap();
        let done = events
            .iter()
            .filter(|e| matches!(e, Progress::ItemDone))
            .count();
        assert_eq!(done, 2);
        assert!(events.iter().any(|e| matches!(e, Progress::Message(_))));
    }

    #[test]
    fn empty_request_is_invalid_state() {
        let store = store();
        let result = run(&store, &[], &GroupingConfig::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::InvalidState(_))));
    }
}
