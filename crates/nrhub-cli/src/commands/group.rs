use super::{load_store, output_writer, requested_pdbs};
use crate::cli::GroupArgs;
use crate::config::builder::{SelectionOverrides, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use nrhub::core::models::ids::ChainDbId;
use nrhub::engine::progress::ProgressReporter;
use nrhub::workflows::{self, group::GroupingReport};
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct IfeRow<'a> {
    ife_id: &'a str,
    pdb: &'a str,
    chain_id: ChainDbId,
    chain: &'a str,
    structured: bool,
    representative: bool,
}

pub fn run(args: GroupArgs) -> Result<()> {
    let app = build_config(&args.structures, &args.config, SelectionOverrides::default())?;
    let store = load_store(&app.data_dir)?;
    let pdbs = requested_pdbs(&store, app.pdbs);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Grouping {} structure(s) into IFEs...", pdbs.len());
    let report = workflows::group::run(&store, &pdbs, &app.core_config.grouping, &reporter)?;

    let mut writer = output_writer(args.output.as_deref())?;
    let rows = write_groups(&mut writer, &report)?;
    writer.flush()?;

    for (pdb, err) in &report.failures {
        warn!("Structure {} was not grouped: {}", pdb, err);
        eprintln!("Warning: {} was not grouped: {}", pdb, err);
    }
    eprintln!(
        "Grouped {} structure(s) into {} IFE(s), {} chain row(s) written.",
        report.structures.len(),
        report.ife_count(),
        rows
    );
    Ok(())
}

/// One row per chain, IFEs in grouping order, the representative first.
fn write_groups<W: Write>(writer: &mut csv::Writer<W>, report: &GroupingReport) -> Result<usize> {
    let mut rows = 0;
    for structure in &report.structures {
        for group in &structure.groups {
            let ife_id = group.id();
            let representative = group.representative().chain().db_id;
            for member in group.chains() {
                let chain = member.chain();
                writer.serialize(IfeRow {
                    ife_id: &ife_id,
                    pdb: &structure.pdb,
                    chain_id: chain.db_id,
                    chain: &chain.name,
                    structured: member.is_structured(),
                    representative: chain.db_id == representative,
                })?;
                rows += 1;
            }
        }
    }
    Ok(rows)
}
