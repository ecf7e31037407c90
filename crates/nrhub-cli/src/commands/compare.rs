use super::{load_store, requested_pdbs};
use crate::cli::CompareArgs;
use crate::config::builder::{SelectionOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use nrhub::core::geometry::discrepancy::MatrixDiscrepancy;
use nrhub::engine::progress::ProgressReporter;
use nrhub::workflows;
use tracing::{info, warn};

pub fn run(args: CompareArgs) -> Result<()> {
    let overrides = SelectionOverrides {
        comparison_limit: args.comparison_limit,
        max_resolution: args.max_resolution,
    };
    let app = build_config(&args.structures, &args.config, overrides)?;
    let store = load_store(&app.data_dir)?;
    let pdbs = requested_pdbs(&store, app.pdbs);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Comparing chains of {} structure(s)...", pdbs.len());
    let summary = workflows::compare::run(
        &store,
        &pdbs,
        &app.core_config,
        &MatrixDiscrepancy::new(),
        &reporter,
    )?;

    if summary.rows_written > 0 {
        info!("Saving {} new discrepancy row(s).", summary.rows_written);
        store.save_discrepancies(&app.data_dir)?;
    } else {
        info!("No new discrepancies, leaving the similarity table untouched.");
    }

    println!(
        "Compared {} batch(es): {} pair(s) computed ({} without a usable value), {} skipped, {} row(s) written.",
        summary.batches,
        summary.computed,
        summary.sentinel,
        summary.skipped,
        summary.rows_written
    );

    if summary.has_failures() {
        warn!(
            "{} pair(s) and {} batch(es) failed.",
            summary.failed, summary.failed_batches
        );
        return Err(CliError::ComparisonFailures {
            failed: summary.failed,
            failed_batches: summary.failed_batches,
        });
    }
    Ok(())
}
