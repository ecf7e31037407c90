use super::{load_store, output_writer, requested_pdbs};
use crate::cli::AlignArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use nrhub::core::models::ids::ExpSeqId;
use nrhub::engine::config::AlignmentConfig;
use nrhub::engine::progress::ProgressReporter;
use nrhub::workflows;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct AlignmentRow {
    exp_seq_id_1: ExpSeqId,
    exp_seq_id_2: ExpSeqId,
}

pub fn run(args: AlignArgs) -> Result<()> {
    let defaults = AlignmentConfig::default();
    let config = AlignmentConfig {
        small_cutoff: args.small_cutoff.unwrap_or(defaults.small_cutoff),
        huge_cutoff: args.huge_cutoff.unwrap_or(defaults.huge_cutoff),
    };
    info!(
        "Alignment length cutoffs: small {}, huge {}",
        config.small_cutoff, config.huge_cutoff
    );

    let store = load_store(&args.structures.data)?;
    let pdbs = requested_pdbs(&store, args.structures.pdbs);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let pairs = workflows::align::run(&store, &pdbs, config, &reporter)?;

    let mut writer = output_writer(args.output.as_deref())?;
    for (exp_seq_id_1, exp_seq_id_2) in &pairs {
        writer.serialize(AlignmentRow {
            exp_seq_id_1: *exp_seq_id_1,
            exp_seq_id_2: *exp_seq_id_2,
        })?;
    }
    writer.flush()?;

    eprintln!("{} sequence pair(s) need an alignment.", pairs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StructureArgs;
    use crate::commands::test_tables::write;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_pairs_without_existing_alignment() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "chains.csv",
            "chain_id,pdb,model,chain_name,length,internal,species_id,resolution\n\
             1,1EHZ,1,A,76,30,,\n\
             2,1EVV,1,A,76,30,,\n",
        );
        write(dir.path(), "exp_seq_info.csv", "exp_seq_id,length\n1,76\n2,76\n");
        write(
            dir.path(),
            "exp_seq_chain_mapping.csv",
            "exp_seq_id,chain_id\n1,1\n2,2\n",
        );
        write(
            dir.path(),
            "correspondence_info.csv",
            "correspondence_id,exp_seq_id_1,exp_seq_id_2,good_alignment\n5,1,1,1\n",
        );
        let output = dir.path().join("pairs.csv");

        run(AlignArgs {
            structures: StructureArgs {
                data: dir.path().to_path_buf(),
                pdbs: vec!["1EHZ".to_string()],
            },
            small_cutoff: None,
            huge_cutoff: None,
            output: Some(output.clone()),
        })
        .unwrap();

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content, "exp_seq_id_1,exp_seq_id_2\n1,2\n");
    }
}
