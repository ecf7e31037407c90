pub mod align;
pub mod compare;
pub mod group;

use crate::error::Result;
use nrhub::core::io::tables::TableStore;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Opens a CSV writer on `path`, or on stdout when no path is given.
fn output_writer(path: Option<&Path>) -> Result<csv::Writer<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => {
            info!("Writing output to {:?}", path);
            Box::new(File::create(path)?)
        }
        None => Box::new(io::stdout()),
    };
    Ok(csv::Writer::from_writer(sink))
}

fn load_store(data_dir: &Path) -> Result<TableStore> {
    info!("Loading tables from {:?}", data_dir);
    Ok(TableStore::load_dir(data_dir)?)
}

/// The requested structures, or every structure in the store when none were
/// named on the command line.
fn requested_pdbs(store: &TableStore, pdbs: Vec<String>) -> Vec<String> {
    if pdbs.is_empty() {
        let all = store.pdbs();
        info!("No structures named, processing all {} in the tables.", all.len());
        all
    } else {
        pdbs
    }
}
