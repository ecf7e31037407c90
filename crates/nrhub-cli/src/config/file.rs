use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGroupingConfig {
    pub min_bp_count: Option<u32>,
    pub min_bp_per_nt: Option<f64>,
    pub external_internal_fraction: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSelectionConfig {
    pub comparison_limit: Option<usize>,
    pub max_resolution: Option<f64>,
    pub min_length: Option<u32>,
}

/// Alternate ids are plain strings in the file; an empty string stands for
/// "no alternate id".
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDiscrepancyConfig {
    pub excluded_alt_ids: Option<Vec<String>>,
    pub sym_op_preference: Option<Vec<String>>,
    pub alt_id_preference: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub grouping: Option<FileGroupingConfig>,
    pub selection: Option<FileSelectionConfig>,
    pub discrepancy: Option<FileDiscrepancyConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

pub fn alt_id_from_file(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nrhub.toml");
        fs::write(
            &path,
            r#"
            [grouping]
            min-bp-count = 4
            min-bp-per-nt = 0.4

            [selection]
            comparison-limit = 100

            [discrepancy]
            alt-id-preference = ["", "A"]
            "#,
        )
        .unwrap();
        let config = FileConfig::from_file(&path).unwrap();
        let grouping = config.grouping.unwrap();
        assert_eq!(grouping.min_bp_count, Some(4));
        assert_eq!(grouping.external_internal_fraction, None);
        assert_eq!(config.selection.unwrap().comparison_limit, Some(100));
        assert_eq!(
            config.discrepancy.unwrap().alt_id_preference,
            Some(vec!["".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nrhub.toml");
        fs::write(&path, "[grouping]\nmin-bp = 4\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FileConfig::from_file(&dir.path().join("absent.toml")),
            Err(CliError::Io(_))
        ));
    }

    #[test]
    fn empty_alt_id_means_none() {
        assert_eq!(alt_id_from_file(""), None);
        assert_eq!(alt_id_from_file("A"), Some("A".to_string()));
    }
}
