use nrhub::engine::config as core_config;
use std::path::PathBuf;

pub struct AppConfig {
    pub data_dir: PathBuf,
    pub pdbs: Vec<String>,
    pub core_config: core_config::ComparisonConfig,
}
