use nrhub::engine::config as core_config;

pub struct DefaultsConfig {
    pub min_bp_count: u32,
    pub min_bp_per_nt: f64,
    pub external_internal_fraction: f64,
    pub comparison_limit: usize,
    pub max_resolution: f64,
    pub min_length: u32,
    pub excluded_alt_ids: Vec<String>,
    pub sym_op_preference: Vec<String>,
    pub alt_id_preference: Vec<Option<String>>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let core = core_config::ComparisonConfig::default();
        Self {
            min_bp_count: core.grouping.min_bp_count,
            min_bp_per_nt: core.grouping.min_bp_per_nt,
            external_internal_fraction: core.grouping.external_internal_fraction,
            comparison_limit: core.selection.comparison_limit,
            max_resolution: core.selection.max_resolution,
            min_length: core.selection.min_length,
            excluded_alt_ids: core.discrepancy.excluded_alt_ids,
            sym_op_preference: core.discrepancy.sym_op_preference,
            alt_id_preference: core.discrepancy.alt_id_preference,
        }
    }
}
