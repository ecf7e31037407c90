use super::defaults::DefaultsConfig;
use super::file::{FileConfig, alt_id_from_file};
use super::models::AppConfig;
use crate::cli::{ConfigArgs, StructureArgs};
use crate::error::{CliError, Result};
use nrhub::engine::config as core_config;
use std::str::FromStr;

/// Command-line overrides for pair selection, only offered by `compare`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectionOverrides {
    pub comparison_limit: Option<usize>,
    pub max_resolution: Option<f64>,
}

/// Merges command-line flags, `--set` values, the config file and the
/// defaults, in that order of precedence.
pub fn build_config(
    structures: &StructureArgs,
    args: &ConfigArgs,
    overrides: SelectionOverrides,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let grouping = file_config.grouping.take().unwrap_or_default();
    let selection = file_config.selection.take().unwrap_or_default();
    let discrepancy = file_config.discrepancy.take().unwrap_or_default();

    let alt_id_preference = discrepancy
        .alt_id_preference
        .map(|values| values.iter().map(|v| alt_id_from_file(v)).collect())
        .unwrap_or(defaults.alt_id_preference);

    let core_config = core_config::ComparisonConfigBuilder::new()
        .min_bp_count(
            args.min_bp_count
                .or(grouping.min_bp_count)
                .unwrap_or(defaults.min_bp_count),
        )
        .min_bp_per_nt(
            args.min_bp_per_nt
                .or(grouping.min_bp_per_nt)
                .unwrap_or(defaults.min_bp_per_nt),
        )
        .external_internal_fraction(
            args.external_internal_fraction
                .or(grouping.external_internal_fraction)
                .unwrap_or(defaults.external_internal_fraction),
        )
        .comparison_limit(
            overrides
                .comparison_limit
                .or(selection.comparison_limit)
                .unwrap_or(defaults.comparison_limit),
        )
        .max_resolution(
            overrides
                .max_resolution
                .or(selection.max_resolution)
                .unwrap_or(defaults.max_resolution),
        )
        .min_length(selection.min_length.unwrap_or(defaults.min_length))
        .excluded_alt_ids(
            discrepancy
                .excluded_alt_ids
                .unwrap_or(defaults.excluded_alt_ids),
        )
        .sym_op_preference(
            discrepancy
                .sym_op_preference
                .unwrap_or(defaults.sym_op_preference),
        )
        .alt_id_preference(alt_id_preference)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        data_dir: structures.data.clone(),
        pdbs: structures.pdbs.clone(),
        core_config,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

/// Splits a comma separated `--set` list, keeping empty items.
fn parse_list(value: &str) -> Vec<String> {
    value.split(',').map(|item| item.trim().to_string()).collect()
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "grouping.min-bp-count" => {
                config
                    .grouping
                    .get_or_insert_with(Default::default)
                    .min_bp_count = Some(parse_value(key, value, "integer")?);
            }
            "grouping.min-bp-per-nt" => {
                config
                    .grouping
                    .get_or_insert_with(Default::default)
                    .min_bp_per_nt = Some(parse_value(key, value, "float")?);
            }
            "grouping.external-internal-fraction" => {
                config
                    .grouping
                    .get_or_insert_with(Default::default)
                    .external_internal_fraction = Some(parse_value(key, value, "float")?);
            }
            "selection.comparison-limit" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .comparison_limit = Some(parse_value(key, value, "integer")?);
            }
            "selection.max-resolution" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .max_resolution = Some(parse_value(key, value, "float")?);
            }
            "selection.min-length" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .min_length = Some(parse_value(key, value, "integer")?);
            }
            "discrepancy.excluded-alt-ids" => {
                let ids = parse_list(value).into_iter().filter(|id| !id.is_empty());
                config
                    .discrepancy
                    .get_or_insert_with(Default::default)
                    .excluded_alt_ids = Some(ids.collect());
            }
            "discrepancy.sym-op-preference" => {
                let ops = parse_list(value).into_iter().filter(|op| !op.is_empty());
                config
                    .discrepancy
                    .get_or_insert_with(Default::default)
                    .sym_op_preference = Some(ops.collect());
            }
            "discrepancy.alt-id-preference" => {
                config
                    .discrepancy
                    .get_or_insert_with(Default::default)
                    .alt_id_preference = Some(parse_list(value));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
