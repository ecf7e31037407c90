use thiserror::Error;

/// Minimum internal interaction count of a structured chain.
pub const STRUCTURED_BP_COUNT: u32 = 5;
/// Minimum internal interactions per nucleotide of a structured chain.
pub const STRUCTURED_BP_PER_NT: f64 = 0.5;
/// Fraction of the weaker chain's internal count two chains must share to
/// join when either is structured.
pub const IFE_EXTERNAL_INTERNAL_FRACTION: f64 = 0.6;
/// Exact group size (first chain plus candidates) a comparison batch must have.
pub const COMPARISON_LIMIT: usize = 460;
pub const MAX_RESOLUTION: f64 = 4.0;
pub const MIN_CHAIN_LENGTH: u32 = 3;
pub const EXCLUDED_ALT_IDS: [&str; 2] = ["B", "C"];
pub const SYM_OP_PREFERENCE: [&str; 2] = ["1_555", "P_1"];
pub const ALT_ID_PREFERENCE: [Option<&str>; 3] = [None, Some("A"), Some("B")];
/// Sequences shorter than this only align to sequences of identical length.
pub const CORRESPONDENCE_SMALL_CUTOFF: u32 = 36;
/// Sequences at or above this length only align to each other.
pub const CORRESPONDENCE_HUGE_CUTOFF: u32 = 2000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    pub min_bp_count: u32,
    pub min_bp_per_nt: f64,
    pub external_internal_fraction: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_bp_count: STRUCTURED_BP_COUNT,
            min_bp_per_nt: STRUCTURED_BP_PER_NT,
            external_internal_fraction: IFE_EXTERNAL_INTERNAL_FRACTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub comparison_limit: usize,
    pub max_resolution: f64,
    pub min_length: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            comparison_limit: COMPARISON_LIMIT,
            max_resolution: MAX_RESOLUTION,
            min_length: MIN_CHAIN_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyConfig {
    pub excluded_alt_ids: Vec<String>,
    pub sym_op_preference: Vec<String>,
    pub alt_id_preference: Vec<Option<String>>,
}

impl Default for DiscrepancyConfig {
    fn default() -> Self {
        Self {
            excluded_alt_ids: EXCLUDED_ALT_IDS.iter().map(|s| s.to_string()).collect(),
            sym_op_preference: SYM_OP_PREFERENCE.iter().map(|s| s.to_string()).collect(),
            alt_id_preference: ALT_ID_PREFERENCE
                .iter()
                .map(|a| a.map(str::to_string))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentConfig {
    pub small_cutoff: u32,
    pub huge_cutoff: u32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            small_cutoff: CORRESPONDENCE_SMALL_CUTOFF,
            huge_cutoff: CORRESPONDENCE_HUGE_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonConfig {
    pub grouping: GroupingConfig,
    pub selection: SelectionConfig,
    pub discrepancy: DiscrepancyConfig,
}

#[derive(Default)]
pub struct ComparisonConfigBuilder {
    min_bp_count: Option<u32>,
    min_bp_per_nt: Option<f64>,
    external_internal_fraction: Option<f64>,
    comparison_limit: Option<usize>,
    max_resolution: Option<f64>,
    min_length: Option<u32>,
    excluded_alt_ids: Option<Vec<String>>,
    sym_op_preference: Option<Vec<String>>,
    alt_id_preference: Option<Vec<Option<String>>>,
}

impl ComparisonConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_bp_count(mut self, count: u32) -> Self {
        self.min_bp_count = Some(count);
        self
    }
    pub fn min_bp_per_nt(mut self, ratio: f64) -> Self {
        self.min_bp_per_nt = Some(ratio);
        self
    }
    pub fn external_internal_fraction(mut self, fraction: f64) -> Self {
        self.external_internal_fraction = Some(fraction);
        self
    }
    pub fn comparison_limit(mut self, limit: usize) -> Self {
        self.comparison_limit = Some(limit);
        self
    }
    pub fn max_resolution(mut self, resolution: f64) -> Self {
        self.max_resolution = Some(resolution);
        self
    }
    pub fn min_length(mut self, length: u32) -> Self {
        self.min_length = Some(length);
        self
    }
    pub fn excluded_alt_ids(mut self, alt_ids: Vec<String>) -> Self {
        self.excluded_alt_ids = Some(alt_ids);
        self
    }
    pub fn sym_op_preference(mut self, preference: Vec<String>) -> Self {
        self.sym_op_preference = Some(preference);
        self
    }
    pub fn alt_id_preference(mut self, preference: Vec<Option<String>>) -> Self {
        self.alt_id_preference = Some(preference);
        self
    }

    pub fn build(self) -> Result<ComparisonConfig, ConfigError> {
        let grouping = GroupingConfig {
            min_bp_count: self
                .min_bp_count
                .ok_or(ConfigError::MissingParameter("min_bp_count"))?,
            min_bp_per_nt: non_negative(
                "min_bp_per_nt",
                self.min_bp_per_nt
                    .ok_or(ConfigError::MissingParameter("min_bp_per_nt"))?,
            )?,
            external_internal_fraction: non_negative(
                "external_internal_fraction",
                self.external_internal_fraction
                    .ok_or(ConfigError::MissingParameter("external_internal_fraction"))?,
            )?,
        };

        let comparison_limit = self
            .comparison_limit
            .ok_or(ConfigError::MissingParameter("comparison_limit"))?;
        if comparison_limit < 2 {
            return Err(ConfigError::InvalidValue {
                parameter: "comparison_limit",
                reason: format!("must be at least 2, got {comparison_limit}"),
            });
        }
        let max_resolution = self
            .max_resolution
            .ok_or(ConfigError::MissingParameter("max_resolution"))?;
        if max_resolution.is_nan() || max_resolution <= 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_resolution",
                reason: format!("must be positive, got {max_resolution}"),
            });
        }
        let selection = SelectionConfig {
            comparison_limit,
            max_resolution,
            min_length: self
                .min_length
                .ok_or(ConfigError::MissingParameter("min_length"))?,
        };

        let discrepancy = DiscrepancyConfig {
            excluded_alt_ids: self
                .excluded_alt_ids
                .ok_or(ConfigError::MissingParameter("excluded_alt_ids"))?,
            sym_op_preference: self
                .sym_op_preference
                .ok_or(ConfigError::MissingParameter("sym_op_preference"))?,
            alt_id_preference: self
                .alt_id_preference
                .ok_or(ConfigError::MissingParameter("alt_id_preference"))?,
        };

        Ok(ComparisonConfig {
            grouping,
            selection,
            discrepancy,
        })
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: format!("must be a finite non-negative number, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> ComparisonConfigBuilder {
        let defaults = ComparisonConfig::default();
        ComparisonConfigBuilder::new()
            .min_bp_count(defaults.grouping.min_bp_count)
            .min_bp_per_nt(defaults.grouping.min_bp_per_nt)
            .external_internal_fraction(defaults.grouping.external_internal_fraction)
            .comparison_limit(defaults.selection.comparison_limit)
            .max_resolution(defaults.selection.max_resolution)
            .min_length(defaults.selection.min_length)
            .excluded_alt_ids(defaults.discrepancy.excluded_alt_ids)
            .sym_op_preference(defaults.discrepancy.sym_op_preference)
            .alt_id_preference(defaults.discrepancy.alt_id_preference)
    }

    #[test]
    fn defaults_mirror_constants() {
        let config = ComparisonConfig::default();
        assert_eq!(config.grouping.min_bp_count, 5);
        assert_eq!(config.grouping.min_bp_per_nt, 0.5);
        assert_eq!(config.grouping.external_internal_fraction, 0.6);
        assert_eq!(config.selection.comparison_limit, 460);
        assert_eq!(config.discrepancy.sym_op_preference, vec!["1_555", "P_1"]);
        assert_eq!(
            config.discrepancy.alt_id_preference,
            vec![None, Some("A".to_string()), Some("B".to_string())]
        );
    }

    #[test]
    fn complete_builder_reproduces_defaults() {
        assert_eq!(complete_builder().build().unwrap(), ComparisonConfig::default());
    }

    #[test]
    fn missing_parameter_is_reported_by_name() {
        let result = ComparisonConfigBuilder::new().min_bp_count(5).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("min_bp_per_nt")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = complete_builder().comparison_limit(1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                parameter: "comparison_limit",
                ..
            })
        ));

        let result = complete_builder().external_internal_fraction(-0.1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                parameter: "external_internal_fraction",
                ..
            })
        ));

        let result = complete_builder().max_resolution(f64::NAN).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                parameter: "max_resolution",
                ..
            })
        ));
    }
}
