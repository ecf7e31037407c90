use super::config::DiscrepancyConfig;
use super::error::EngineError;
use crate::core::io::traits::ChainInfoSource;
use crate::core::models::ids::ChainDbId;
use crate::core::models::info::ChainInfo;
use std::collections::BTreeSet;
use tracing::debug;

/// Picks the most preferred of the observed values.
///
/// Returns the first entry of `preferences` that was observed, otherwise the
/// smallest observed value.
///
/// # Errors
///
/// Returns [`EngineError::InvalidState`] when nothing was observed.
pub fn pick<T>(preferences: &[T], observed: impl IntoIterator<Item = T>) -> Result<T, EngineError>
where
    T: Ord + Clone,
{
    let possible: BTreeSet<T> = observed.into_iter().collect();
    if possible.is_empty() {
        return Err(EngineError::InvalidState("Nothing to pick from".to_string()));
    }
    if let Some(preferred) = preferences.iter().find(|p| possible.contains(*p)) {
        return Ok(preferred.clone());
    }
    possible
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::Internal("Non-empty set had no first element".to_string()))
}

/// Resolves a chain to the IFE, model and pose used to compare it.
pub struct ChainInfoResolver<'a> {
    source: &'a dyn ChainInfoSource,
    config: &'a DiscrepancyConfig,
}

impl<'a> ChainInfoResolver<'a> {
    pub fn new(source: &'a dyn ChainInfoSource, config: &'a DiscrepancyConfig) -> Self {
        Self { source, config }
    }

    /// Looks up the chain's new-style IFE and chooses its symmetry operator
    /// and alternate id from the poses observed in its unit geometry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the chain belongs to no
    /// new-style IFE or has no unit with both a center and a rotation.
    pub fn info(&self, chain_id: ChainDbId) -> Result<ChainInfo, EngineError> {
        let membership = self
            .source
            .ife_memberships(chain_id)?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound(format!("Could not load chain with id {chain_id}")))?;

        let poses = self.source.observed_poses(chain_id)?;
        if poses.is_empty() {
            return Err(EngineError::NotFound(format!(
                "Could not get unit poses for chain {chain_id}"
            )));
        }

        let sym_op = pick(
            &self.config.sym_op_preference,
            poses.iter().map(|p| p.sym_op.clone()),
        )?;
        let alt_id = pick(
            &self.config.alt_id_preference,
            poses.iter().map(|p| p.alt_id.clone()),
        )?;

        let info = ChainInfo::new(membership, sym_op, alt_id);
        debug!(
            chain_id = %chain_id,
            name = %info.display_name,
            alt_id = ?info.alt_id,
            "Resolved chain info"
        );
        Ok(info)
    }
}
