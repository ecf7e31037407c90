//! Chain-to-chain discrepancy computation over aligned unit geometry.

use super::cache::KnownPairs;
use super::config::DiscrepancyConfig;
use super::correspondence::{CorrespondenceResolver, PairAlignment};
use super::error::EngineError;
use super::outcome::{PairOutcome, SkipReason};
use super::resolver::ChainInfoResolver;
use crate::core::geometry::discrepancy::{GeometryEngine, MIN_ALIGNED_UNITS};
use crate::core::io::traits::{
    ChainInfoSource, CorrespondenceStore, DiscrepancySink, GeometryQuery, GeometryStore,
};
use crate::core::models::correspondence::{AlignedChain, UnitCorrespondence};
use crate::core::models::discrepancy::{DiscrepancyEntry, FAILED_DISCREPANCY};
use crate::core::models::ids::ChainDbId;
use crate::core::models::info::ChainInfo;
use itertools::Itertools;
use nalgebra::{Matrix3, Vector3};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, trace, warn};

/// The data sources a comparison reads from and writes to.
#[derive(Clone, Copy)]
pub struct ComparisonSources<'a> {
    pub chains: &'a dyn ChainInfoSource,
    pub geometry: &'a dyn GeometryStore,
    pub correspondences: &'a dyn CorrespondenceStore,
    pub sink: &'a dyn DiscrepancySink,
}

impl<'a> ComparisonSources<'a> {
    /// Uses one store for every role.
    pub fn uniform<S>(store: &'a S) -> Self
    where
        S: ChainInfoSource + GeometryStore + CorrespondenceStore + DiscrepancySink,
    {
        Self {
            chains: store,
            geometry: store,
            correspondences: store,
            sink: store,
        }
    }
}

/// Positionally aligned centers and rotations of two chains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedGeometry {
    pub centers_1: Vec<Vector3<f64>>,
    pub rotations_1: Vec<Matrix3<f64>>,
    pub centers_2: Vec<Vector3<f64>>,
    pub rotations_2: Vec<Matrix3<f64>>,
}

impl AlignedGeometry {
    pub fn len(&self) -> usize {
        self.centers_1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers_1.is_empty()
    }

    fn push(&mut self, first: &(Vector3<f64>, Matrix3<f64>), second: &(Vector3<f64>, Matrix3<f64>)) {
        self.centers_1.push(first.0);
        self.rotations_1.push(first.1);
        self.centers_2.push(second.0);
        self.rotations_2.push(second.1);
    }
}

type UnitFrames = HashMap<String, (Vector3<f64>, Matrix3<f64>)>;

/// Computes and records discrepancies between chains of one NR group.
pub struct DiscrepancyComputer<'a> {
    sources: ComparisonSources<'a>,
    engine: &'a dyn GeometryEngine,
    config: &'a DiscrepancyConfig,
}

impl<'a> DiscrepancyComputer<'a> {
    pub fn new(
        sources: ComparisonSources<'a>,
        engine: &'a dyn GeometryEngine,
        config: &'a DiscrepancyConfig,
    ) -> Self {
        Self {
            sources,
            engine,
            config,
        }
    }

    pub fn info(&self, chain_id: ChainDbId) -> Result<ChainInfo, EngineError> {
        ChainInfoResolver::new(self.sources.chains, self.config).info(chain_id)
    }

    pub fn corr_id(
        &self,
        chain_1: ChainDbId,
        chain_2: ChainDbId,
    ) -> Result<Option<PairAlignment>, EngineError> {
        CorrespondenceResolver::new(self.sources.correspondences).corr_id(chain_1, chain_2)
    }

    /// Whether the chain has both center and rotation records for its
    /// resolved model and symmetry operator.
    pub fn has_matrices(&self, info: &ChainInfo) -> Result<bool, EngineError> {
        let query = GeometryQuery {
            pdb: &info.pdb,
            chain: &info.chain_name,
            model: info.model,
            sym_op: &info.sym_op,
        };
        Ok(self.sources.geometry.has_centers(&query)?
            && self.sources.geometry.has_rotations(&query)?)
    }

    /// Frames of every chain in the IFE of `info`, keyed by unit id.
    ///
    /// Units of another model, units with an excluded alternate id and units
    /// carrying an explicit symmetry operator are left out.
    fn ife_units(&self, info: &ChainInfo) -> Result<UnitFrames, EngineError> {
        let mut units = UnitFrames::new();
        for (pdb, chain) in info.ife_chains() {
            for unit in self.sources.geometry.chain_units(&pdb, &chain)? {
                let id = &unit.unit_id;
                if id
                    .alt_id
                    .as_ref()
                    .is_some_and(|alt| self.config.excluded_alt_ids.contains(alt))
                {
                    trace!(unit = %id, "Skipping excluded alternate location");
                    continue;
                }
                if id.sym_op.is_some() {
                    trace!(unit = %id, "Skipping unit with symmetry operator");
                    continue;
                }
                if id.model != info.model {
                    continue;
                }
                units.insert(id.as_str().to_string(), (unit.center, unit.rotation));
            }
        }
        Ok(units)
    }

    /// Loads the centers and rotations of both chains in alignment order.
    ///
    /// The first arrays always belong to `info_1`, whichever direction the
    /// correspondence was stored in. Rows whose unit is missing on either
    /// side are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] when a unit is used twice on the
    /// same side of the alignment.
    pub fn load_aligned(
        &self,
        info_1: &ChainInfo,
        info_2: &ChainInfo,
        alignment: PairAlignment,
    ) -> Result<AlignedGeometry, EngineError> {
        let units_1 = self.ife_units(info_1)?;
        let units_2 = self.ife_units(info_2)?;
        let chain_1 = AlignedChain::new(info_1.pdb.as_str(), info_1.chain_name.as_str());
        let chain_2 = AlignedChain::new(info_2.pdb.as_str(), info_2.chain_name.as_str());
        let rows: Vec<UnitCorrespondence> = if alignment.reversed {
            self.sources
                .correspondences
                .aligned_units(alignment.id, &chain_2, &chain_1)?
                .into_iter()
                .map(|row| UnitCorrespondence {
                    unit_id_1: row.unit_id_2,
                    unit_id_2: row.unit_id_1,
                    ..row
                })
                .collect()
        } else {
            self.sources
                .correspondences
                .aligned_units(alignment.id, &chain_1, &chain_2)?
        };
        if rows.is_empty() {
            warn!(
                name_1 = %info_1.display_name,
                name_2 = %info_2.display_name,
                correspondence_id = %alignment.id,
                reversed = alignment.reversed,
                "No aligned units for pair"
            );
        }

        let mut aligned = AlignedGeometry::default();
        let mut seen_1 = HashSet::new();
        let mut seen_2 = HashSet::new();
        for row in &rows {
            let (Some(first), Some(second)) =
                (units_1.get(&row.unit_id_1), units_2.get(&row.unit_id_2))
            else {
                continue;
            };
            if !seen_1.insert(row.unit_id_1.as_str()) {
                return Err(EngineError::InvalidState(format!(
                    "Got duplicate unit {}",
                    row.unit_id_1
                )));
            }
            if !seen_2.insert(row.unit_id_2.as_str()) {
                return Err(EngineError::InvalidState(format!(
                    "Got duplicate unit {}",
                    row.unit_id_2
                )));
            }
            aligned.push(first, second);
        }

        debug!(
            rows = rows.len(),
            units_1 = units_1.len(),
            units_2 = units_2.len(),
            aligned = aligned.len(),
            "Loaded aligned geometry"
        );
        Ok(aligned)
    }

    /// Runs the geometry engine. A NaN result is an invalid state.
    pub fn discrepancy(&self, aligned: &AlignedGeometry) -> Result<f64, EngineError> {
        let value = self.engine.discrepancy(
            &aligned.centers_1,
            &aligned.rotations_1,
            &aligned.centers_2,
            &aligned.rotations_2,
        )?;
        if value.is_nan() {
            return Err(EngineError::InvalidState(
                "Discrepancy computed as NaN".to_string(),
            ));
        }
        Ok(value)
    }

    /// Compares two resolved chains through `alignment`.
    ///
    /// A chain without geometry for its pose skips the pair. Too few aligned
    /// units, a failed or a NaN computation still yield both rows, carrying
    /// the `(-1, 0)` sentinel. The engine is not called below
    /// [`MIN_ALIGNED_UNITS`].
    pub fn outcome(
        &self,
        info_1: &ChainInfo,
        info_2: &ChainInfo,
        alignment: PairAlignment,
    ) -> Result<PairOutcome, EngineError> {
        for info in [info_1, info_2] {
            if !self.has_matrices(info)? {
                warn!(
                    name = %info.display_name,
                    pdb = %info.pdb,
                    model = info.model,
                    "Missing matrix data"
                );
                return Ok(PairOutcome::Skipped {
                    chain_id_1: info_1.chain_id,
                    chain_id_2: info_2.chain_id,
                    reason: SkipReason::MissingGeometry {
                        chain_id: info.chain_id,
                    },
                });
            }
        }

        let aligned = self.load_aligned(info_1, info_2, alignment)?;
        let computed = if aligned.len() < MIN_ALIGNED_UNITS {
            Err(EngineError::InvalidState(format!(
                "Not enough centers for pair: {} aligned, {} needed",
                aligned.len(),
                MIN_ALIGNED_UNITS
            )))
        } else {
            self.discrepancy(&aligned)
        };
        let (discrepancy, num_nucleotides) = match computed {
            Ok(value) => (value, aligned.len() as u32),
            Err(err) => {
                warn!(
                    name_1 = %info_1.display_name,
                    name_2 = %info_2.display_name,
                    model_1 = info_1.model,
                    model_2 = info_2.model,
                    error = %err,
                    "Could not compute discrepancy, storing sentinel"
                );
                (FAILED_DISCREPANCY, 0)
            }
        };

        let forward = DiscrepancyEntry {
            chain_id_1: info_1.chain_id,
            chain_id_2: info_2.chain_id,
            model_1: info_1.model,
            model_2: info_2.model,
            correspondence_id: alignment.id,
            discrepancy,
            num_nucleotides,
        };
        info!(
            name_1 = %info_1.display_name,
            name_2 = %info_2.display_name,
            discrepancy,
            num_nucleotides,
            "Computed discrepancy"
        );
        let reversed = forward.reversed();
        Ok(PairOutcome::Computed([forward, reversed]))
    }

    /// The rows to store for one pair: both orderings, or nothing when the
    /// pair was skipped.
    pub fn entry(
        &self,
        info_1: &ChainInfo,
        info_2: &ChainInfo,
        alignment: PairAlignment,
    ) -> Result<Vec<DiscrepancyEntry>, EngineError> {
        Ok(self.outcome(info_1, info_2, alignment)?.entries().to_vec())
    }

    /// Resolves the second chain and its correspondence, then compares. Any
    /// error becomes a [`PairOutcome::Failed`] for this pair alone.
    pub fn compare_pair(&self, info_1: &ChainInfo, chain_2: ChainDbId) -> PairOutcome {
        match self.try_compare(info_1, chain_2) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    chain_id_1 = %info_1.chain_id,
                    chain_id_2 = %chain_2,
                    pdb = %info_1.pdb,
                    model = info_1.model,
                    error = %err,
                    "Failed to compare chains"
                );
                PairOutcome::Failed {
                    chain_id_1: info_1.chain_id,
                    chain_id_2: chain_2,
                    error: err,
                }
            }
        }
    }

    fn try_compare(
        &self,
        info_1: &ChainInfo,
        chain_2: ChainDbId,
    ) -> Result<PairOutcome, EngineError> {
        let info_2 = self.info(chain_2)?;
        match self.corr_id(info_1.chain_id, chain_2)? {
            Some(alignment) => self.outcome(info_1, &info_2, alignment),
            None => Ok(PairOutcome::Skipped {
                chain_id_1: info_1.chain_id,
                chain_id_2: chain_2,
                reason: SkipReason::NoCorrespondence,
            }),
        }
    }

    /// Lazily compares `chain` with every candidate that has no stored
    /// discrepancy yet, in either order. The chain itself and repeated
    /// candidates are ignored.
    ///
    /// The stored pairs are read once, before the first comparison.
    ///
    /// # Errors
    ///
    /// Fails up front when `chain` itself cannot be resolved or the sink
    /// cannot be queried.
    pub fn data(
        &self,
        chain: ChainDbId,
        candidates: &[ChainDbId],
    ) -> Result<impl Iterator<Item = PairOutcome> + '_, EngineError> {
        let info_1 = self.info(chain)?;
        let known = KnownPairs::from_pairs(self.sources.sink.known_pairs(chain, candidates)?);

        let pending: Vec<ChainDbId> = candidates
            .iter()
            .copied()
            .filter(|&candidate| candidate != chain)
            .filter(|&candidate| {
                let is_known = known.contains(chain, candidate);
                if is_known {
                    debug!(chain_id_1 = %chain, chain_id_2 = %candidate, "Already have discrepancy");
                }
                !is_known
            })
            .unique()
            .collect();
        info!(
            chain_id = %chain,
            candidates = candidates.len(),
            known = known.len(),
            pending = pending.len(),
            "Prepared comparisons"
        );

        Ok(pending
            .into_iter()
            .map(move |candidate| self.compare_pair(&info_1, candidate)))
    }
}
