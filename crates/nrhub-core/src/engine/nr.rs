//! Non-redundant grouping of IFE representatives across structures.

use super::correspondence::CorrespondenceResolver;
use super::error::EngineError;
use super::grouping::{IfeGrouper, ordered_components};
use crate::core::io::traits::{CorrespondenceStore, StructureSource};
use crate::core::models::chain::Chain;
use crate::core::models::correspondence::species_compatible;
use crate::core::models::ids::ExpSeqId;
use itertools::Itertools;
use petgraph::unionfind::UnionFind;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One NR equivalence class: the representative chains of IFEs judged to be
/// the same molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct NrGroup {
    pub members: Vec<Chain>,
}

impl NrGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The clustering stage feeding pair selection.
pub trait NrGrouper: Sync {
    fn groups(&self, pdbs: &[String]) -> Result<Vec<NrGroup>, EngineError>;
}

/// Clusters IFE representatives by shared experimental sequence or good
/// alignment, restricted to compatible species.
pub struct SequenceGrouper<'a> {
    structures: &'a dyn StructureSource,
    correspondences: &'a dyn CorrespondenceStore,
    ife: IfeGrouper,
}

impl<'a> SequenceGrouper<'a> {
    pub fn new(
        structures: &'a dyn StructureSource,
        correspondences: &'a dyn CorrespondenceStore,
        ife: IfeGrouper,
    ) -> Self {
        Self {
            structures,
            correspondences,
            ife,
        }
    }

    /// The first chain of every IFE of every structure, structures in the
    /// given order with repeats ignored.
    pub fn representatives(&self, pdbs: &[String]) -> Result<Vec<Chain>, EngineError> {
        let mut representatives = Vec::new();
        for pdb in pdbs.iter().unique() {
            let chains = self.structures.chains(pdb)?;
            if chains.is_empty() {
                warn!(pdb = %pdb, "Structure has no chains, skipping");
                continue;
            }
            let interactions = self.structures.interactions(pdb)?;
            let groups = self.ife.group(chains, &interactions)?;
            debug!(pdb = %pdb, ifes = groups.len(), "Collected IFE representatives");
            representatives.extend(groups.iter().map(|g| g.representative().chain().clone()));
        }
        Ok(representatives)
    }

    fn linked(
        &self,
        resolver: &CorrespondenceResolver<'_>,
        a: (&Chain, &HashSet<ExpSeqId>),
        b: (&Chain, &HashSet<ExpSeqId>),
    ) -> Result<bool, EngineError> {
        if !species_compatible(a.0.species, b.0.species) {
            return Ok(false);
        }
        if !a.1.is_disjoint(b.1) {
            return Ok(true);
        }
        Ok(resolver.between(a.0.db_id, b.0.db_id)?.is_some())
    }
}

impl NrGrouper for SequenceGrouper<'_> {
    fn groups(&self, pdbs: &[String]) -> Result<Vec<NrGroup>, EngineError> {
        let representatives = self.representatives(pdbs)?;
        let sequences = representatives
            .iter()
            .map(|chain| {
                self.correspondences
                    .sequence_ids(chain.db_id)
                    .map(|ids| ids.into_iter().collect::<HashSet<_>>())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resolver = CorrespondenceResolver::new(self.correspondences);
        let mut components = UnionFind::<usize>::new(representatives.len());
        for i in 0..representatives.len() {
            for j in (i + 1)..representatives.len() {
                let a = (&representatives[i], &sequences[i]);
                let b = (&representatives[j], &sequences[j]);
                if self.linked(&resolver, a, b)? {
                    components.union(i, j);
                }
            }
        }

        let groups: Vec<NrGroup> = ordered_components(components.into_labeling())
            .into_iter()
            .map(|members| NrGroup {
                members: members
                    .into_iter()
                    .map(|i| representatives[i].clone())
                    .collect(),
            })
            .collect();

        info!(
            representatives = representatives.len(),
            groups = groups.len(),
            "Built NR groups"
        );
        Ok(groups)
    }
}
