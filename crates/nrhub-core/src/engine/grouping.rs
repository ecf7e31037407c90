//! IFE grouping of the chains of one structure.
//!
//! Chains are first classified as structured or unstructured. Chains of the
//! same class are joined through [`IfeGrouper::should_join`] and merged into
//! connected components. An unstructured component is then attached to every
//! structured component it interacts with strongly enough, without ever
//! merging two structured components through it.

use super::config::GroupingConfig;
use super::error::EngineError;
use crate::core::models::chain::Chain;
use crate::core::models::ife::{IfeChain, IfeGroup};
use crate::core::models::interactions::InteractionMatrix;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct IfeGrouper {
    config: GroupingConfig,
}

impl IfeGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    pub fn classify(&self, chain: Chain) -> IfeChain {
        IfeChain::classify(chain, self.config.min_bp_count, self.config.min_bp_per_nt)
    }

    /// Decides whether two chains belong to the same IFE given the number of
    /// interactions between them.
    ///
    /// A chain never joins itself; identity is by reference, not by value. Two
    /// unstructured chains join on any interaction. Otherwise the external
    /// count must reach the configured fraction of the smaller internal count.
    pub fn should_join(&self, a: &IfeChain, b: &IfeChain, external: u32) -> bool {
        if std::ptr::eq(a, b) {
            return false;
        }
        if !a.is_structured() && !b.is_structured() {
            return external > 0;
        }
        let weaker = a.internal().min(b.internal()) as f64;
        external as f64 >= self.config.external_internal_fraction * weaker
    }

    /// Splits `interactions` into the counts between chains of the same
    /// structuredness and the counts between chains of different
    /// structuredness.
    ///
    /// Both matrices are dense over `chains` and keep the direction of the
    /// input. Each entry is copied into exactly one of them; the other holds
    /// zero. A chain paired with itself counts as same-class.
    pub fn partition_interactions(
        &self,
        chains: &[IfeChain],
        interactions: &InteractionMatrix,
    ) -> (InteractionMatrix, InteractionMatrix) {
        let mut same = InteractionMatrix::new();
        let mut mixed = InteractionMatrix::new();
        for a in chains {
            for b in chains {
                let count = interactions.count(a.name(), b.name());
                let (keep, zero) = if a.structuredness() == b.structuredness() {
                    (&mut same, &mut mixed)
                } else {
                    (&mut mixed, &mut same)
                };
                keep.set(a.name(), b.name(), count);
                zero.set(a.name(), b.name(), 0);
            }
        }
        (same, mixed)
    }

    /// Groups the chains of one structure into IFEs.
    ///
    /// Groups come back ordered by the position of their first member in
    /// `chains`, members in input order. An unstructured chain bridging
    /// several structured groups appears in each of them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] when `chains` is empty.
    pub fn group(
        &self,
        chains: Vec<Chain>,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<IfeGroup>, EngineError> {
        if chains.is_empty() {
            return Err(EngineError::InvalidState(
                "Cannot group an empty list of chains".to_string(),
            ));
        }

        let ifes: Vec<IfeChain> = chains.into_iter().map(|c| self.classify(c)).collect();
        let (same, mixed) = self.partition_interactions(&ifes, interactions);

        let mut components = UnionFind::<usize>::new(ifes.len());
        for (i, a) in ifes.iter().enumerate() {
            for (j, b) in ifes.iter().enumerate().skip(i + 1) {
                if a.structuredness() != b.structuredness() {
                    continue;
                }
                let count = same.symmetric_count(a.name(), b.name());
                if self.should_join(a, b, count) {
                    trace!(a = %a.id(), b = %b.id(), count, "Joining same-class chains");
                    components.union(i, j);
                }
            }
        }
        let components = ordered_components(components.into_labeling());

        let (structured, unstructured): (Vec<&Vec<usize>>, Vec<&Vec<usize>>) = components
            .iter()
            .partition(|members| ifes[members[0]].is_structured());

        let mut attachments: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut standalone: Vec<&Vec<usize>> = Vec::new();
        for loose in unstructured {
            if loose.len() == 1 && !interactions.has_partners(ifes[loose[0]].name()) {
                trace!(chain = %ifes[loose[0]].id(), "Unstructured chain has no partners");
                standalone.push(loose);
                continue;
            }
            let targets: Vec<usize> = structured
                .iter()
                .enumerate()
                .filter(|(_, core)| self.bridges(&ifes, &mixed, loose, core))
                .map(|(index, _)| index)
                .collect();
            if targets.is_empty() {
                standalone.push(loose);
                continue;
            }
            for target in targets {
                attachments.entry(target).or_default().extend(loose);
            }
        }

        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for (index, core) in structured.iter().enumerate() {
            let mut members = (*core).clone();
            if let Some(extra) = attachments.get(&index) {
                members.extend(extra);
            }
            groups.push((core[0], members));
        }
        groups.extend(standalone.into_iter().map(|m| (m[0], m.clone())));
        groups.sort_by_key(|(first, _)| *first);

        let groups: Vec<IfeGroup> = groups
            .into_iter()
            .filter_map(|(_, members)| {
                IfeGroup::from_members(members.into_iter().map(|i| ifes[i].clone()))
            })
            .collect();

        debug!(
            chains = ifes.len(),
            groups = groups.len(),
            "Grouped chains into IFEs"
        );
        Ok(groups)
    }

    /// Whether any chain of the unstructured component `loose` interacts with
    /// a chain of the structured component `core` strongly enough to join it.
    fn bridges(
        &self,
        ifes: &[IfeChain],
        mixed: &InteractionMatrix,
        loose: &[usize],
        core: &[usize],
    ) -> bool {
        loose.iter().any(|&u| {
            core.iter().any(|&s| {
                let (u, s) = (&ifes[u], &ifes[s]);
                let count = mixed.symmetric_count(u.name(), s.name());
                count > 0 && self.should_join(u, s, count)
            })
        })
    }
}

/// Turns a union-find labeling into member lists, ordered by first member.
pub(crate) fn ordered_components(labels: Vec<usize>) -> Vec<Vec<usize>> {
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (index, label) in labels.into_iter().enumerate() {
        let slot = *slots.entry(label).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(index);
    }
    components
}
