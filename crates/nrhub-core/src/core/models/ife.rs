use super::chain::{Chain, Structuredness};
use itertools::Itertools;

/// Separator used when joining member chain identifiers into an IFE identifier.
pub const IFE_SEPARATOR: char = '+';

/// A chain tagged with its structuredness, the unit the grouper works on.
#[derive(Debug, Clone, PartialEq)]
pub struct IfeChain {
    chain: Chain,
    structuredness: Structuredness,
}

impl IfeChain {
    pub fn new(chain: Chain, structuredness: Structuredness) -> Self {
        Self {
            chain,
            structuredness,
        }
    }

    pub fn classify(chain: Chain, min_bp_count: u32, min_bp_per_nt: f64) -> Self {
        let structuredness = chain.structuredness(min_bp_count, min_bp_per_nt);
        Self::new(chain, structuredness)
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn id(&self) -> String {
        self.chain.id()
    }

    pub fn name(&self) -> &str {
        &self.chain.name
    }

    pub fn internal(&self) -> u32 {
        self.chain.internal
    }

    pub fn structuredness(&self) -> Structuredness {
        self.structuredness
    }

    pub fn is_structured(&self) -> bool {
        self.structuredness.is_structured()
    }
}

/// An ordered, deduplicated set of chains forming one IFE.
///
/// The identifier joins the member identifiers with [`IFE_SEPARATOR`] in
/// insertion order. When the group holds structured chains only those name
/// the group; unstructured chains attached to a structured group are members
/// but not part of its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct IfeGroup {
    members: Vec<IfeChain>,
}

impl IfeGroup {
    pub fn new(first: IfeChain) -> Self {
        Self {
            members: vec![first],
        }
    }

    /// Builds a group from `members`, dropping repeated chains. Returns `None`
    /// when `members` is empty.
    pub fn from_members(members: impl IntoIterator<Item = IfeChain>) -> Option<Self> {
        let mut members = members.into_iter();
        let mut group = Self::new(members.next()?);
        for member in members {
            group.add(member);
        }
        Some(group)
    }

    /// Adds `chain` unless a chain with the same identifier is already a
    /// member. Returns whether it was added.
    pub fn add(&mut self, chain: IfeChain) -> bool {
        if self.contains(&chain.id()) {
            return false;
        }
        self.members.push(chain);
        true
    }

    pub fn chains(&self) -> &[IfeChain] {
        &self.members
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.members.iter().any(|m| m.id() == chain_id)
    }

    pub fn is_structured(&self) -> bool {
        self.members.iter().any(IfeChain::is_structured)
    }

    /// The first member, used as the IFE's representative chain downstream.
    pub fn representative(&self) -> &IfeChain {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn id(&self) -> String {
        let structured = self.is_structured();
        self.members
            .iter()
            .filter(|m| !structured || m.is_structured())
            .map(IfeChain::id)
            .join(&IFE_SEPARATOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ChainDbId;

    fn ife(name: &str, structuredness: Structuredness) -> IfeChain {
        IfeChain::new(
            Chain::new(ChainDbId(1), "1S72", 1, name, 10, 0),
            structuredness,
        )
    }

    #[test]
    fn id_uses_insertion_order() {
        let group = IfeGroup::from_members([
            ife("C", Structuredness::Unstructured),
            ife("B", Structuredness::Unstructured),
        ])
        .unwrap();
        assert_eq!(group.id(), "1S72|1|C+1S72|1|B");
    }

    #[test]
    fn id_of_mixed_group_names_only_structured_members() {
        let mut group = IfeGroup::new(ife("A", Structuredness::Structured));
        group.add(ife("C", Structuredness::Unstructured));
        assert_eq!(group.id(), "1S72|1|A");
        assert_eq!(group.len(), 2);
        assert!(group.contains("1S72|1|C"));
    }

    #[test]
    fn add_deduplicates_members() {
        let mut group = IfeGroup::new(ife("A", Structuredness::Structured));
        assert!(!group.add(ife("A", Structuredness::Structured)));
        assert!(group.add(ife("B", Structuredness::Structured)));
        assert_eq!(group.id(), "1S72|1|A+1S72|1|B");
    }

    #[test]
    fn from_members_of_nothing_is_none() {
        assert!(IfeGroup::from_members(Vec::new()).is_none());
    }

    #[test]
    fn classify_applies_thresholds() {
        let chain = Chain::new(ChainDbId(1), "1S72", 1, "A", 10, 10);
        assert!(IfeChain::classify(chain, 5, 0.5).is_structured());
    }
}
