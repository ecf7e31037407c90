use crate::core::models::ids::ChainDbId;
use std::collections::HashSet;
use unordered_pair::UnorderedPair;

/// Chain pairs that already have a stored discrepancy, independent of the
/// order the pair was stored in.
#[derive(Debug, Default, Clone)]
pub struct KnownPairs {
    pairs: HashSet<UnorderedPair<ChainDbId>>,
}

impl KnownPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (ChainDbId, ChainDbId)>) -> Self {
        let mut known = Self::new();
        for (a, b) in pairs {
            known.insert(a, b);
        }
        known
    }

    /// Returns whether the pair was new.
    pub fn insert(&mut self, a: ChainDbId, b: ChainDbId) -> bool {
        self.pairs.insert(UnorderedPair(a, b))
    }

    pub fn contains(&self, a: ChainDbId, b: ChainDbId) -> bool {
        self.pairs.contains(&UnorderedPair(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_pair_order() {
        let known = KnownPairs::from_pairs([(ChainDbId(1), ChainDbId(2))]);
        assert!(known.contains(ChainDbId(1), ChainDbId(2)));
        assert!(known.contains(ChainDbId(2), ChainDbId(1)));
        assert!(!known.contains(ChainDbId(1), ChainDbId(3)));
    }

    #[test]
    fn reversed_duplicates_collapse() {
        let mut known = KnownPairs::new();
        assert!(known.insert(ChainDbId(4), ChainDbId(5)));
        assert!(!known.insert(ChainDbId(5), ChainDbId(4)));
        assert_eq!(known.len(), 1);
    }
}
