use std::collections::HashMap;

/// Sparse interaction counts between chains of one structure, keyed by chain
/// name.
///
/// The supplier may populate only one direction of a pair; absent entries read
/// as zero. [`InteractionMatrix::count`] is a directed lookup, while
/// [`InteractionMatrix::symmetric_count`] consults both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionMatrix {
    counts: HashMap<String, HashMap<String, u32>>,
}

impl InteractionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a matrix from directed `(a, b, count)` entries. Later entries for
    /// the same directed pair overwrite earlier ones.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, u32)>,
        S: Into<String>,
    {
        let mut matrix = Self::new();
        for (a, b, count) in entries {
            matrix.set(a, b, count);
        }
        matrix
    }

    /// Builds a matrix holding every entry in both directions.
    pub fn symmetric<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, u32)>,
        S: Into<String>,
    {
        let mut matrix = Self::new();
        for (a, b, count) in entries {
            let (a, b) = (a.into(), b.into());
            matrix.set(b.clone(), a.clone(), count);
            matrix.set(a, b, count);
        }
        matrix
    }

    pub fn set(&mut self, a: impl Into<String>, b: impl Into<String>, count: u32) {
        self.counts
            .entry(a.into())
            .or_default()
            .insert(b.into(), count);
    }

    /// The directed count for `(a, b)`, zero when absent.
    pub fn count(&self, a: &str, b: &str) -> u32 {
        self.counts
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// The larger of the two directed counts between `a` and `b`.
    pub fn symmetric_count(&self, a: &str, b: &str) -> u32 {
        self.count(a, b).max(self.count(b, a))
    }

    /// Whether `chain` has a non-zero count to any chain other than itself, in
    /// either direction.
    pub fn has_partners(&self, chain: &str) -> bool {
        let outgoing = self
            .counts
            .get(chain)
            .is_some_and(|row| row.iter().any(|(b, &n)| b != chain && n > 0));
        outgoing
            || self
                .counts
                .iter()
                .any(|(a, row)| a != chain && row.get(chain).is_some_and(|&n| n > 0))
    }

    /// Number of directed entries stored, zeros included.
    pub fn len(&self) -> usize {
        self.counts.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.counts.iter().flat_map(|(a, row)| {
            row.iter()
                .map(move |(b, &count)| (a.as_str(), b.as_str(), count))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_read_as_zero() {
        let matrix = InteractionMatrix::new();
        assert_eq!(matrix.count("A", "B"), 0);
        assert!(matrix.is_empty());
    }

    #[test]
    fn count_is_directed_and_symmetric_count_is_not() {
        let matrix = InteractionMatrix::from_entries([("A", "B", 4)]);
        assert_eq!(matrix.count("A", "B"), 4);
        assert_eq!(matrix.count("B", "A"), 0);
        assert_eq!(matrix.symmetric_count("B", "A"), 4);
    }

    #[test]
    fn symmetric_constructor_populates_both_directions() {
        let matrix = InteractionMatrix::symmetric([("A", "B", 3)]);
        assert_eq!(matrix.count("A", "B"), 3);
        assert_eq!(matrix.count("B", "A"), 3);
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn has_partners_ignores_self_pairs_and_zeros() {
        let matrix = InteractionMatrix::from_entries([("A", "A", 9), ("A", "B", 0), ("C", "D", 1)]);
        assert!(!matrix.has_partners("A"));
        assert!(!matrix.has_partners("B"));
        assert!(matrix.has_partners("C"));
        assert!(matrix.has_partners("D"));
    }
}
