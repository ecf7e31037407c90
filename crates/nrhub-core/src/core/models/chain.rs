use super::ids::ChainDbId;
use std::fmt;

/// Separator between the fields of a chain identifier (`PDB|model|chain`).
pub const CHAIN_ID_SEPARATOR: char = '|';

/// Whether a chain has enough internal base pairing to have a defined 3D fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structuredness {
    Structured,
    Unstructured,
}

impl Structuredness {
    pub fn is_structured(self) -> bool {
        self == Structuredness::Structured
    }
}

impl fmt::Display for Structuredness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Structuredness::Structured => "structured",
            Structuredness::Unstructured => "unstructured",
        })
    }
}

/// A chain of one structure, as delivered by the structure metadata provider.
///
/// `internal` is the number of interactions between nucleotides of this chain
/// and itself, `length` its nucleotide count. Both are precomputed upstream and
/// treated as immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub db_id: ChainDbId,
    pub pdb: String,
    pub model: u32,
    pub name: String,
    pub length: u32,
    pub internal: u32,
    pub species: Option<u32>,
    pub resolution: Option<f64>,
}

impl Chain {
    pub fn new(
        db_id: ChainDbId,
        pdb: impl Into<String>,
        model: u32,
        name: impl Into<String>,
        length: u32,
        internal: u32,
    ) -> Self {
        Self {
            db_id,
            pdb: pdb.into(),
            model,
            name: name.into(),
            length,
            internal,
            species: None,
            resolution: None,
        }
    }

    pub fn with_species(mut self, species: u32) -> Self {
        self.species = Some(species);
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// The chain identifier, `PDB|model|chain`.
    pub fn id(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.pdb,
            self.model,
            self.name,
            sep = CHAIN_ID_SEPARATOR
        )
    }

    /// Internal interactions per nucleotide. Zero-length chains report zero.
    pub fn bp_per_nt(&self) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            self.internal as f64 / self.length as f64
        }
    }

    /// Classifies the chain: structured iff it has at least `min_bp_count`
    /// internal interactions and at least `min_bp_per_nt` of them per
    /// nucleotide. A chain with no nucleotides is never structured.
    pub fn structuredness(&self, min_bp_count: u32, min_bp_per_nt: f64) -> Structuredness {
        if self.length > 0 && self.internal >= min_bp_count && self.bp_per_nt() >= min_bp_per_nt {
            Structuredness::Structured
        } else {
            Structuredness::Unstructured
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
