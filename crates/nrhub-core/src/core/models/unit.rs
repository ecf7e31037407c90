use nalgebra::{Matrix3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const UNIT_ID_SEPARATOR: char = '|';
const MIN_UNIT_ID_FIELDS: usize = 5;

/// Symmetry operator of a unit whose identifier carries no sym_op field.
pub const DEFAULT_SYM_OP: &str = "1_555";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseUnitIdError {
    #[error("Unit id '{0}' has fewer than 5 fields")]
    TooFewFields(String),
    #[error("Unit id '{id}' has a non-numeric model '{model}'")]
    InvalidModel { id: String, model: String },
}

/// A parsed unit (nucleotide) identifier.
///
/// Layout: `PDB|model|chain|component|number|atom|alt_id|insertion|sym_op`,
/// where everything after `number` is optional and empty fields mean "not
/// set". The raw text is kept so the id can be used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    raw: String,
    pub pdb: String,
    pub model: u32,
    pub chain: String,
    pub alt_id: Option<String>,
    pub sym_op: Option<String>,
}

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The symmetry operator, [`DEFAULT_SYM_OP`] when the id has none.
    pub fn effective_sym_op(&self) -> &str {
        self.sym_op.as_deref().unwrap_or(DEFAULT_SYM_OP)
    }

    pub fn pose(&self) -> UnitPose {
        UnitPose {
            sym_op: self.effective_sym_op().to_string(),
            alt_id: self.alt_id.clone(),
        }
    }
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field.filter(|f| !f.is_empty()).map(str::to_string)
}

impl FromStr for UnitId {
    type Err = ParseUnitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(UNIT_ID_SEPARATOR).collect();
        if fields.len() < MIN_UNIT_ID_FIELDS {
            return Err(ParseUnitIdError::TooFewFields(s.to_string()));
        }
        let model = fields[1]
            .parse()
            .map_err(|_| ParseUnitIdError::InvalidModel {
                id: s.to_string(),
                model: fields[1].to_string(),
            })?;
        Ok(Self {
            raw: s.to_string(),
            pdb: fields[0].to_string(),
            model,
            chain: fields[2].to_string(),
            alt_id: non_empty(fields.get(6).copied()),
            sym_op: non_empty(fields.get(8).copied()),
        })
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Symmetry operator and alternate location observed for a chain's units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitPose {
    pub sym_op: String,
    pub alt_id: Option<String>,
}

/// Base center and local rotation frame of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitGeometry {
    pub unit_id: UnitId,
    pub center: Vector3<f64>,
    pub rotation: Matrix3<f64>,
}
