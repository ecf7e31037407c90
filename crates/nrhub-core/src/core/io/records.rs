use crate::core::models::ids::{ChainDbId, CorrespondenceId, ExpSeqId};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Deserializer, de};

/// Accepts `1`/`0` as written by database dumps as well as `true`/`false`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Ok(true),
        "0" | "false" | "f" | "no" | "" => Ok(false),
        other => Err(de::Error::custom(format!("invalid flag value '{other}'"))),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChainRow {
    pub chain_id: ChainDbId,
    pub pdb: String,
    pub model: u32,
    pub chain_name: String,
    pub length: u32,
    pub internal: u32,
    #[serde(default)]
    pub species_id: Option<u32>,
    #[serde(default)]
    pub resolution: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InteractionRow {
    pub pdb: String,
    pub chain_1: String,
    pub chain_2: String,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IfeChainRow {
    pub ife_id: String,
    pub chain_id: ChainDbId,
    #[serde(deserialize_with = "flag")]
    pub new_style: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CenterRow {
    pub unit_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CenterRow {
    pub fn center(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RotationRow {
    pub unit_id: String,
    pub cell_0_0: f64,
    pub cell_0_1: f64,
    pub cell_0_2: f64,
    pub cell_1_0: f64,
    pub cell_1_1: f64,
    pub cell_1_2: f64,
    pub cell_2_0: f64,
    pub cell_2_1: f64,
    pub cell_2_2: f64,
}

impl RotationRow {
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.cell_0_0,
            self.cell_0_1,
            self.cell_0_2,
            self.cell_1_0,
            self.cell_1_1,
            self.cell_1_2,
            self.cell_2_0,
            self.cell_2_1,
            self.cell_2_2,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpSeqRow {
    pub exp_seq_id: ExpSeqId,
    pub length: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpSeqMappingRow {
    pub exp_seq_id: ExpSeqId,
    pub chain_id: ChainDbId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrespondenceRow {
    pub correspondence_id: CorrespondenceId,
    pub exp_seq_id_1: ExpSeqId,
    pub exp_seq_id_2: ExpSeqId,
    #[serde(deserialize_with = "flag")]
    pub good_alignment: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrespondenceUnitRow {
    pub correspondence_id: CorrespondenceId,
    pub correspondence_index: u32,
    pub unit_id_1: String,
    pub unit_id_2: String,
}
