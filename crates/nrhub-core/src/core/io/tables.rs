use super::records::{
    CenterRow, ChainRow, CorrespondenceRow, CorrespondenceUnitRow, ExpSeqMappingRow, ExpSeqRow,
    IfeChainRow, InteractionRow, RotationRow,
};
use super::traits::{
    ChainInfoSource, CorrespondenceStore, DiscrepancySink, GeometryQuery, GeometryStore,
    StoreError, StructureSource,
};
use crate::core::models::chain::Chain;
use crate::core::models::correspondence::{
    AlignedChain, CorrespondenceRecord, ExpSeqInfo, UnitCorrespondence,
};
use crate::core::models::discrepancy::DiscrepancyEntry;
use crate::core::models::ids::{ChainDbId, CorrespondenceId, ExpSeqId};
use crate::core::models::info::IfeMembership;
use crate::core::models::interactions::InteractionMatrix;
use crate::core::models::unit::{UnitGeometry, UnitId, UnitPose};
use itertools::Itertools;
use nalgebra::{Matrix3, Vector3};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

pub const CHAINS_FILE: &str = "chains.csv";
pub const INTERACTIONS_FILE: &str = "interactions.csv";
pub const IFE_CHAINS_FILE: &str = "ife_chains.csv";
pub const UNIT_CENTERS_FILE: &str = "unit_centers.csv";
pub const UNIT_ROTATIONS_FILE: &str = "unit_rotations.csv";
pub const EXP_SEQ_INFO_FILE: &str = "exp_seq_info.csv";
pub const EXP_SEQ_MAPPING_FILE: &str = "exp_seq_chain_mapping.csv";
pub const CORRESPONDENCE_INFO_FILE: &str = "correspondence_info.csv";
pub const CORRESPONDENCE_UNITS_FILE: &str = "correspondence_units.csv";
pub const SIMILARITY_FILE: &str = "chain_chain_similarity.csv";

/// `(pdb, chain name)`, the key unit geometry is indexed by.
type ChainKey = (String, String);

/// Geometry records of one chain, keyed by raw unit id.
type ChainFrames<T> = BTreeMap<String, (UnitId, T)>;

fn chain_key(pdb: &str, chain: &str) -> ChainKey {
    (pdb.to_string(), chain.to_string())
}

#[derive(Debug, Clone)]
struct IfeLink {
    ife_id: String,
    chain_id: ChainDbId,
    new_style: bool,
}

/// An in-memory store over the pipeline's CSV tables.
///
/// Built either from a directory with [`TableStore::load_dir`] or piece by
/// piece with the `with_*` methods. All lookups are served from memory; the
/// discrepancy table is the only mutable part and sits behind a lock so
/// comparison and persistence can share one store.
#[derive(Debug, Default)]
pub struct TableStore {
    chains: Vec<Chain>,
    interactions: HashMap<String, InteractionMatrix>,
    ife_links: Vec<IfeLink>,
    centers: HashMap<ChainKey, ChainFrames<Vector3<f64>>>,
    rotations: HashMap<ChainKey, ChainFrames<Matrix3<f64>>>,
    sequences: BTreeMap<ExpSeqId, u32>,
    sequence_chains: Vec<(ExpSeqId, ChainDbId)>,
    correspondences: Vec<CorrespondenceRecord>,
    aligned_units: Vec<UnitCorrespondence>,
    similarity: RwLock<Vec<DiscrepancyEntry>>,
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Reads every row of `dir/name`. An absent optional table reads as empty.
fn read_table<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
    required: bool,
) -> Result<Vec<T>, StoreError> {
    let path = dir.join(name);
    if !required && !path.exists() {
        debug!(table = name, "Optional table absent, treating as empty");
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(&path).map_err(|e| StoreError::Csv {
        path: path_string(&path),
        source: e,
    })?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| StoreError::Csv {
            path: path_string(&path),
            source: e,
        })
}

fn parse_unit(dir: &Path, name: &str, raw: &str) -> Result<UnitId, StoreError> {
    raw.parse().map_err(|e| StoreError::MalformedUnitId {
        path: path_string(&dir.join(name)),
        source: e,
    })
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every table from `dir`. Only `chains.csv` is required.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] when a table cannot be opened or parsed and
    /// [`StoreError::MalformedUnitId`] when a unit id column holds something
    /// that is not a unit id.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let mut store = Self::new();

        for row in read_table::<ChainRow>(dir, CHAINS_FILE, true)? {
            let mut chain = Chain::new(
                row.chain_id,
                row.pdb,
                row.model,
                row.chain_name,
                row.length,
                row.internal,
            );
            chain.species = row.species_id;
            chain.resolution = row.resolution;
            store.chains.push(chain);
        }

        for row in read_table::<InteractionRow>(dir, INTERACTIONS_FILE, false)? {
            store = store.with_interaction(&row.pdb, row.chain_1, row.chain_2, row.count);
        }

        for row in read_table::<IfeChainRow>(dir, IFE_CHAINS_FILE, false)? {
            store = store.with_ife_chain(row.ife_id, row.chain_id, row.new_style);
        }

        for row in read_table::<CenterRow>(dir, UNIT_CENTERS_FILE, false)? {
            let unit = parse_unit(dir, UNIT_CENTERS_FILE, &row.unit_id)?;
            store = store.with_center(unit, row.center());
        }

        for row in read_table::<RotationRow>(dir, UNIT_ROTATIONS_FILE, false)? {
            let unit = parse_unit(dir, UNIT_ROTATIONS_FILE, &row.unit_id)?;
            store = store.with_rotation(unit, row.rotation());
        }

        for row in read_table::<ExpSeqRow>(dir, EXP_SEQ_INFO_FILE, false)? {
            store = store.with_sequence(row.exp_seq_id, row.length);
        }

        for row in read_table::<ExpSeqMappingRow>(dir, EXP_SEQ_MAPPING_FILE, false)? {
            store = store.with_sequence_chain(row.exp_seq_id, row.chain_id);
        }

        for row in read_table::<CorrespondenceRow>(dir, CORRESPONDENCE_INFO_FILE, false)? {
            store = store.with_correspondence(CorrespondenceRecord {
                correspondence_id: row.correspondence_id,
                exp_seq_id_1: row.exp_seq_id_1,
                exp_seq_id_2: row.exp_seq_id_2,
                good_alignment: row.good_alignment,
            });
        }

        for row in read_table::<CorrespondenceUnitRow>(dir, CORRESPONDENCE_UNITS_FILE, false)? {
            store = store.with_aligned_unit(UnitCorrespondence {
                correspondence_id: row.correspondence_id,
                index: row.correspondence_index,
                unit_id_1: row.unit_id_1,
                unit_id_2: row.unit_id_2,
            });
        }

        let similarity = read_table::<DiscrepancyEntry>(dir, SIMILARITY_FILE, false)?;
        store.similarity = RwLock::new(similarity);

        debug!(
            chains = store.chains.len(),
            centers = store.centers.values().map(BTreeMap::len).sum::<usize>(),
            rotations = store.rotations.values().map(BTreeMap::len).sum::<usize>(),
            correspondences = store.correspondences.len(),
            "Loaded table store"
        );
        Ok(store)
    }

    /// Writes the discrepancy table to `dir/chain_chain_similarity.csv`,
    /// replacing any previous content.
    pub fn save_discrepancies(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = dir.as_ref().join(SIMILARITY_FILE);
        let entries = self.discrepancies()?;
        let mut writer = csv::Writer::from_path(&path).map_err(|e| StoreError::Csv {
            path: path_string(&path),
            source: e,
        })?;
        for entry in &entries {
            writer.serialize(entry).map_err(|e| StoreError::Csv {
                path: path_string(&path),
                source: e,
            })?;
        }
        writer.flush().map_err(|e| StoreError::Io {
            path: path_string(&path),
            source: e,
        })
    }

    /// A snapshot of every stored discrepancy row.
    pub fn discrepancies(&self) -> Result<Vec<DiscrepancyEntry>, StoreError> {
        let guard = self.similarity.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    /// Every structure with at least one chain, in first-seen order.
    pub fn pdbs(&self) -> Vec<String> {
        self.chains.iter().map(|c| c.pdb.clone()).unique().collect()
    }

    pub fn chain(&self, chain_id: ChainDbId) -> Option<&Chain> {
        self.chains.iter().find(|c| c.db_id == chain_id)
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Records a directed interaction count between two chains of `pdb`.
    pub fn with_interaction(
        mut self,
        pdb: &str,
        chain_1: impl Into<String>,
        chain_2: impl Into<String>,
        count: u32,
    ) -> Self {
        self.interactions
            .entry(pdb.to_string())
            .or_default()
            .set(chain_1, chain_2, count);
        self
    }

    pub fn with_ife_chain(
        mut self,
        ife_id: impl Into<String>,
        chain_id: ChainDbId,
        new_style: bool,
    ) -> Self {
        self.ife_links.push(IfeLink {
            ife_id: ife_id.into(),
            chain_id,
            new_style,
        });
        self
    }

    pub fn with_center(mut self, unit: UnitId, center: Vector3<f64>) -> Self {
        self.centers
            .entry(chain_key(&unit.pdb, &unit.chain))
            .or_default()
            .insert(unit.as_str().to_string(), (unit, center));
        self
    }

    pub fn with_rotation(mut self, unit: UnitId, rotation: Matrix3<f64>) -> Self {
        self.rotations
            .entry(chain_key(&unit.pdb, &unit.chain))
            .or_default()
            .insert(unit.as_str().to_string(), (unit, rotation));
        self
    }

    /// Records both the center and the rotation of a unit.
    pub fn with_unit(self, unit: UnitId, center: Vector3<f64>, rotation: Matrix3<f64>) -> Self {
        self.with_center(unit.clone(), center)
            .with_rotation(unit, rotation)
    }

    pub fn with_sequence(mut self, exp_seq_id: ExpSeqId, length: u32) -> Self {
        self.sequences.insert(exp_seq_id, length);
        self
    }

    pub fn with_sequence_chain(mut self, exp_seq_id: ExpSeqId, chain_id: ChainDbId) -> Self {
        self.sequence_chains.push((exp_seq_id, chain_id));
        self
    }

    pub fn with_correspondence(mut self, record: CorrespondenceRecord) -> Self {
        self.correspondences.push(record);
        self
    }

    pub fn with_aligned_unit(mut self, unit: UnitCorrespondence) -> Self {
        self.aligned_units.push(unit);
        self
    }

    pub fn with_discrepancy(self, entry: DiscrepancyEntry) -> Self {
        match self.similarity.write() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        self
    }

    fn matches(unit: &UnitId, query: &GeometryQuery<'_>) -> bool {
        unit.pdb == query.pdb
            && unit.chain == query.chain
            && unit.model == query.model
            && unit.effective_sym_op() == query.sym_op
    }

    fn any_frame<T>(frames: &HashMap<ChainKey, ChainFrames<T>>, query: &GeometryQuery<'_>) -> bool {
        frames
            .get(&chain_key(query.pdb, query.chain))
            .is_some_and(|units| units.values().any(|(unit, _)| Self::matches(unit, query)))
    }

    /// Units of a chain carrying both geometry records, in unit id order.
    fn complete_units<'a>(
        &'a self,
        pdb: &'a str,
        chain: &'a str,
    ) -> impl Iterator<Item = (&'a UnitId, &'a Vector3<f64>, &'a Matrix3<f64>)> + 'a {
        let key = chain_key(pdb, chain);
        let rotations = self.rotations.get(&key);
        self.centers
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(move |(raw, (unit, center))| {
                rotations
                    .and_then(|frames| frames.get(raw))
                    .map(|(_, rotation)| (unit, center, rotation))
            })
    }
}

impl StructureSource for TableStore {
    fn chains(&self, pdb: &str) -> Result<Vec<Chain>, StoreError> {
        Ok(self
            .chains
            .iter()
            .filter(|c| c.pdb == pdb)
            .cloned()
            .collect())
    }

    fn interactions(&self, pdb: &str) -> Result<InteractionMatrix, StoreError> {
        Ok(self.interactions.get(pdb).cloned().unwrap_or_default())
    }
}

impl ChainInfoSource for TableStore {
    fn ife_memberships(&self, chain_id: ChainDbId) -> Result<Vec<IfeMembership>, StoreError> {
        let Some(chain) = self.chain(chain_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .ife_links
            .iter()
            .filter(|link| link.new_style && link.chain_id == chain_id)
            .map(|link| IfeMembership {
                chain_id,
                chain_name: chain.name.clone(),
                pdb: chain.pdb.clone(),
                model: chain.model,
                ife_id: link.ife_id.clone(),
            })
            .collect())
    }

    fn observed_poses(&self, chain_id: ChainDbId) -> Result<Vec<UnitPose>, StoreError> {
        let Some(chain) = self.chain(chain_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .complete_units(&chain.pdb, &chain.name)
            .map(|(unit, _, _)| unit.pose())
            .unique()
            .collect())
    }
}

impl GeometryStore for TableStore {
    fn has_centers(&self, query: &GeometryQuery<'_>) -> Result<bool, StoreError> {
        Ok(Self::any_frame(&self.centers, query))
    }

    fn has_rotations(&self, query: &GeometryQuery<'_>) -> Result<bool, StoreError> {
        Ok(Self::any_frame(&self.rotations, query))
    }

    fn chains_with_centers(&self) -> Result<HashSet<(String, String)>, StoreError> {
        Ok(self.centers.keys().cloned().collect())
    }

    fn chains_with_rotations(&self) -> Result<HashSet<(String, String)>, StoreError> {
        Ok(self.rotations.keys().cloned().collect())
    }

    fn chain_units(&self, pdb: &str, chain: &str) -> Result<Vec<UnitGeometry>, StoreError> {
        Ok(self
            .complete_units(pdb, chain)
            .map(|(unit, center, rotation)| UnitGeometry {
                unit_id: unit.clone(),
                center: *center,
                rotation: *rotation,
            })
            .collect())
    }
}

fn belongs_to(raw_unit: &str, chain: &AlignedChain) -> bool {
    let mut fields = raw_unit.split('|');
    let pdb = fields.next();
    let _model = fields.next();
    let name = fields.next();
    pdb == Some(chain.pdb.as_str()) && name == Some(chain.chain_name.as_str())
}

impl CorrespondenceStore for TableStore {
    fn sequence_ids(&self, chain_id: ChainDbId) -> Result<Vec<ExpSeqId>, StoreError> {
        Ok(self
            .sequence_chains
            .iter()
            .filter(|(_, chain)| *chain == chain_id)
            .map(|(exp_seq, _)| *exp_seq)
            .unique()
            .collect())
    }

    fn correspondences(
        &self,
        exp_seq_1: ExpSeqId,
        exp_seq_2: ExpSeqId,
    ) -> Result<Vec<CorrespondenceRecord>, StoreError> {
        Ok(self
            .correspondences
            .iter()
            .filter(|r| r.exp_seq_id_1 == exp_seq_1 && r.exp_seq_id_2 == exp_seq_2)
            .copied()
            .collect())
    }

    fn aligned_units(
        &self,
        correspondence_id: CorrespondenceId,
        first: &AlignedChain,
        second: &AlignedChain,
    ) -> Result<Vec<UnitCorrespondence>, StoreError> {
        Ok(self
            .aligned_units
            .iter()
            .filter(|u| u.correspondence_id == correspondence_id)
            .filter(|u| belongs_to(&u.unit_id_1, first) && belongs_to(&u.unit_id_2, second))
            .unique()
            .sorted_by_key(|u| u.index)
            .cloned()
            .collect())
    }

    fn sequences(&self) -> Result<Vec<ExpSeqInfo>, StoreError> {
        Ok(self
            .sequences
            .iter()
            .map(|(&exp_seq_id, &length)| {
                let species = self
                    .sequence_chains
                    .iter()
                    .filter(|(id, _)| *id == exp_seq_id)
                    .filter_map(|(_, chain_id)| self.chain(*chain_id))
                    .map(|chain| chain.species)
                    .unique()
                    .collect();
                ExpSeqInfo {
                    exp_seq_id,
                    length,
                    species,
                }
            })
            .collect())
    }

    fn sequences_for_pdb(&self, pdb: &str) -> Result<Vec<(ExpSeqId, Option<u32>)>, StoreError> {
        let species: HashMap<ChainDbId, Option<u32>> = self
            .chains
            .iter()
            .filter(|c| c.pdb == pdb)
            .map(|c| (c.db_id, c.species))
            .collect();
        Ok(self
            .sequence_chains
            .iter()
            .filter_map(|(exp_seq, chain)| species.get(chain).map(|s| (*exp_seq, *s)))
            .unique()
            .collect())
    }
}

impl DiscrepancySink for TableStore {
    fn known_pairs(
        &self,
        chain: ChainDbId,
        candidates: &[ChainDbId],
    ) -> Result<Vec<(ChainDbId, ChainDbId)>, StoreError> {
        let guard = self.similarity.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .iter()
            .filter(|e| {
                (e.chain_id_1 == chain && candidates.contains(&e.chain_id_2))
                    || (e.chain_id_2 == chain && candidates.contains(&e.chain_id_1))
            })
            .map(|e| (e.chain_id_1, e.chain_id_2))
            .collect())
    }

    fn insert(&self, entries: &[DiscrepancyEntry]) -> Result<(), StoreError> {
        let mut guard = self.similarity.write().map_err(|_| StoreError::Poisoned)?;
        guard.extend_from_slice(entries);
        Ok(())
    }
}
