use super::ids::ChainDbId;
use super::ife::IFE_SEPARATOR;

/// One row of the chain/IFE join: the chain and the (new style) IFE it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfeMembership {
    pub chain_id: ChainDbId,
    pub chain_name: String,
    pub pdb: String,
    pub model: u32,
    pub ife_id: String,
}

/// Everything needed to pull a chain's geometry for comparison: its IFE, and
/// the symmetry operator and alternate location chosen for its units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: ChainDbId,
    pub chain_name: String,
    pub pdb: String,
    pub model: u32,
    pub ife_id: String,
    pub sym_op: String,
    pub alt_id: Option<String>,
    pub display_name: String,
}

impl ChainInfo {
    pub fn new(membership: IfeMembership, sym_op: String, alt_id: Option<String>) -> Self {
        let display_name = format!("{}{}{}", membership.ife_id, IFE_SEPARATOR, sym_op);
        Self {
            chain_id: membership.chain_id,
            chain_name: membership.chain_name,
            pdb: membership.pdb,
            model: membership.model,
            ife_id: membership.ife_id,
            sym_op,
            alt_id,
            display_name,
        }
    }

    /// The `(pdb, chain)` pairs of every chain in this chain's IFE, taken from
    /// the `PDB|model|chain` parts of the IFE identifier.
    pub fn ife_chains(&self) -> Vec<(String, String)> {
        self.ife_id
            .split(IFE_SEPARATOR)
            .filter_map(|part| {
                let mut fields = part.split('|');
                let pdb = fields.next()?;
                let _model = fields.next()?;
                let chain = fields.next()?;
                Some((pdb.to_string(), chain.to_string()))
            })
            .collect()
    }
}
