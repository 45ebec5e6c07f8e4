use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The textual encoding of a molecule's connection table.
///
/// The library never interprets the structure itself; it only records which encoding the
/// chemistry toolkit has to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// A SMILES string.
    Smiles,
    /// An MDL molblock (one SDF record without the `$$$$` terminator).
    Molblock,
}

/// One 3D embedding of a molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conformer {
    /// Conformer id, unique within its molecule.
    pub id: usize,
    /// Atomic coordinates in Angstroms, in the atom order of the parent structure.
    pub positions: Vec<Point3<f64>>,
    /// Force-field energy in kcal/mol, once computed.
    #[serde(default)]
    pub energy: Option<f64>,
}

impl Conformer {
    pub fn new(id: usize, positions: Vec<Point3<f64>>) -> Self {
        Self {
            id,
            positions,
            energy: None,
        }
    }

    #[inline]
    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }
}

/// A chemical structure together with the conformers attached to it.
///
/// The structure is kept in the toolkit-native text form (`structure` + `format`), so a
/// `Molecule` can be shipped to a worker, to an external toolkit process or to the record
/// store without any chemistry-aware serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// The connection table, encoded according to `format`.
    pub structure: String,
    /// The encoding of `structure`.
    pub format: StructureFormat,
    /// Attached 3D conformers, in storage order.
    #[serde(default)]
    pub conformers: Vec<Conformer>,
}

impl Molecule {
    pub fn new(structure: impl Into<String>, format: StructureFormat) -> Self {
        Self {
            structure: structure.into(),
            format,
            conformers: Vec::new(),
        }
    }

    pub fn from_smiles(smiles: impl Into<String>) -> Self {
        Self::new(smiles, StructureFormat::Smiles)
    }

    pub fn from_molblock(molblock: impl Into<String>) -> Self {
        Self::new(molblock, StructureFormat::Molblock)
    }

    /// Returns a copy of this molecule carrying the given conformers instead of its own.
    pub fn with_conformers(&self, conformers: Vec<Conformer>) -> Self {
        Self {
            structure: self.structure.clone(),
            format: self.format,
            conformers,
        }
    }

    #[inline]
    pub fn num_conformers(&self) -> usize {
        self.conformers.len()
    }

    pub fn conformer(&self, id: usize) -> Option<&Conformer> {
        self.conformers.iter().find(|c| c.id == id)
    }

    pub fn conformer_ids(&self) -> Vec<usize> {
        self.conformers.iter().map(|c| c.id).collect()
    }

    /// Removes every conformer whose id is in `ids`. Returns the number removed.
    pub fn remove_conformers(&mut self, ids: &BTreeSet<usize>) -> usize {
        let before = self.conformers.len();
        self.conformers.retain(|c| !ids.contains(&c.id));
        before - self.conformers.len()
    }

    /// Re-assigns conformer ids to `0..n` following the storage order.
    pub fn renumber_conformers(&mut self) {
        for (new_id, conformer) in self.conformers.iter_mut().enumerate() {
            conformer.id = new_id;
        }
    }
}
