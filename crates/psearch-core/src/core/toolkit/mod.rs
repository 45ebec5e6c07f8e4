//! The interface to the cheminformatics toolkit.
//!
//! Stereo perception and enumeration, conformer embedding, force-field evaluation and
//! SMARTS-based feature perception are not implemented by this crate. The generation engine
//! only sequences and filters their results, and reaches them exclusively through
//! [`ChemToolkit`]. [`external::ExternalToolkit`] drives a helper program over a JSON
//! protocol; library users may provide their own implementation.

pub mod external;

#[cfg(test)]
pub(crate) mod testing;

use crate::core::models::features::FeaturePoint;
use crate::core::models::molecule::{Conformer, Molecule};
use crate::core::pharmacophore::definitions::FeatureDefinitions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Random seed used for conformer embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seed {
    /// Non-deterministic embedding.
    #[default]
    Unseeded,
    /// Reproducible embedding from the given seed.
    Fixed(u64),
}

impl Seed {
    /// Interprets the command-line convention: any negative value means "no seed".
    pub fn from_signed(value: i64) -> Self {
        if value < 0 {
            Seed::Unseeded
        } else {
            Seed::Fixed(value as u64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereoOptions {
    /// Upper bound on the number of isomers returned.
    pub max_isomers: usize,
    /// Reject isomers that cannot be embedded in 3D when alternatives exist.
    pub try_embedding: bool,
    /// Only enumerate stereo elements that are not explicitly specified.
    pub only_unassigned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub num_conformers: usize,
    pub max_attempts: usize,
    pub seed: Seed,
}

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Force field is not available for this molecule: {0}")]
    ForceFieldUnavailable(String),

    #[error("Conformer embedding failed: {0}")]
    Embedding(String),

    #[error("Toolkit process error: {0}")]
    Process(String),

    #[error("Toolkit protocol error: {0}")]
    Protocol(String),

    #[error("Toolkit I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolkitError {
    /// Recoverable errors concern a single molecule; the run continues without it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolkitError::InvalidStructure(_)
                | ToolkitError::ForceFieldUnavailable(_)
                | ToolkitError::Embedding(_)
        )
    }
}

/// The chemistry operations required by the generation engine.
///
/// Implementations must be shareable across worker threads and must not keep per-molecule
/// mutable state: every call receives everything it needs and returns new values.
pub trait ChemToolkit: Send + Sync {
    /// A normalized textual representation that is identical for equivalent structures.
    fn canonical_smiles(&self, molecule: &Molecule) -> Result<String, ToolkitError>;

    /// Assigns stereochemistry and enumerates stereoisomers.
    fn enumerate_stereoisomers(
        &self,
        molecule: &Molecule,
        options: &StereoOptions,
    ) -> Result<Vec<Molecule>, ToolkitError>;

    /// Returns the molecule with explicit hydrogens.
    fn add_hydrogens(&self, molecule: &Molecule) -> Result<Molecule, ToolkitError>;

    /// Embeds up to `options.num_conformers` 3D conformers. Returning fewer (or none) is
    /// not an error.
    fn embed_conformers(
        &self,
        molecule: &Molecule,
        options: &EmbedOptions,
    ) -> Result<Vec<Conformer>, ToolkitError>;

    /// Locally minimizes one conformer with the toolkit's force field.
    fn minimize(&self, molecule: &Molecule, conformer: &Conformer)
    -> Result<Conformer, ToolkitError>;

    /// Force-field energy of one conformer in kcal/mol.
    ///
    /// Fails with [`ToolkitError::ForceFieldUnavailable`] when the molecule cannot be typed.
    fn conformer_energy(&self, molecule: &Molecule, conformer: &Conformer)
    -> Result<f64, ToolkitError>;

    /// Perceives the pharmacophore features of one conformer.
    fn feature_points(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
        definitions: &FeatureDefinitions,
    ) -> Result<Vec<FeaturePoint>, ToolkitError>;
}
