use super::error::EngineError;
use crate::core::models::molecule::Molecule;
use crate::core::toolkit::{ChemToolkit, StereoOptions};
use std::collections::HashSet;
use tracing::debug;

/// Enumerates between 1 and `max_isomers` distinct stereoisomers of `molecule`.
///
/// Explicitly specified stereocenters are left untouched and isomers that cannot be embedded in
/// 3D are discarded by the toolkit. When the toolkit yields nothing the input molecule itself is
/// the single variant.
pub fn expand_stereoisomers(
    toolkit: &dyn ChemToolkit,
    molecule: &Molecule,
    max_isomers: usize,
) -> Result<Vec<Molecule>, EngineError> {
    let options = StereoOptions {
        max_isomers,
        try_embedding: true,
        only_unassigned: true,
    };
    let isomers = toolkit
        .enumerate_stereoisomers(molecule, &options)
        .map_err(EngineError::toolkit("stereo enumeration"))?;

    let mut seen = HashSet::new();
    let mut variants: Vec<Molecule> = isomers
        .into_iter()
        .filter(|isomer| seen.insert(isomer.structure.clone()))
        .take(max_isomers.max(1))
        .collect();

    if variants.is_empty() {
        variants.push(molecule.clone());
    }
    debug!("Expanded into {} stereoisomer(s).", variants.len());
    Ok(variants)
}
