use super::error::EngineError;
use crate::core::models::molecule::Molecule;
use crate::core::toolkit::{ChemToolkit, EmbedOptions, Seed};
use tracing::debug;

/// Adds explicit hydrogens to `variant`, embeds up to `num_conformers` conformers with
/// `4 * num_conformers` attempts and minimizes each of them.
///
/// The returned molecule carries the hydrogenated structure. Fewer conformers than requested,
/// including none at all, is not an error.
pub fn generate_conformers(
    toolkit: &dyn ChemToolkit,
    variant: &Molecule,
    num_conformers: usize,
    seed: Seed,
) -> Result<Molecule, EngineError> {
    let hydrogenated = toolkit
        .add_hydrogens(variant)
        .map_err(EngineError::toolkit("hydrogen addition"))?;

    let options = EmbedOptions {
        num_conformers,
        max_attempts: num_conformers.saturating_mul(4),
        seed,
    };
    let embedded = toolkit
        .embed_conformers(&hydrogenated, &options)
        .map_err(EngineError::toolkit("conformer embedding"))?;

    let minimized = embedded
        .iter()
        .map(|conformer| toolkit.minimize(&hydrogenated, conformer))
        .collect::<Result<Vec<_>, _>>()
        .map_err(EngineError::toolkit("minimization"))?;

    debug!(
        requested = num_conformers,
        embedded = minimized.len(),
        "Generated conformers."
    );
    Ok(hydrogenated.with_conformers(minimized))
}
