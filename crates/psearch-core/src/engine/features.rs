use super::error::EngineError;
use crate::core::models::features::FeatureCoords;
use crate::core::models::molecule::Molecule;
use crate::core::pharmacophore::definitions::FeatureDefinitions;
use crate::core::pharmacophore::fingerprint::Fingerprint;
use crate::core::pharmacophore::model::Pharmacophore;
use crate::core::toolkit::ChemToolkit;

/// Feature coordinates and fingerprints of every conformer of one molecule, ordered by
/// conformer id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConformerFeatures {
    pub coords: Vec<FeatureCoords>,
    pub fingerprints: Vec<Fingerprint>,
}

pub fn extract_features(
    toolkit: &dyn ChemToolkit,
    molecule: &Molecule,
    bin_step: f64,
    definitions: &FeatureDefinitions,
) -> Result<ConformerFeatures, EngineError> {
    let mut conformers: Vec<_> = molecule.conformers.iter().collect();
    conformers.sort_by_key(|c| c.id);

    let mut out = ConformerFeatures::default();
    for conformer in conformers {
        let points = toolkit
            .feature_points(molecule, conformer, definitions)
            .map_err(EngineError::toolkit("feature perception"))?;
        let pharmacophore = Pharmacophore::new(points, bin_step);
        out.coords.push(pharmacophore.feature_coords());
        out.fingerprints.push(pharmacophore.fingerprint());
    }
    Ok(out)
}
