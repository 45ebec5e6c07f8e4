//! A deterministic stand-in toolkit for unit tests.
//!
//! Structures are plain strings. Conventions understood by [`FakeToolkit`]:
//!
//! - every ASCII letter is one atom (at least three atoms are always produced);
//! - `?` marks an unassigned stereocenter, enumerated as `@` / `%`;
//! - `!` makes embedding return no conformers;
//! - `Xe` makes the force field unavailable;
//! - `INVALID` fails canonicalization;
//! - `FATAL` fails embedding with a non-recoverable process error;
//! - `PANIC` panics during embedding.

use super::{ChemToolkit, EmbedOptions, StereoOptions, ToolkitError};
use crate::core::models::features::FeaturePoint;
use crate::core::models::molecule::{Conformer, Molecule};
use crate::core::pharmacophore::definitions::FeatureDefinitions;
use nalgebra::Point3;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub(crate) struct FakeToolkit {
    aliases: HashMap<String, String>,
    pub(crate) conformer_spacing: f64,
    pub(crate) minimize_calls: AtomicUsize,
    pub(crate) embed_calls: AtomicUsize,
}

impl FakeToolkit {
    pub(crate) fn new() -> Self {
        Self {
            conformer_spacing: 1.0,
            ..Default::default()
        }
    }

    /// Declares `alias` to be another encoding of `canonical`.
    pub(crate) fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases.insert(alias.to_string(), canonical.to_string());
        self
    }

    fn num_atoms(molecule: &Molecule) -> usize {
        molecule
            .structure
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .count()
            .max(3)
    }

    fn positions(&self, num_atoms: usize, index: usize) -> Vec<Point3<f64>> {
        let offset = index as f64 * self.conformer_spacing;
        (0..num_atoms)
            .map(|k| {
                let mut p = Point3::new(1.5 * k as f64, 0.4 * (k % 2) as f64, 0.0);
                if k + 1 == num_atoms {
                    p.y += offset;
                    p.z += 0.5 * offset;
                }
                p
            })
            .collect()
    }
}

impl ChemToolkit for FakeToolkit {
    fn canonical_smiles(&self, molecule: &Molecule) -> Result<String, ToolkitError> {
        let structure = molecule.structure.trim();
        if structure.contains("INVALID") {
            return Err(ToolkitError::InvalidStructure(structure.to_string()));
        }
        Ok(self
            .aliases
            .get(structure)
            .cloned()
            .unwrap_or_else(|| structure.to_string()))
    }

    fn enumerate_stereoisomers(
        &self,
        molecule: &Molecule,
        options: &StereoOptions,
    ) -> Result<Vec<Molecule>, ToolkitError> {
        let centers = molecule.structure.matches('?').count();
        if centers == 0 {
            return Ok(vec![molecule.clone()]);
        }
        let total = 1usize << centers.min(16);
        Ok((0..total)
            .take(options.max_isomers)
            .map(|mask| {
                let mut bit = 0;
                let structure: String = molecule
                    .structure
                    .chars()
                    .map(|c| {
                        if c == '?' {
                            let tag = if mask >> bit & 1 == 0 { '@' } else { '%' };
                            bit += 1;
                            tag
                        } else {
                            c
                        }
                    })
                    .collect();
                Molecule::new(structure, molecule.format)
            })
            .collect())
    }

    fn add_hydrogens(&self, molecule: &Molecule) -> Result<Molecule, ToolkitError> {
        Ok(Molecule::new(
            format!("{}+H", molecule.structure),
            molecule.format,
        ))
    }

    fn embed_conformers(
        &self,
        molecule: &Molecule,
        options: &EmbedOptions,
    ) -> Result<Vec<Conformer>, ToolkitError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if molecule.structure.contains("PANIC") {
            panic!("fake toolkit asked to panic");
        }
        if molecule.structure.contains("FATAL") {
            return Err(ToolkitError::Process("helper crashed".to_string()));
        }
        if molecule.structure.contains('!') {
            return Ok(Vec::new());
        }
        let n = Self::num_atoms(molecule);
        Ok((0..options.num_conformers)
            .map(|i| Conformer::new(i, self.positions(n, i)))
            .collect())
    }

    fn minimize(
        &self,
        _molecule: &Molecule,
        conformer: &Conformer,
    ) -> Result<Conformer, ToolkitError> {
        self.minimize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(conformer.clone())
    }

    /// Energy grows with the displacement of the last atom, i.e. with the conformer index.
    fn conformer_energy(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
    ) -> Result<f64, ToolkitError> {
        if molecule.structure.contains("Xe") {
            return Err(ToolkitError::ForceFieldUnavailable(
                molecule.structure.clone(),
            ));
        }
        Ok(conformer.positions.last().map_or(0.0, |p| p.y))
    }

    fn feature_points(
        &self,
        molecule: &Molecule,
        conformer: &Conformer,
        definitions: &FeatureDefinitions,
    ) -> Result<Vec<FeaturePoint>, ToolkitError> {
        let labels = molecule
            .structure
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| match c {
                'N' => "D",
                'O' => "A",
                'c' => "a",
                _ => "H",
            });
        Ok(labels
            .zip(conformer.positions.iter())
            .filter(|(label, _)| definitions.patterns(label).is_some())
            .map(|(label, position)| FeaturePoint::new(label, *position))
            .collect())
    }
}
