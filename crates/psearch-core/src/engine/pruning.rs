use super::config::PruningConfig;
use super::error::EngineError;
use crate::core::models::molecule::Molecule;
use crate::core::toolkit::{ChemToolkit, ToolkitError};
use crate::core::utils::geometry::aligned_rmsd;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    Pruned { kept: usize, removed: usize },
    /// The force field cannot be set up for this molecule; it yields no data.
    ForceFieldUnavailable,
}

/// Chooses the conformers to remove, given `(id, energy)` pairs and a pairwise RMS function.
///
/// Conformers are ranked by energy. With an energy window only those within `window` of the
/// minimum survive (ties at the boundary are kept); a zero window keeps only the first-ranked
/// conformer, even when others tie with it. With an RMS threshold the kept conformers are
/// scanned pairwise in rank order and, while any pair is closer than the threshold, the
/// higher-ranked member of the first such pair is removed along with all pairs referencing it.
/// The lowest-energy conformer is never removed.
pub fn select_conformers<F>(
    energies: &[(usize, f64)],
    config: &PruningConfig,
    rms: F,
) -> BTreeSet<usize>
where
    F: Fn(usize, usize) -> f64,
{
    let mut ranked = energies.to_vec();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut removed = BTreeSet::new();
    let Some(&(_, min_energy)) = ranked.first() else {
        return removed;
    };

    let kept: Vec<usize> = match config.energy_window {
        Some(window) => ranked
            .iter()
            .enumerate()
            .filter_map(|(rank, &(id, energy))| {
                if rank == 0 || (window > 0.0 && energy - min_energy <= window) {
                    Some(id)
                } else {
                    removed.insert(id);
                    None
                }
            })
            .collect(),
        None => ranked.iter().map(|&(id, _)| id).collect(),
    };

    if let Some(threshold) = config.rms_threshold {
        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for (i, &a) in kept.iter().enumerate() {
            for &b in &kept[i + 1..] {
                pairs.push((a, b, rms(a, b)));
            }
        }
        loop {
            let Some(victim) = pairs.iter().find(|p| p.2 < threshold).map(|p| p.1) else {
                break;
            };
            removed.insert(victim);
            pairs.retain(|p| p.0 != victim && p.1 != victim);
        }
    }

    removed
}

/// Scores every conformer of `molecule` with the toolkit force field, removes the conformers
/// rejected by [`select_conformers`] and renumbers the survivors `0..k`.
///
/// Energies are recorded on the conformers.
pub fn prune_conformers(
    toolkit: &dyn ChemToolkit,
    molecule: &mut Molecule,
    config: &PruningConfig,
) -> Result<PruneOutcome, EngineError> {
    let mut energies = Vec::with_capacity(molecule.num_conformers());
    for conformer in &molecule.conformers {
        match toolkit.conformer_energy(molecule, conformer) {
            Ok(energy) => energies.push((conformer.id, energy)),
            Err(ToolkitError::ForceFieldUnavailable(reason)) => {
                warn!("Force field unavailable for {}: {}", molecule.structure, reason);
                return Ok(PruneOutcome::ForceFieldUnavailable);
            }
            Err(e) => return Err(EngineError::toolkit("energy evaluation")(e)),
        }
    }
    for (conformer, &(_, energy)) in molecule.conformers.iter_mut().zip(&energies) {
        conformer.energy = Some(energy);
    }

    let index: HashMap<usize, usize> = molecule
        .conformers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();
    let conformers = &molecule.conformers;
    let removed = select_conformers(&energies, config, |a, b| {
        aligned_rmsd(
            &conformers[index[&a]].positions,
            &conformers[index[&b]].positions,
        )
        .unwrap_or(f64::INFINITY)
    });

    let removed_count = molecule.remove_conformers(&removed);
    molecule.renumber_conformers();
    debug!(
        kept = molecule.num_conformers(),
        removed = removed_count,
        "Pruned conformers."
    );
    Ok(PruneOutcome::Pruned {
        kept: molecule.num_conformers(),
        removed: removed_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolkit::Seed;
    use crate::core::toolkit::testing::FakeToolkit;
    use crate::engine::conformers::generate_conformers;

    fn conformer_molecule(toolkit: &FakeToolkit, smiles: &str, n: usize) -> Molecule {
        generate_conformers(toolkit, &Molecule::from_smiles(smiles), n, Seed::Fixed(7)).unwrap()
    }

    fn config(energy_window: Option<f64>, rms_threshold: Option<f64>) -> PruningConfig {
        PruningConfig {
            energy_window,
            rms_threshold,
        }
    }

    fn assert_contiguous(mol: &Molecule) {
        assert_eq!(mol.conformer_ids(), (0..mol.num_conformers()).collect::<Vec<_>>());
    }

    #[test]
    fn no_filters_keep_everything() {
        let removed = select_conformers(&[(0, 3.0), (1, 1.0), (2, 2.0)], &config(None, None), |_, _| 0.0);
        assert!(removed.is_empty());
    }

    #[test]
    fn zero_energy_window_keeps_only_the_minimum() {
        let removed = select_conformers(
            &[(0, 3.0), (1, 1.0), (2, 2.0)],
            &config(Some(0.0), None),
            |_, _| f64::INFINITY,
        );
        assert_eq!(removed, BTreeSet::from([0, 2]));
    }

    #[test]
    fn zero_energy_window_drops_conformers_tied_with_the_minimum() {
        let removed = select_conformers(
            &[(0, 1.0), (1, 1.0), (2, 2.0)],
            &config(Some(0.0), None),
            |_, _| f64::INFINITY,
        );
        assert_eq!(removed, BTreeSet::from([1, 2]));
    }

    #[test]
    fn energy_window_boundary_is_inclusive() {
        let removed = select_conformers(
            &[(0, 0.0), (1, 2.0), (2, 2.5)],
            &config(Some(2.0), None),
            |_, _| f64::INFINITY,
        );
        assert_eq!(removed, BTreeSet::from([2]));
    }

    #[test]
    fn rms_scan_removes_second_member_of_first_close_pair() {
        // Energies rank 0 < 1 < 2. Conformer 1 is close to both others, 0 and 2 are distinct.
        let rms = |a: usize, b: usize| match (a.min(b), a.max(b)) {
            (0, 1) | (1, 2) => 0.1,
            _ => 5.0,
        };
        let removed = select_conformers(&[(0, 0.0), (1, 1.0), (2, 2.0)], &config(None, Some(0.5)), rms);
        assert_eq!(removed, BTreeSet::from([1]));
    }

    #[test]
    fn lowest_energy_conformer_survives_rms_pruning() {
        let removed = select_conformers(
            &[(4, 10.0), (7, -3.0), (9, 0.0)],
            &config(None, Some(1.0)),
            |_, _| 0.0,
        );
        assert_eq!(removed, BTreeSet::from([4, 9]));
    }

    #[test]
    fn empty_input_is_a_no_op() {
        assert!(select_conformers(&[], &config(Some(0.0), Some(1.0)), |_, _| 0.0).is_empty());
    }

    #[test]
    fn pruning_guarantees_rms_threshold_and_contiguous_ids() {
        let toolkit = FakeToolkit::new();
        let mut mol = conformer_molecule(&toolkit, "CCCCO", 12);
        let threshold = 1.0;

        let outcome = prune_conformers(&toolkit, &mut mol, &config(None, Some(threshold))).unwrap();
        let PruneOutcome::Pruned { kept, removed } = outcome else {
            panic!("unexpected outcome {:?}", outcome);
        };
        assert_eq!(kept + removed, 12);
        assert!(removed > 0);
        assert_contiguous(&mol);

        for (i, a) in mol.conformers.iter().enumerate() {
            for b in &mol.conformers[i + 1..] {
                let rms = aligned_rmsd(&a.positions, &b.positions).unwrap();
                assert!(rms >= threshold, "pair below threshold: {}", rms);
            }
        }
        assert!(mol.conformers.iter().all(|c| c.energy.is_some()));
    }

    #[test]
    fn pruning_is_idempotent() {
        let toolkit = FakeToolkit::new();
        let mut mol = conformer_molecule(&toolkit, "CCNCO", 10);
        let cfg = config(Some(6.0), Some(1.0));

        prune_conformers(&toolkit, &mut mol, &cfg).unwrap();
        let once = mol.clone();
        let outcome = prune_conformers(&toolkit, &mut mol, &cfg).unwrap();

        assert_eq!(
            outcome,
            PruneOutcome::Pruned {
                kept: once.num_conformers(),
                removed: 0
            }
        );
        assert_eq!(mol, once);
    }

    #[test]
    fn zero_energy_window_keeps_a_single_conformer() {
        let toolkit = FakeToolkit::new();
        let mut mol = conformer_molecule(&toolkit, "CCO", 6);
        prune_conformers(&toolkit, &mut mol, &config(Some(0.0), None)).unwrap();
        assert_eq!(mol.num_conformers(), 1);
        assert_eq!(mol.conformers[0].id, 0);
    }

    #[test]
    fn missing_force_field_yields_no_data() {
        let toolkit = FakeToolkit::new();
        let mut mol = conformer_molecule(&toolkit, "C[Xe]C", 3);
        let outcome = prune_conformers(&toolkit, &mut mol, &config(None, None)).unwrap();
        assert_eq!(outcome, PruneOutcome::ForceFieldUnavailable);
    }
}
