use super::error::EngineError;
use crate::core::io::input::InputRecord;
use crate::core::io::manifest::{DUPLICATE_MARKER, INVALID_MARKER, ManifestRow};
use crate::core::models::molecule::Molecule;
use crate::core::toolkit::ChemToolkit;
use std::collections::HashSet;
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The canonical structure was already seen earlier in the input.
    Duplicate,
    /// The toolkit could not read the structure.
    Invalid,
}

impl DropReason {
    pub fn marker(&self) -> &'static str {
        match self {
            DropReason::Duplicate => DUPLICATE_MARKER,
            DropReason::Invalid => INVALID_MARKER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DedupEntry {
    Kept { molecule: Molecule, id: String },
    Dropped { reason: DropReason },
}

/// Result of scanning the input once: four parallel sequences, in input order.
///
/// `canonical[i]` holds the drop marker for dropped entries, `ids[i]` the (possibly renamed)
/// identifier, and `flags[i]` whether entry `i` was renamed or dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    pub entries: Vec<DedupEntry>,
    pub canonical: Vec<String>,
    pub ids: Vec<String>,
    pub flags: Vec<bool>,
}

impl Deduplicated {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Molecules that go on to generation, with their final identifiers.
    pub fn kept(&self) -> impl Iterator<Item = (&Molecule, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            DedupEntry::Kept { molecule, id } => Some((molecule, id.as_str())),
            DedupEntry::Dropped { .. } => None,
        })
    }

    pub fn altered_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    pub fn dropped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, DedupEntry::Dropped { .. }))
            .count()
    }

    pub fn manifest_rows(&self) -> Vec<ManifestRow> {
        self.canonical
            .iter()
            .zip(&self.ids)
            .zip(&self.flags)
            .map(|((smi, cid), flag)| ManifestRow {
                smi: smi.clone(),
                cid: cid.clone(),
                if_changed: *flag,
            })
            .collect()
    }

    fn push(&mut self, entry: DedupEntry, canonical: String, id: String, flag: bool) {
        self.entries.push(entry);
        self.canonical.push(canonical);
        self.ids.push(id);
        self.flags.push(flag);
    }
}

fn base_id(id: &str) -> &str {
    id.split('#').next().unwrap_or(id)
}

/// Single order-preserving scan over the input.
///
/// The first occurrence of a canonical structure is kept; later occurrences are dropped. A kept
/// record whose identifier was already used (by any earlier record, kept or dropped) is renamed
/// to `base#k` with the smallest `k >= 1` that yields an unused identifier.
#[instrument(skip_all, fields(records = records.len()))]
pub fn deduplicate(
    toolkit: &dyn ChemToolkit,
    records: Vec<InputRecord>,
) -> Result<Deduplicated, EngineError> {
    let mut out = Deduplicated::default();
    let mut seen_structures: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for InputRecord { molecule, id } in records {
        let canonical = match toolkit.canonical_smiles(&molecule) {
            Ok(smiles) => smiles,
            Err(e) if e.is_recoverable() => {
                warn!("Molecule '{}' could not be read and will be omitted: {}", id, e);
                seen_ids.insert(id.clone());
                out.push(
                    DedupEntry::Dropped {
                        reason: DropReason::Invalid,
                    },
                    DropReason::Invalid.marker().to_string(),
                    id,
                    true,
                );
                continue;
            }
            Err(e) => return Err(EngineError::toolkit("canonicalization")(e)),
        };

        if seen_structures.contains(&canonical) {
            warn!(
                "Molecule '{}' occurs a second time in the input and will be omitted.",
                id
            );
            seen_ids.insert(id.clone());
            out.push(
                DedupEntry::Dropped {
                    reason: DropReason::Duplicate,
                },
                DropReason::Duplicate.marker().to_string(),
                id,
                true,
            );
            continue;
        }

        let mut final_id = id;
        let mut renamed = false;
        if seen_ids.contains(&final_id) {
            let base = base_id(&final_id).to_string();
            let mut suffix = 1usize;
            while seen_ids.contains(&final_id) {
                final_id = format!("{}#{}", base, suffix);
                suffix += 1;
            }
            warn!(
                "Molecule ID '{}' is already used by a distinct structure; renamed to '{}'.",
                base, final_id
            );
            renamed = true;
        }

        seen_structures.insert(canonical.clone());
        seen_ids.insert(final_id.clone());
        out.push(
            DedupEntry::Kept {
                molecule,
                id: final_id.clone(),
            },
            canonical,
            final_id,
            renamed,
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolkit::testing::FakeToolkit;

    fn records(items: &[(&str, &str)]) -> Vec<InputRecord> {
        items
            .iter()
            .map(|(smiles, id)| InputRecord {
                molecule: Molecule::from_smiles(*smiles),
                id: id.to_string(),
            })
            .collect()
    }

    #[test]
    fn colliding_ids_are_suffixed_in_order() {
        let toolkit = FakeToolkit::new();
        let out = deduplicate(&toolkit, records(&[("CC", "A"), ("CN", "A")])).unwrap();
        assert_eq!(out.ids, vec!["A", "A#1"]);
        assert_eq!(out.flags, vec![false, true]);

        let out = deduplicate(&toolkit, records(&[("CC", "A"), ("CN", "A"), ("CO", "A")])).unwrap();
        assert_eq!(out.ids, vec!["A", "A#1", "A#2"]);
        assert_eq!(out.flags, vec![false, true, true]);
    }

    #[test]
    fn second_structural_duplicate_is_dropped() {
        let toolkit = FakeToolkit::new().with_alias("OCC", "CCO");
        let out = deduplicate(&toolkit, records(&[("CCO", "first"), ("OCC", "second")])).unwrap();

        assert!(matches!(out.entries[0], DedupEntry::Kept { .. }));
        assert_eq!(
            out.entries[1],
            DedupEntry::Dropped {
                reason: DropReason::Duplicate
            }
        );
        assert_eq!(out.canonical, vec!["CCO", "duplicate"]);
        assert_eq!(out.ids, vec!["first", "second"]);
        assert_eq!(out.flags, vec![false, true]);
        assert_eq!(out.kept().count(), 1);
    }

    #[test]
    fn kept_ids_are_unique_and_sequences_stay_parallel() {
        let toolkit = FakeToolkit::new();
        let input = records(&[
            ("C1", "x"),
            ("C1", "x"),
            ("C2", "x"),
            ("C3", "x#1"),
            ("C4", "y"),
            ("C5", "x"),
        ]);
        let out = deduplicate(&toolkit, input).unwrap();

        assert_eq!(out.len(), 6);
        assert_eq!(out.canonical.len(), 6);
        assert_eq!(out.flags.len(), 6);
        let kept: Vec<_> = out.kept().map(|(_, id)| id.to_string()).collect();
        let unique: HashSet<_> = kept.iter().collect();
        assert_eq!(kept.len(), unique.len());
        assert_eq!(kept, vec!["x", "x#1", "x#2", "y", "x#3"]);
        assert_eq!(out.altered_count(), 4);
        assert_eq!(out.dropped_count(), 1);
    }

    #[test]
    fn unreadable_structures_are_dropped_as_invalid() {
        let toolkit = FakeToolkit::new();
        let out = deduplicate(&toolkit, records(&[("INVALID", "bad"), ("CC", "bad")])).unwrap();

        assert_eq!(out.canonical, vec!["invalid", "CC"]);
        assert_eq!(out.ids, vec!["bad", "bad#1"]);
        assert_eq!(out.flags, vec![true, true]);
    }

    #[test]
    fn manifest_rows_mirror_the_scan() {
        let toolkit = FakeToolkit::new();
        let out = deduplicate(&toolkit, records(&[("CC", "A"), ("CC", "B")])).unwrap();
        let rows = out.manifest_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].smi, "duplicate");
        assert_eq!(rows[1].cid, "B");
        assert!(rows[1].if_changed);
        assert!(!rows[0].if_changed);
    }
}
