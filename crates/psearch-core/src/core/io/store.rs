use crate::core::models::features::FeatureCoords;
use crate::core::models::molecule::Molecule;
use crate::core::pharmacophore::fingerprint::Fingerprint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Conformer-bearing molecules of one input record, keyed by stereoisomer index.
pub type VariantMolecules = BTreeMap<usize, Molecule>;
/// Per-conformer feature coordinates of one input record, keyed by stereoisomer index.
pub type VariantFeatures = BTreeMap<usize, Vec<FeatureCoords>>;
/// Per-conformer fingerprints of one input record, keyed by stereoisomer index.
pub type VariantFingerprints = BTreeMap<usize, Vec<Fingerprint>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A database already exists at '{path}'")]
    AlreadyExists { path: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt database entry on line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// The logical write interface of the conformer/pharmacophore database.
///
/// Every molecule is stored under its identifier with three entries (molecules, feature
/// coordinates, fingerprints); writing an identifier again replaces the previous entries.
pub trait RecordStore {
    fn write_bin_step(&mut self, bin_step: f64) -> Result<(), StoreError>;

    fn write_mol(&mut self, id: &str, molecules: &VariantMolecules) -> Result<(), StoreError>;

    fn write_pharm(&mut self, id: &str, features: &VariantFeatures) -> Result<(), StoreError>;

    fn write_fp(&mut self, id: &str, fingerprints: &VariantFingerprints)
    -> Result<(), StoreError>;

    /// Makes all previous writes durable.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// The complete logical content of a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDatabase {
    pub bin_step: Option<f64>,
    pub molecules: BTreeMap<String, VariantMolecules>,
    pub pharmacophores: BTreeMap<String, VariantFeatures>,
    pub fingerprints: BTreeMap<String, VariantFingerprints>,
}

impl StoredDatabase {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.molecules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Total number of conformers stored for `id` across all stereoisomers.
    pub fn conformer_count(&self, id: &str) -> Option<usize> {
        self.molecules
            .get(id)
            .map(|variants| variants.values().map(Molecule::num_conformers).sum())
    }

    fn apply(&mut self, line: EntryLine) -> Result<(), String> {
        match line.kind {
            EntryKind::BinStep => {
                self.bin_step = Some(line.value.ok_or("bin-step entry without a value")?);
            }
            EntryKind::Mol => {
                let (id, data) = line.payload()?;
                self.molecules.insert(id, data);
            }
            EntryKind::Pharm => {
                let (id, data) = line.payload()?;
                self.pharmacophores.insert(id, data);
            }
            EntryKind::Fp => {
                let (id, data) = line.payload()?;
                self.fingerprints.insert(id, data);
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum EntryRef<'a> {
    BinStep {
        value: f64,
    },
    Mol {
        id: &'a str,
        data: &'a VariantMolecules,
    },
    Pharm {
        id: &'a str,
        data: &'a VariantFeatures,
    },
    Fp {
        id: &'a str,
        data: &'a VariantFingerprints,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
enum EntryKind {
    BinStep,
    Mol,
    Pharm,
    Fp,
}

/// One stored line as read back. `data` stays an untyped JSON value until the kind is known:
/// integer variant keys are written as JSON strings and only a typed map decode restores them.
#[derive(Deserialize)]
struct EntryLine {
    kind: EntryKind,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl EntryLine {
    fn payload<T: DeserializeOwned>(self) -> Result<(String, T), String> {
        let id = self.id.ok_or("entry without an id")?;
        let data = self.data.ok_or("entry without data")?;
        let data = serde_json::from_value(data).map_err(|e| e.to_string())?;
        Ok((id, data))
    }
}

/// A database file holding one JSON entry per line.
///
/// The file is created exclusively: opening a path that already exists fails with
/// [`StoreError::AlreadyExists`], so an existing database is never overwritten.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    writer: BufWriter<File>,
    entries_written: usize,
}

impl FileStore {
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                    path: path.to_path_buf(),
                },
                _ => StoreError::Io(e),
            })?;
        debug!("Created database file {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            entries_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Loads the whole logical content of a database file.
    pub fn read(path: &Path) -> Result<StoredDatabase, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut db = StoredDatabase::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let corrupt = |message: String| StoreError::Corrupt {
                line: index + 1,
                message,
            };
            let entry: EntryLine =
                serde_json::from_str(&line).map_err(|e| corrupt(e.to_string()))?;
            db.apply(entry).map_err(corrupt)?;
        }
        Ok(db)
    }

    fn append(&mut self, entry: &EntryRef<'_>) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        self.entries_written += 1;
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn write_bin_step(&mut self, bin_step: f64) -> Result<(), StoreError> {
        self.append(&EntryRef::BinStep { value: bin_step })
    }

    fn write_mol(&mut self, id: &str, molecules: &VariantMolecules) -> Result<(), StoreError> {
        self.append(&EntryRef::Mol {
            id,
            data: molecules,
        })
    }

    fn write_pharm(&mut self, id: &str, features: &VariantFeatures) -> Result<(), StoreError> {
        self.append(&EntryRef::Pharm { id, data: features })
    }

    fn write_fp(
        &mut self,
        id: &str,
        fingerprints: &VariantFingerprints,
    ) -> Result<(), StoreError> {
        self.append(&EntryRef::Fp {
            id,
            data: fingerprints,
        })
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// An in-memory [`RecordStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    db: StoredDatabase,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(&self) -> &StoredDatabase {
        &self.db
    }

    pub fn into_database(self) -> StoredDatabase {
        self.db
    }
}

impl RecordStore for MemoryStore {
    fn write_bin_step(&mut self, bin_step: f64) -> Result<(), StoreError> {
        self.db.bin_step = Some(bin_step);
        Ok(())
    }

    fn write_mol(&mut self, id: &str, molecules: &VariantMolecules) -> Result<(), StoreError> {
        self.db.molecules.insert(id.to_string(), molecules.clone());
        Ok(())
    }

    fn write_pharm(&mut self, id: &str, features: &VariantFeatures) -> Result<(), StoreError> {
        self.db
            .pharmacophores
            .insert(id.to_string(), features.clone());
        Ok(())
    }

    fn write_fp(
        &mut self,
        id: &str,
        fingerprints: &VariantFingerprints,
    ) -> Result<(), StoreError> {
        self.db
            .fingerprints
            .insert(id.to_string(), fingerprints.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::Conformer;
    use nalgebra::Point3;

    fn sample_entries() -> (VariantMolecules, VariantFeatures, VariantFingerprints) {
        let mut conformer = Conformer::new(0, vec![Point3::new(0.0, 1.0, 2.0)]);
        conformer.energy = Some(-12.5);
        let mol = Molecule::from_smiles("CCO").with_conformers(vec![conformer]);
        (
            BTreeMap::from([(0, mol)]),
            BTreeMap::from([(0, vec![vec![("A".to_string(), [0.0, 1.0, 2.0])]])]),
            BTreeMap::from([(0, vec![Fingerprint::from_bits([3, 17])])]),
        )
    }

    #[test]
    fn create_refuses_existing_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = FileStore::create(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn file_store_content_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.dat");
        let (mols, pharm, fps) = sample_entries();

        let mut store = FileStore::create(&path).unwrap();
        store.write_bin_step(1.0).unwrap();
        store.write_mol("ethanol", &mols).unwrap();
        store.write_pharm("ethanol", &pharm).unwrap();
        store.write_fp("ethanol", &fps).unwrap();
        store.flush().unwrap();
        assert_eq!(store.entries_written(), 4);
        drop(store);

        let db = FileStore::read(&path).unwrap();
        assert_eq!(db.bin_step, Some(1.0));
        assert_eq!(db.molecules["ethanol"], mols);
        assert_eq!(db.pharmacophores["ethanol"], pharm);
        assert_eq!(db.fingerprints["ethanol"], fps);
        assert_eq!(db.conformer_count("ethanol"), Some(1));
    }

    #[test]
    fn memory_and_file_stores_hold_the_same_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.dat");
        let (mols, pharm, fps) = sample_entries();

        let mut memory = MemoryStore::new();
        let mut file = FileStore::create(&path).unwrap();
        for store in [&mut memory as &mut dyn RecordStore, &mut file] {
            store.write_bin_step(0.5).unwrap();
            store.write_mol("m", &mols).unwrap();
            store.write_pharm("m", &pharm).unwrap();
            store.write_fp("m", &fps).unwrap();
            store.flush().unwrap();
        }
        drop(file);

        assert_eq!(&FileStore::read(&path).unwrap(), memory.database());
    }

    #[test]
    fn rewriting_an_id_replaces_previous_entries() {
        let (mols, _, _) = sample_entries();
        let mut store = MemoryStore::new();
        store.write_mol("m", &mols).unwrap();
        store.write_mol("m", &BTreeMap::new()).unwrap();
        assert_eq!(store.database().conformer_count("m"), Some(0));
    }

    /// Stores the single variant of `map` under indices 0 and 3.
    fn sparse<V: Clone>(map: BTreeMap<usize, V>) -> BTreeMap<usize, V> {
        map.into_values()
            .flat_map(|v| [(0, v.clone()), (3, v)])
            .collect()
    }

    #[test]
    fn sparse_variant_keys_read_back_as_integers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.dat");
        let (mols, pharm, fps) = sample_entries();
        let (mols, pharm, fps) = (sparse(mols), sparse(pharm), sparse(fps));

        let mut store = FileStore::create(&path).unwrap();
        store.write_mol("m", &mols).unwrap();
        store.write_pharm("m", &pharm).unwrap();
        store.write_fp("m", &fps).unwrap();
        store.flush().unwrap();
        drop(store);

        let db = FileStore::read(&path).unwrap();
        assert_eq!(db.molecules["m"].keys().copied().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(db.pharmacophores["m"], pharm);
        assert_eq!(db.fingerprints["m"], fps);
        assert_eq!(db.conformer_count("m"), Some(2));
    }

    #[test]
    fn entry_without_id_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.dat");
        std::fs::write(&path, "{\"kind\":\"mol\",\"data\":{\"0\":null}}\n").unwrap();
        let err = FileStore::read(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn read_reports_corrupt_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.dat");
        std::fs::write(&path, "{\"kind\":\"bin-step\",\"value\":1.0}\n{oops\n").unwrap();
        let err = FileStore::read(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));
    }
}
