use crate::core::models::molecule::Molecule;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const SDF_RECORD_TERMINATOR: &str = "$$$$";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed SMILES table: {0}")]
    Table(#[from] csv::Error),
    #[error(
        "Unsupported input format for '{path}'. Expected a tab-separated SMILES file (.smi, .smiles, .txt) or an SDF file (.sdf)."
    )]
    UnsupportedFormat { path: String },
    #[error("Record {record} has an empty structure")]
    EmptyStructure { record: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Smiles,
    Sdf,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("smi") | Some("smiles") | Some("txt") => Ok(InputFormat::Smiles),
            Some("sdf") => Ok(InputFormat::Sdf),
            _ => Err(InputError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// One input record: a structure and its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub molecule: Molecule,
    pub id: String,
}

/// Identifier given to records that carry none: their 1-based position in the file.
fn fallback_id(ordinal: usize) -> String {
    ordinal.to_string()
}

/// Reads every record of a 2D structure file, in file order.
///
/// Identifiers may repeat; resolving that is the job of the deduplication stage.
pub fn read_input(path: &Path) -> Result<Vec<InputRecord>, InputError> {
    let format = InputFormat::from_path(path)?;
    let file = File::open(path)?;
    let records = match format {
        InputFormat::Smiles => read_smiles(file)?,
        InputFormat::Sdf => read_sdf(BufReader::new(file))?,
    };
    debug!("Read {} record(s) from {:?}", records.len(), path);
    Ok(records)
}

/// Reads a headerless tab-separated table: SMILES in the first column, optional
/// identifier in the second. Extra columns are ignored.
pub fn read_smiles(reader: impl Read) -> Result<Vec<InputRecord>, InputError> {
    let mut table = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in table.records() {
        let row = row?;
        let smiles = row.get(0).map(str::trim).unwrap_or("");
        if smiles.is_empty() {
            continue;
        }
        let ordinal = records.len() + 1;
        let id = row
            .get(1)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_id(ordinal));
        records.push(InputRecord {
            molecule: Molecule::from_smiles(smiles),
            id,
        });
    }
    Ok(records)
}

/// Splits an SDF stream into molblock records. The title line of each record is its
/// identifier.
pub fn read_sdf(reader: impl BufRead) -> Result<Vec<InputRecord>, InputError> {
    let mut records = Vec::new();
    let mut current: Vec<String> = Vec::new();

    let mut finish_record = |lines: &mut Vec<String>| -> Result<(), InputError> {
        if lines.iter().all(|l| l.trim().is_empty()) {
            lines.clear();
            return Ok(());
        }
        let ordinal = records.len() + 1;
        if lines.len() < 4 {
            return Err(InputError::EmptyStructure { record: ordinal });
        }
        let title = lines[0].trim();
        let id = if title.is_empty() {
            fallback_id(ordinal)
        } else {
            title.to_string()
        };
        let mut molblock = lines.join("\n");
        molblock.push('\n');
        records.push(InputRecord {
            molecule: Molecule::from_molblock(molblock),
            id,
        });
        lines.clear();
        Ok(())
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim_end() == SDF_RECORD_TERMINATOR {
            finish_record(&mut current)?;
        } else {
            current.push(line);
        }
    }
    finish_record(&mut current)?;
    Ok(records)
}
