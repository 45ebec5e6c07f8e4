use serde::{Serialize, Serializer};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Structure placeholder written for records dropped as structural duplicates.
pub const DUPLICATE_MARKER: &str = "duplicate";
/// Structure placeholder written for records whose structure could not be read.
pub const INVALID_MARKER: &str = "invalid";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error while writing manifest '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to encode manifest row: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the corrected-input manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    pub smi: String,
    pub cid: String,
    #[serde(serialize_with = "capitalized_bool")]
    pub if_changed: bool,
}

fn capitalized_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// First free manifest path next to `input`: `<stem>-updated.smi`, then
/// `<stem>-updated2.smi`, `<stem>-updated3.smi` and so on.
pub fn manifest_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    let mut candidate = dir.join(format!("{}-updated.smi", stem));
    let mut counter = 2;
    while candidate.exists() {
        candidate = dir.join(format!("{}-updated{}.smi", stem, counter));
        counter += 1;
    }
    candidate
}

/// Writes the tab-separated manifest with its `smi	cid	if_changed` header. Never
/// overwrites an existing file.
pub fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<(), ManifestError> {
    let io_err = |source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(io_err)?;

    info!("Wrote corrected-input manifest with {} row(s) to {:?}", rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row(smi: &str, cid: &str, if_changed: bool) -> ManifestRow {
        ManifestRow {
            smi: smi.to_string(),
            cid: cid.to_string(),
            if_changed,
        }
    }

    #[test]
    fn manifest_has_header_and_capitalized_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.smi");
        write_manifest(
            &path,
            &[
                row("CCO", "m1", false),
                row(DUPLICATE_MARKER, "m2", true),
                row("CCN", "m1#1", true),
            ],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "smi\tcid\tif_changed",
                "CCO\tm1\tFalse",
                "duplicate\tm2\tTrue",
                "CCN\tm1#1\tTrue",
            ]
        );
    }

    #[test]
    fn manifest_path_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("library.smi");

        let first = manifest_path_for(&input);
        assert_eq!(first, dir.path().join("library-updated.smi"));

        fs::write(&first, "").unwrap();
        let second = manifest_path_for(&input);
        assert_eq!(second, dir.path().join("library-updated2.smi"));

        fs::write(&second, "").unwrap();
        assert_eq!(
            manifest_path_for(&input),
            dir.path().join("library-updated3.smi")
        );
    }

    #[test]
    fn write_manifest_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.smi");
        fs::write(&path, "keep me").unwrap();

        let err = write_manifest(&path, &[row("C", "1", true)]).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }
}
