use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGenerationConfig {
    pub bin_step: Option<f64>,
    pub nstereo: Option<usize>,
    pub nconf: Option<usize>,
    pub energy_cutoff: Option<f64>,
    pub rms: Option<f64>,
    pub seed: Option<i64>,
    pub pharm_def: Option<PathBuf>,
    pub ncpu: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileToolkitConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub generation: Option<FileGenerationConfig>,
    pub toolkit: Option<FileToolkitConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
