use psearch::engine::config::GenerationConfig;
use std::path::PathBuf;

/// The helper program implementing the chemistry toolkit protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub db_path: PathBuf,
    pub toolkit: ToolkitCommand,
    pub generation: GenerationConfig,
}
