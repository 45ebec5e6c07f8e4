use psearch::core::io::input::InputError;
use psearch::core::io::store::StoreError;
use psearch::core::pharmacophore::definitions::DefinitionError;
use psearch::workflows::generate::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Definitions(#[from] DefinitionError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
