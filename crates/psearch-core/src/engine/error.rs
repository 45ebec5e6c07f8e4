use thiserror::Error;

use crate::core::toolkit::ToolkitError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Toolkit failed during {stage}: {source}")]
    Toolkit {
        stage: &'static str,
        #[source]
        source: ToolkitError,
    },
}

impl EngineError {
    pub(crate) fn toolkit(stage: &'static str) -> impl FnOnce(ToolkitError) -> Self {
        move |source| EngineError::Toolkit { stage, source }
    }

    /// `true` when the failure concerns only the molecule being processed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EngineError::Toolkit { source, .. } => source.is_recoverable(),
        }
    }
}
