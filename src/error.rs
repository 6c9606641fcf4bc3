use thiserror::Error;

/// Fatal outcomes of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline is not running")]
    NotRunning,

    #[error("pipeline has already been started")]
    AlreadyStarted,

    #[error("frame resolution changed from {expected:?} to {actual:?}")]
    ResolutionChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("display failed: {0:#}")]
    Display(anyhow::Error),
}
