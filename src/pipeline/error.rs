use core::fmt;

/// Why a [`Pipeline::run`](super::Pipeline::run) did not complete normally.
#[derive(Debug)]
pub enum PipelineError {
    /// A stage body, or an observer hook running on that stage's worker,
    /// panicked. The ring was still drained; the payload in hand was dropped.
    /// Hook panics carry an `observer: ` prefix in `message`.
    StagePanicked {
        /// Position of the stage.
        index: usize,
        /// Name of the stage.
        name: String,
        /// The panic message, when it was a string.
        message: String,
    },
    /// The OS refused to start a worker thread. No stage ran.
    Spawn {
        /// Position of the stage whose worker failed to start.
        index: usize,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::StagePanicked {
                index,
                name,
                message,
            } => write!(f, "stage {index} ({name}) panicked: {message}"),
            PipelineError::Spawn { index, .. } => {
                write!(f, "failed to spawn the worker for stage {index}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Spawn { source, .. } => Some(source),
            PipelineError::StagePanicked { .. } => None,
        }
    }
}
