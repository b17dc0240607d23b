use thiserror::Error;
use vista_gateway::GatewayError;
use vista_persist::StoreError;

pub const THREAD_NOT_STARTED_MESSAGE: &str = "Start a thread with Generate before refining.";
pub const MISSING_CONTINUATION_MESSAGE: &str =
    "Previous image data missing for this thread. Clear and retry.";

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Refine on a thread with no stored state.
    #[error("{}", THREAD_NOT_STARTED_MESSAGE)]
    ThreadNotStarted,

    /// Stored state exists but carries no base image.
    #[error("{}", MISSING_CONTINUATION_MESSAGE)]
    MissingContinuationData,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Sequencing errors are the caller's to fix; they never reach the gateway.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ThreadNotStarted | PipelineError::MissingContinuationData
        )
    }
}
