use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Actor task failed: {0}")]
    ActorTaskFailed(String),
    #[error("Actor task did not stop within {0:?}")]
    ShutdownTimedOut(std::time::Duration),
}
