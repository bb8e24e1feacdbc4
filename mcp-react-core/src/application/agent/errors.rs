use crate::infrastructure::model::ModelError;
use thiserror::Error;

/// Failures that end a reasoning loop run.
///
/// Tool and server failures never show up here; they are fed back to the model.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
}
