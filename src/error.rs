use thiserror::Error;

use crate::model::ResourceKind;
use crate::manager::Verb;

/// Failure of a call across the resource manager boundary.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The manager itself cannot be reached. Fatal for a console session.
    #[error("resource manager unreachable: {0}")]
    Unreachable(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The manager refused the request (resource in use, conflict, ...).
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("{verb} is not supported for {kind}")]
    Unsupported { kind: ResourceKind, verb: Verb },
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManagerError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ManagerError::Unreachable(_))
    }
}

impl From<bollard::errors::Error> for ManagerError {
    fn from(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as E;
        match err {
            E::DockerResponseServerError { status_code: 404, message } => {
                ManagerError::NotFound(message)
            }
            E::DockerResponseServerError { message, .. } => ManagerError::Rejected(message),
            E::JsonDataError { message, .. } => ManagerError::Malformed(message),
            E::RequestTimeoutError => {
                ManagerError::Rejected("engine did not answer in time".to_string())
            }
            other => ManagerError::Unreachable(other.to_string()),
        }
    }
}
