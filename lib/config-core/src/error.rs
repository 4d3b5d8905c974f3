use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Conflict writing {0}")]
    Conflict(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[source] kube::Error),
}

impl CoreError {
    /// Missing objects are an expected steady state, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }
}

impl From<kube::Error> for CoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => {
                CoreError::NotFound(response.message)
            }
            kube::Error::Api(response) if response.code == 409 => {
                CoreError::Conflict(response.message)
            }
            other => CoreError::KubernetesError(other),
        }
    }
}
