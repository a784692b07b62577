use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("missing credential: {0} is not configured")]
    MissingCredential(&'static str),
    #[error("{0} error: {1}")]
    Upstream(&'static str, String),
    #[error("unexpected {0} response shape")]
    UnexpectedShape(&'static str),
    #[error("storage error: {0}")]
    Storage(String),
}

impl FolioError {
    pub fn storage(err: anyhow::Error) -> Self {
        FolioError::Storage(err.to_string())
    }
}
