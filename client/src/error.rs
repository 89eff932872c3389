use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{0} is not a folder")]
    NotAFolder(String),
    #[error("already at the root folder")]
    AtRoot,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("a file name is required")]
    MissingFileName,
    #[error(transparent)]
    Client(#[from] ClientError),
}
