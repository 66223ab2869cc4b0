use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupSiftError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
