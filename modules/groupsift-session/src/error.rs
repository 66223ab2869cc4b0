use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Cookie store error: {0}")]
    CookieStore(String),
}

impl From<chromiumoxide::error::CdpError> for SessionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SessionError::Browser(err.to_string())
    }
}
