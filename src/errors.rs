use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors of the wire and storage layers
#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection closed before a full message was received")]
    ConnectionReset,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Malformed HTTP message: {0}")]
    Parse(#[from] httparse::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid route: {0}")]
    Router(#[from] matchit::InsertError),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl Error {
    /// HTTP status the local server answers with when a handler fails with this error
    pub fn status(&self) -> u16 {
        match self {
            Error::BadRequest(_) | Error::Json(_) | Error::Parse(_) => 400,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            _ => 500,
        }
    }
}
