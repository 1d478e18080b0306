use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
