use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("YouTube error: {0}")]
    YouTube(#[from] google_youtube3::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration storage error: {0}")]
    Storage(#[from] confy::ConfyError),

    /// Every source playlist needs exactly one destination playlist with the same name.
    #[error("Expected exactly one YouTube playlist named '{name}', found {found}")]
    PlaylistMatch { name: String, found: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
