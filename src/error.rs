use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Remote sessions require a hostname argument")]
    MissingHost,

    #[error("Invalid server address {0}")]
    InvalidAddress(String),

    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tautulli returned an error for {cmd}: {message}")]
    Tautulli { cmd: String, message: String },

    #[error("Tautulli returned no data for {0}")]
    EmptyResponse(String),

    #[error("Library section {0} not found")]
    SectionNotFound(String),

    #[error("Library item {0} not found")]
    ItemNotFound(u64),

    #[error("Playlist {0} not found")]
    PlaylistNotFound(String),

    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
