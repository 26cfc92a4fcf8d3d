use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitpulseError {
    #[error("Not authenticated. Run `gitpulse auth` first.")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub API error: {status} on {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, GitpulseError>;
