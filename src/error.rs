use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Completion call failed: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, WardenError>;
