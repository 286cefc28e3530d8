use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML front matter error: {0}")]
    TomlError(#[from] toml_edit::de::Error),

    #[error("YAML front matter error: {0}")]
    YamlError(String),

    #[error("Date parsing error: {0}")]
    DateParseError(String),

    #[error("Invalid review format: {0}")]
    InvalidFormat(String),
}
