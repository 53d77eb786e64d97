use thiserror::Error;

/// Errors that can occur while loading cache settings.
///
/// The cache itself never fails; only the configuration surface, which reads
/// and parses external input, has an error type.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read cache settings: {0}")]
  Read(#[from] std::io::Error),

  #[cfg(feature = "serde")]
  #[error("Failed to parse cache settings: {0}")]
  Parse(#[from] serde_yaml::Error),
}

/// A specialized `Result` type for configuration operations.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
