use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    Io { path: PathBuf, source: std::io::Error },
    /// TOML parse / deserialization error.
    Parse(String),
    /// TOML serialization error.
    Serialize(String),
    /// Parsed settings with an out-of-range value.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Serialize(msg) => write!(f, "settings serialize error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
