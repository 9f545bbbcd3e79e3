use std::fmt;

use mdrecon_config::ConfigError;
use mdrecon_recon::ReconError;

#[derive(Debug)]
pub enum WorkbenchError {
    /// Settings failed validation.
    Config(ConfigError),
    /// A component could not be built from the settings.
    Recon(ReconError),
}

impl fmt::Display for WorkbenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Recon(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WorkbenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Recon(e) => Some(e),
        }
    }
}

impl From<ConfigError> for WorkbenchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ReconError> for WorkbenchError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}
