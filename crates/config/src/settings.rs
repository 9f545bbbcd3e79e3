// Workbench settings
// Loaded from ~/.config/mdrecon/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use mdrecon_io::LoadOptions;
use mdrecon_profile::{DriftThresholds, ProfileOptions};
use mdrecon_recon::{CompareRequest, FuzzyConfig, HashOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Defaults applied to every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Row cap for every load. `None` loads everything.
    pub max_rows: Option<usize>,
    /// Encoding label for text sources. UTF-8 when unset.
    pub encoding: Option<String>,
    pub typed_cells: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_rows: None,
            encoding: None,
            typed_cells: true,
        }
    }
}

impl LoaderSettings {
    /// Fill the fields a caller left unset. Explicit call options win.
    pub fn apply(&self, options: &mut LoadOptions) {
        if options.max_rows.is_none() {
            options.max_rows = self.max_rows;
        }
        if options.encoding.is_none() {
            options.encoding = self.encoding.clone();
        }
        if !self.typed_cells {
            options.typed_cells = false;
        }
    }
}

/// Hashing options plus how much per-record detail a comparison keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    #[serde(flatten)]
    pub hash: HashOptions,
    pub include_details: bool,
    pub max_details: usize,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            hash: HashOptions::default(),
            include_details: true,
            max_details: 100,
        }
    }
}

impl CompareSettings {
    /// Request for `key_columns` with the configured detail policy.
    pub fn request<S: Into<String>>(&self, key_columns: impl IntoIterator<Item = S>) -> CompareRequest {
        CompareRequest::new(key_columns).details(self.include_details, self.max_details)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub loader: LoaderSettings,
    pub profiler: ProfileOptions,
    pub drift: DriftThresholds,
    pub compare: CompareSettings,
    pub fuzzy: FuzzyConfig,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mdrecon")
            .join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_toml()?).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fuzzy
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[fuzzy] {e}")))?;
        if self.profiler.sample_size == 0 {
            return Err(ConfigError::Invalid("[profiler] sample_size must be at least 1".into()));
        }
        if self.compare.max_details == 0 {
            return Err(ConfigError::Invalid("[compare] max_details must be at least 1".into()));
        }
        if self.drift.null_increase < 0.0 || self.drift.cardinality_change < 0.0 {
            return Err(ConfigError::Invalid("[drift] thresholds must not be negative".into()));
        }
        Ok(())
    }
}
