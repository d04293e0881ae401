//! Configuration file generation.
//!
//! # Configuration File Format
//!
//! ```toml
//! [citation]
//! field = "citation_nature"
//! threshold = 6
//! display_cap = 6
//!
//! [paths]
//! input = "_data/publications.yml"
//! output = "_data/publications.yml"
//!
//! [fetch]
//! api_base = "https://api.openalex.org"
//! email = "lab@example.org"
//! max_results = 200
//! per_page = 100
//! timeout_secs = 30
//! max_retries = 3
//! threshold = 10
//! display_cap = 6
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;

use super::Settings;

/// Render settings as TOML
pub fn render_settings(settings: &Settings) -> Result<String, ConfigFileError> {
    toml::to_string_pretty(settings).map_err(|e| ConfigFileError::Serialize(e.to_string()))
}

/// Write the default configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigFileError> {
    if path.exists() && !force {
        return Err(ConfigFileError::Exists(path.display().to_string()));
    }

    let content = render_settings(&Settings::default())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0} (use --force to overwrite)")]
    Exists(String),
}
