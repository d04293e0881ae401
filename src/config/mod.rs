//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `PUBLIST_*` environment variables (`__` separates sections, e.g.
//! `PUBLIST_CITATION__THRESHOLD=10`).

mod file_config;

pub use file_config::{render_settings, write_default_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cite::AuthorPolicy;
use crate::sources::OPENALEX_API_BASE;

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "publist.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Citation rendering
    #[serde(default)]
    pub citation: CitationSettings,

    /// Default collection locations
    #[serde(default)]
    pub paths: PathSettings,

    /// Upstream fetch settings
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Citation rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationSettings {
    /// Record field the rendered citation is stored under
    #[serde(default = "default_citation_field")]
    pub field: String,

    /// Author lists longer than this are truncated
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Number of authors kept before "et al."
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,
}

impl CitationSettings {
    pub fn policy(&self) -> AuthorPolicy {
        AuthorPolicy::new(self.threshold, self.display_cap)
    }
}

impl Default for CitationSettings {
    fn default() -> Self {
        Self {
            field: default_citation_field(),
            threshold: default_threshold(),
            display_cap: default_display_cap(),
        }
    }
}

fn default_citation_field() -> String {
    "citation_nature".to_string()
}

fn default_threshold() -> usize {
    6
}

fn default_display_cap() -> usize {
    6
}

/// Default input/output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_collection_path")]
    pub input: PathBuf,

    #[serde(default = "default_collection_path")]
    pub output: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input: default_collection_path(),
            output: default_collection_path(),
        }
    }
}

fn default_collection_path() -> PathBuf {
    PathBuf::from("_data/publications.yml")
}

/// Upstream (OpenAlex) fetch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Contact email for the OpenAlex polite pool
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_per_page")]
    pub per_page: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fetched collections list up to ten authors before truncating
    #[serde(default = "default_fetch_threshold")]
    pub threshold: usize,

    #[serde(default = "default_display_cap")]
    pub display_cap: usize,
}

impl FetchSettings {
    pub fn policy(&self) -> AuthorPolicy {
        AuthorPolicy::new(self.threshold, self.display_cap)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            email: None,
            max_results: default_max_results(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            threshold: default_fetch_threshold(),
            display_cap: default_display_cap(),
        }
    }
}

fn default_api_base() -> String {
    OPENALEX_API_BASE.to_string()
}

fn default_max_results() -> usize {
    200
}

fn default_per_page() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_fetch_threshold() -> usize {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Find a config file in the default locations.
///
/// `./publist.toml` first, then `<config dir>/publist-enrich/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|p| p.is_file())
}

/// Load settings from an optional file plus the environment
pub fn load_settings(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix("PUBLIST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.citation.field, "citation_nature");
        assert_eq!(settings.citation.policy(), AuthorPolicy::nature());
        assert_eq!(settings.fetch.policy(), AuthorPolicy::extended());
        assert_eq!(settings.paths.input, PathBuf::from("_data/publications.yml"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[citation]\nfield = \"citation\"\nthreshold = 10\n\n[fetch]\nemail = \"lab@example.org\"\n"
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.citation.field, "citation");
        assert_eq!(settings.citation.threshold, 10);
        assert_eq!(settings.citation.display_cap, 6);
        assert_eq!(settings.fetch.email.as_deref(), Some("lab@example.org"));
        assert_eq!(settings.fetch.max_results, 200);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_settings(Some(Path::new("/nonexistent/publist.toml"))).is_err());
    }
}
