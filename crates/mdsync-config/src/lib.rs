//! Configuration management for mdsync.
//!
//! Parses `mdsync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings (flags and their environment variables) are applied during
//! load via [`CliSettings`] and take precedence over the file.
//!
//! ## Environment Variable Expansion
//!
//! Every string in the `[confluence]` section, plus `import.output_dir` and
//! `import.search_space_key`, supports:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsync.toml";

/// Search page size used when none is configured.
const DEFAULT_SEARCH_LIMIT: usize = 200;

/// Largest accepted search page size.
const MAX_SEARCH_LIMIT: usize = 1000;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override Confluence username.
    pub username: Option<String>,
    /// Override Confluence password or token.
    pub password: Option<String>,
    /// Override space key.
    pub space_key: Option<String>,
    /// Override default parent page ID.
    pub parent_page_id: Option<String>,
    /// Override import output directory.
    pub output_dir: Option<PathBuf>,
}

impl CliSettings {
    fn touches_confluence(&self) -> bool {
        self.base_url.is_some()
            || self.username.is_some()
            || self.password.is_some()
            || self.space_key.is_some()
            || self.parent_page_id.is_some()
    }
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,
    /// Import configuration (paths are relative strings from TOML).
    import: ImportConfigRaw,

    /// Resolved import configuration (set after loading).
    #[serde(skip)]
    pub import_resolved: ImportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence configuration.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Account name.
    pub username: String,
    /// Password or personal access token.
    pub password: String,
    /// Space new pages are created in.
    pub space_key: String,
    /// Default parent page for `publish`.
    pub parent_page_id: Option<String>,
}

impl ConfluenceConfig {
    /// Validate connection fields.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        require_non_empty(&self.password, "confluence.password")?;
        Ok(())
    }

    /// Space key, required by commands that create or update pages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if it is empty.
    pub fn require_space_key(&self) -> Result<&str, ConfigError> {
        require_non_empty(&self.space_key, "confluence.space_key")?;
        Ok(&self.space_key)
    }
}

/// Raw import configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ImportConfigRaw {
    output_dir: Option<String>,
    search_space_key: Option<String>,
    search_limit: Option<usize>,
}

/// Resolved import configuration with absolute paths.
#[derive(Debug)]
pub struct ImportConfig {
    /// Directory imported Markdown files are written to.
    pub output_dir: PathBuf,
    /// Space searched by `import --search`; falls back to `confluence.space_key`.
    pub search_space_key: Option<String>,
    /// Search results fetched per request.
    pub search_limit: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            search_space_key: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`KMS_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsync.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// a referenced environment variable is unset.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if settings.touches_confluence() {
            let confluence = self.confluence.get_or_insert_with(ConfluenceConfig::default);
            if let Some(base_url) = &settings.base_url {
                confluence.base_url.clone_from(base_url);
            }
            if let Some(username) = &settings.username {
                confluence.username.clone_from(username);
            }
            if let Some(password) = &settings.password {
                confluence.password.clone_from(password);
            }
            if let Some(space_key) = &settings.space_key {
                confluence.space_key.clone_from(space_key);
            }
            if let Some(parent_page_id) = &settings.parent_page_id {
                confluence.parent_page_id = Some(parent_page_id.clone());
            }
        }
        if let Some(output_dir) = &settings.output_dir {
            self.import_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Use this instead of accessing the `confluence` field directly when the
    /// command talks to Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "[confluence] section required in config (or --url/--username/--password)".into(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Space searched by `import --search`.
    #[must_use]
    pub fn search_space_key(&self) -> Option<&str> {
        self.import_resolved.search_space_key.as_deref().or_else(|| {
            self.confluence
                .as_ref()
                .map(|c| c.space_key.as_str())
                .filter(|key| !key.is_empty())
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        expand::expand_config(&mut config)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Confluence fields are checked lazily by [`Config::require_confluence`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = self.import_resolved.search_limit;
        if limit == 0 {
            return Err(ConfigError::Validation(
                "import.search_limit must be greater than 0".to_owned(),
            ));
        }
        if limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "import.search_limit cannot exceed {MAX_SEARCH_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.import_resolved = ImportConfig {
            output_dir: config_dir.join(self.import.output_dir.as_deref().unwrap_or("docs")),
            search_space_key: self.import.search_space_key.clone(),
            search_limit: self.import.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        };
    }
}
