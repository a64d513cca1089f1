//! Configuration management for gfmx.
//!
//! Parses `gfmx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [parse]
//! smart_punctuation = false
//! footnotes = true
//!
//! [render]
//! hard_breaks = false
//! no_breaks = false
//! safe = false
//!
//! [extensions]
//! enabled = ["table", "autolink", "strikethrough", "tagfilter", "tasklist"]
//! ```

use std::path::{Path, PathBuf};

use gfmx_extension::ExtensionOptions;
use gfmx_renderer::DocumentOptions;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Replace the enabled extension list.
    pub extensions: Option<Vec<String>>,
    /// Override safe mode.
    pub safe: Option<bool>,
    /// Override hard line breaks.
    pub hard_breaks: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gfmx.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser configuration.
    pub parse: ParseConfig,
    /// HTML rendering configuration.
    pub render: RenderConfig,
    /// Syntax extension configuration.
    pub extensions: ExtensionsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parser configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Convert straight quotes, dashes and ellipses.
    pub smart_punctuation: bool,
    /// Parse footnote references and definitions.
    pub footnotes: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            smart_punctuation: false,
            footnotes: true,
        }
    }
}

/// HTML rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub hard_breaks: bool,
    pub no_breaks: bool,
    /// Omit raw HTML and dangerous URLs.
    pub safe: bool,
}

/// Syntax extension configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Names of the enabled extensions.
    pub enabled: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            enabled: ExtensionOptions::ALL.names().map(str::to_owned).collect(),
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
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gfmx.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The result is validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(extensions) = &settings.extensions {
            self.extensions.enabled.clone_from(extensions);
        }
        if let Some(safe) = settings.safe {
            self.render.safe = safe;
        }
        if let Some(hard_breaks) = settings.hard_breaks {
            self.render.hard_breaks = hard_breaks;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
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
        config.config_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for unknown extension names or
    /// conflicting line break options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extension_options()?;
        if self.render.hard_breaks && self.render.no_breaks {
            return Err(ConfigError::Validation(
                "render.hard_breaks and render.no_breaks cannot both be enabled".to_owned(),
            ));
        }
        Ok(())
    }

    /// Extension flags for the enabled extension names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a name is not a known extension.
    pub fn extension_options(&self) -> Result<ExtensionOptions, ConfigError> {
        ExtensionOptions::from_names(&self.extensions.enabled)
            .map_err(|e| ConfigError::Validation(format!("extensions.enabled: {e}")))
    }

    /// Document options for the parse and render sections.
    #[must_use]
    pub fn document_options(&self) -> DocumentOptions {
        let mut options = DocumentOptions::DEFAULT;
        options.set(DocumentOptions::SMART, self.parse.smart_punctuation);
        options.set(DocumentOptions::FOOTNOTES, self.parse.footnotes);
        options.set(DocumentOptions::HARD_BREAKS, self.render.hard_breaks);
        options.set(DocumentOptions::NO_BREAKS, self.render.no_breaks);
        options.set(DocumentOptions::SAFE, self.render.safe);
        options
    }
}
