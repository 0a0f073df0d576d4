//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use citegate_gatekeeper::ValidationConfig;
use citegate_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the CourtListener API token by default
pub const DEFAULT_TOKEN_ENV: &str = "COURTLISTENER_TOKEN";

/// Model used for holding verification by default
pub const DEFAULT_HOLDING_MODEL: &str = "llama3.1";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Run orchestration (batching, deadlines, secondary lookups)
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Analysis thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Authority database connection
    #[serde(default)]
    pub authority: AuthoritySettings,

    /// Holding verification model
    #[serde(default)]
    pub holding: HoldingSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Authority database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoritySettings {
    /// CourtListener API base URL
    #[serde(default = "default_authority_endpoint")]
    pub endpoint: String,

    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

/// Holding verification model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingSettings {
    /// Check asserted propositions against opinion text
    #[serde(default)]
    pub enabled: bool,

    /// Ollama base URL
    #[serde(default = "default_holding_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_holding_model")]
    pub model: String,

    /// Attempts per verification
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("citegate").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::path() {
                Ok(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .map_err(|e| CliError::Config(format!("[pipeline] {}", e)))?;
        self.validation
            .validate()
            .map_err(|e| CliError::Config(format!("[validation] {}", e)))?;
        if self.authority.endpoint.trim().is_empty() {
            return Err(CliError::Config("[authority] endpoint must not be empty".into()));
        }
        if self.holding.enabled && self.holding.model.trim().is_empty() {
            return Err(CliError::Config("[holding] model must not be empty".into()));
        }
        Ok(())
    }

    /// CourtListener token from the configured environment variable.
    pub fn authority_token(&self) -> Option<String> {
        std::env::var(&self.authority.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

impl Default for AuthoritySettings {
    fn default() -> Self {
        Self {
            endpoint: default_authority_endpoint(),
            token_env: default_token_env(),
        }
    }
}

impl Default for HoldingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_holding_endpoint(),
            model: default_holding_model(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_authority_endpoint() -> String {
    citegate_verifier::courtlistener::DEFAULT_ENDPOINT.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_holding_endpoint() -> String {
    citegate_verifier::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_holding_model() -> String {
    DEFAULT_HOLDING_MODEL.to_string()
}

fn default_max_retries() -> u32 {
    citegate_verifier::ollama::DEFAULT_MAX_RETRIES
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
