//! Run configuration
//!
//! Loaded from `config.toml` (optional), then overridden by `PRISMA_*`
//! environment variables, then validated.

use crate::error::CreditsError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.gov.prismacloud.io";
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "PRISMA_CREDITS_CONFIG";

/// Output format of the export file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Export run configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Access key id used as the login username
    pub access_key_id: String,

    /// Secret key used as the login password (masked in display)
    pub secret_key: String,

    /// Relative usage window, in months
    pub window_months: u32,

    /// Directory the export file is written into
    pub output_dir: PathBuf,

    pub format: OutputFormat,

    /// Per-request timeout enforced by the transport
    pub request_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key_id: String::new(),
            secret_key: String::new(),
            window_months: DEFAULT_WINDOW_MONTHS,
            output_dir: PathBuf::from("."),
            format: OutputFormat::Csv,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("base_url", &self.base_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("window_months", &self.window_months)
            .field("output_dir", &self.output_dir)
            .field("format", &self.format)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ExportConfig {
    /// Load from the default location, apply env overrides, validate.
    ///
    /// `PRISMA_CREDITS_CONFIG` wins over `<config_dir>/prisma-credits/config.toml`.
    /// A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file (no env overrides, no validation)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `PRISMA_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), CreditsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PRISMA_CREDITS_BASE_URL") {
            self.base_url = value;
        }
        if let Some(value) = lookup("PRISMA_ACCESS_KEY_ID") {
            self.access_key_id = value;
        }
        if let Some(value) = lookup("PRISMA_SECRET_KEY") {
            self.secret_key = value;
        }
        if let Some(value) = lookup("PRISMA_CREDITS_WINDOW_MONTHS") {
            self.window_months = value.trim().parse().map_err(|_| {
                invalid(format!(
                    "PRISMA_CREDITS_WINDOW_MONTHS must be a positive integer, got '{}'",
                    value
                ))
            })?;
        }
        if let Some(value) = lookup("PRISMA_CREDITS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("PRISMA_CREDITS_FORMAT") {
            self.format = OutputFormat::parse(&value).ok_or_else(|| {
                invalid(format!(
                    "PRISMA_CREDITS_FORMAT must be csv or json, got '{}'",
                    value
                ))
            })?;
        }
        if let Some(value) = lookup("PRISMA_CREDITS_TIMEOUT_SECS") {
            self.request_timeout_secs = value.trim().parse().map_err(|_| {
                invalid(format!(
                    "PRISMA_CREDITS_TIMEOUT_SECS must be an integer, got '{}'",
                    value
                ))
            })?;
        }
        Ok(())
    }

    /// Check required values and normalize the base URL
    pub fn validate(&mut self) -> Result<(), CreditsError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(invalid(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.access_key_id.trim().is_empty() {
            return Err(invalid("access_key_id is not set"));
        }
        if self.secret_key.is_empty() {
            return Err(invalid("secret_key is not set"));
        }
        if self.window_months == 0 {
            return Err(invalid("window_months must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<config_dir>/prisma-credits/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prisma-credits").join("config.toml"))
}

/// Masked secret for display: "abcd1234efgh5678" → "abcd••••5678"
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len == 0 {
        String::new()
    } else if len <= 10 {
        // Short secret: mask everything except first 2 chars
        format!("{}••••", secret.chars().take(2).collect::<String>())
    } else {
        let prefix = secret.chars().take(4).collect::<String>();
        let suffix = secret.chars().skip(len - 4).collect::<String>();
        format!("{}••••{}", prefix, suffix)
    }
}

fn invalid(message: impl Into<String>) -> CreditsError {
    CreditsError::InvalidConfig {
        message: message.into(),
    }
}
