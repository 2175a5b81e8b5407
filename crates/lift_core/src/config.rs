use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error_handler::LiftError;

/// Application configuration stored at `~/.ledgerlift/config.json`.
///
/// Missing fields fall back to their defaults, so older config files keep
/// loading after new settings are introduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftConfig {
    // Export volume
    pub customer_count: usize,
    pub invoice_count: usize,

    // Invoice figures
    pub tax_rate: f64,
    pub payment_terms_days: u32,

    // Pipeline
    pub stage_delay_ms: u64,
    pub max_archive_bytes: u64,
    pub output_dir: Option<String>,

    // General
    pub log_level: String,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            customer_count: 25,
            invoice_count: 50,
            tax_rate: 0.08,
            payment_terms_days: 30,
            stage_delay_ms: 250,
            max_archive_bytes: 64 * 1024 * 1024,
            output_dir: None,
            log_level: "info".into(),
        }
    }
}

impl LiftConfig {
    /// Returns the base config directory: `~/.ledgerlift/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".ledgerlift"))
    }

    /// Returns the config file path: `~/.ledgerlift/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.ledgerlift/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures the base and logs directories exist.
    pub fn ensure_dirs() -> Result<()> {
        for dir in [Self::base_dir()?, Self::logs_dir()?] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from `~/.ledgerlift/config.json`, creating it with
    /// defaults if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path, writing defaults there if the
    /// file does not exist yet.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            config.validate()?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Reject settings the export pipeline cannot work with.
    pub fn validate(&self) -> Result<(), LiftError> {
        if self.customer_count == 0 {
            return Err(LiftError::Config("customer_count must be at least 1".into()));
        }
        if self.invoice_count == 0 {
            return Err(LiftError::Config("invoice_count must be at least 1".into()));
        }
        if !self.tax_rate.is_finite() || self.tax_rate < 0.0 {
            return Err(LiftError::Config(format!(
                "tax_rate must be a non-negative number, got {}",
                self.tax_rate
            )));
        }
        if self.max_archive_bytes == 0 {
            return Err(LiftError::Config("max_archive_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Directory exported archives are written to. Falls back to the current
    /// working directory.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
