//! Configuration Management
//!
//! Handles persistent configuration storage for lifctl. The password is
//! deliberately not part of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default API user when nothing else is configured
pub const DEFAULT_USERNAME: &str = "admin";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cluster management address
    #[serde(default)]
    pub host: Option<String>,
    /// API user
    #[serde(default)]
    pub username: Option<String>,
    /// Verify the cluster's TLS certificate
    #[serde(default)]
    pub validate_certs: Option<bool>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// SVM used when a command doesn't name one
    #[serde(default)]
    pub default_svm: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lifctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective host (CLI > config > ONTAP_HOST)
    pub fn effective_host(&self) -> Option<String> {
        self.host
            .clone()
            .or_else(crate::ontap::auth::get_default_host)
    }

    /// Get effective username (CLI > config > ONTAP_USERNAME > admin)
    pub fn effective_username(&self) -> String {
        self.username
            .clone()
            .or_else(crate::ontap::auth::get_default_username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }

    pub fn effective_validate_certs(&self) -> bool {
        self.validate_certs.unwrap_or(true)
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Set host and save
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        if !crate::ontap::auth::validate_host(host) {
            anyhow::bail!("Invalid cluster address: {}", host);
        }
        self.host = Some(host.to_string());
        self.save()
    }

    /// Set username and save
    pub fn set_username(&mut self, username: &str) -> Result<()> {
        self.username = Some(username.to_string());
        self.save()
    }

    /// Set default SVM and save
    pub fn set_default_svm(&mut self, svm: &str) -> Result<()> {
        self.default_svm = Some(svm.to_string());
        self.save()
    }
}
