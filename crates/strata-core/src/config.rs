//! Configuration system for strata.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $STRATA_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/strata/config.toml
//!   3. ~/.config/strata/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Top-level configuration for a node daemon or the rendezvous server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub node: NodeConfig,
    pub rendezvous: RendezvousConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address this node's peer listener binds to.
    pub bind_addr: String,
    /// TCP port for the peer listener. 0 = OS-assigned.
    pub bind_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendezvousConfig {
    /// Address of the rendezvous server to connect to.
    pub addr: String,
    /// Port of the rendezvous server.
    pub port: u16,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for StrataConfig {
    fn default() -> Self {
        Self { node: NodeConfig::default(), rendezvous: RendezvousConfig::default() }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0".to_string(), bind_port: 0 }
    }
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self { addr: "127.0.0.1".to_string(), port: 30000 }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("strata")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl StrataConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            StrataConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("STRATA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&StrataConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply STRATA_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("STRATA_NODE__BIND_ADDR") {
            self.node.bind_addr = v;
        }
        if let Ok(v) = std::env::var("STRATA_NODE__BIND_PORT") {
            if let Ok(p) = v.parse() {
                self.node.bind_port = p;
            }
        }
        if let Ok(v) = std::env::var("STRATA_RENDEZVOUS__ADDR") {
            self.rendezvous.addr = v;
        }
        if let Ok(v) = std::env::var("STRATA_RENDEZVOUS__PORT") {
            if let Ok(p) = v.parse() {
                self.rendezvous.port = p;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_rendezvous_port() {
        let config = StrataConfig::default();
        assert_eq!(config.rendezvous.port, 30000);
        assert_eq!(config.node.bind_port, 0);
    }

    #[test]
    fn write_default_if_missing_creates_file() {
        let tmp = std::env::temp_dir().join(format!("strata-config-test-{}", std::process::id()));
        let config_path = tmp.join("config.toml");
        std::fs::create_dir_all(&tmp).unwrap();

        unsafe {
            std::env::set_var("STRATA_CONFIG", config_path.to_str().unwrap());
        }

        let path = StrataConfig::write_default_if_missing().expect("write_default_if_missing failed");
        assert!(path.exists());

        let config = StrataConfig::load().expect("load should succeed");
        assert_eq!(config.rendezvous.port, 30000);

        unsafe {
            std::env::remove_var("STRATA_CONFIG");
        }
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
