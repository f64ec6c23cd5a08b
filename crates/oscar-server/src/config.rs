//! Configuration file management (Section 4.9).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete server configuration (Section 4.9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host name advertised to clients in `ServiceResponse`/`LoginResponse`.
    #[serde(default = "default_oscar_host")]
    pub oscar_host: String,
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    #[serde(default = "default_bos_port")]
    pub bos_port: u16,
    #[serde(default = "default_chat_port")]
    pub chat_port: u16,
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Skip the BUCP password check; any hash is accepted.
    #[serde(default)]
    pub disable_auth: bool,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Abort the process on an unsupported subgroup instead of logging
    /// and continuing. Test builds only.
    #[serde(default)]
    pub fail_fast: bool,
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_oscar_host() -> String {
    "127.0.0.1".to_string()
}

fn default_auth_port() -> u16 {
    5190
}

fn default_bos_port() -> u16 {
    5191
}

fn default_chat_port() -> u16 {
    5192
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            oscar_host: default_oscar_host(),
            auth_port: default_auth_port(),
            bos_port: default_bos_port(),
            chat_port: default_chat_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            disable_auth: false,
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: ServerConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("OSCAR_CONFIG") {
            return PathBuf::from(path);
        }
        PathBuf::from("oscar.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_ports() {
        let config = ServerConfig::default();
        assert_eq!(config.network.auth_port, 5190);
        assert_eq!(config.network.bos_port, 5191);
        assert_eq!(config.network.chat_port, 5192);
        assert!(!config.auth.disable_auth);
        assert!(!config.advanced.fail_fast);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = ServerConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: ServerConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed.network.oscar_host, config.network.oscar_host);
    }
}
