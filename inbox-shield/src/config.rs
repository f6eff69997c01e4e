use crate::error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selectors probed for DKIM keys when no custom selector is given
pub const DEFAULT_DKIM_SELECTORS: &[&str] = &[
    "default",
    "google",
    "gmail",
    "k1",
    "dkim",
    "selector1",
    "selector2",
    "mail",
    "email",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dkim: DkimConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Upstream resolver: system, google, cloudflare or quad9
    #[serde(default = "default_resolver")]
    pub resolver: String,
    #[serde(default = "default_dns_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_dns_attempts")]
    pub attempts: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DkimConfig {
    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_resolver() -> String {
    "google".to_string()
}

fn default_dns_timeout() -> u64 {
    5
}

fn default_dns_attempts() -> usize {
    2
}

fn default_http_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "InboxShield-Mini/1.0".to_string()
}

fn default_selectors() -> Vec<String> {
    DEFAULT_DKIM_SELECTORS.iter().map(|s| s.to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            resolver: default_resolver(),
            timeout_seconds: default_dns_timeout(),
            attempts: default_dns_attempts(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for DkimConfig {
    fn default() -> Self {
        Self {
            selectors: default_selectors(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dns: DnsConfig::default(),
            http: HttpConfig::default(),
            dkim: DkimConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CheckError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CheckError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.dns.resolver.as_str() {
            "system" | "google" | "cloudflare" | "quad9" => {}
            other => {
                return Err(CheckError::Config(format!("Unknown DNS resolver: {}", other)));
            }
        }

        if self.dns.timeout_seconds == 0 || self.http.timeout_seconds == 0 {
            return Err(CheckError::Config("Timeouts must be greater than zero".to_string()));
        }

        if self.dkim.selectors.is_empty() {
            return Err(CheckError::Config("At least one DKIM selector is required".to_string()));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(CheckError::Config(format!("Unknown log format: {}", other))),
        }
    }
}
