//! Configuration module
//!
//! The plugin reads its stanza from the bot's TOML config file:
//!
//! ```toml
//! [ludolph_zabbix.zapi]
//! server = "https://zabbix.example.com"
//! ssl_verify = true
//! username = "ludolph"
//! password = "secret"
//! httpuser = "web"        # optional
//! httppasswd = "secret"   # optional
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{DEFAULT_CONFIG_PATH, DEFAULT_WEB_HOST, DEFAULT_WEB_PORT, TIMEOUT};

/// Environment variable holding the config file path
pub const CONFIG_PATH_ENV: &str = "LUDOLPH_CONFIG";

/// Tracing target of the Zabbix API client
pub const ZAPI_LOG_TARGET: &str = "ludolph_zabbix::providers::zapi";

/// Complete bot configuration as seen by the plugin
#[derive(Debug, Clone)]
pub struct Config {
    pub zapi: ZapiConfig,
    pub webserver: WebConfig,
    pub xmpp: XmppConfig,
}

/// `[ludolph_zabbix.zapi]` section
#[derive(Clone)]
pub struct ZapiConfig {
    /// Zabbix frontend base URI (no trailing slash)
    pub server: String,
    /// Verify TLS certificates
    pub ssl_verify: bool,
    /// Zabbix API user
    pub username: String,
    /// Zabbix API password
    pub password: String,
    /// HTTP basic auth user
    pub httpuser: Option<String>,
    /// HTTP basic auth password
    pub httppasswd: Option<String>,
    /// Log level of the API client
    pub loglevel: String,
    /// Request timeout
    pub timeout: Duration,
}

// Credentials stay out of debug output
impl std::fmt::Debug for ZapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZapiConfig")
            .field("server", &self.server)
            .field("ssl_verify", &self.ssl_verify)
            .field("username", &self.username)
            .field("httpuser", &self.httpuser)
            .field("loglevel", &self.loglevel)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// `[webserver]` section
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

fn default_web_host() -> String {
    DEFAULT_WEB_HOST.to_string()
}

fn default_web_port() -> u16 {
    DEFAULT_WEB_PORT
}

/// `[xmpp]` section (only the parts the plugin uses)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XmppConfig {
    /// Bot JID
    pub username: Option<String>,
    /// Multi-user chat room JID
    pub room: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ludolph_zabbix: Option<RawPluginSection>,
    #[serde(default)]
    webserver: WebConfig,
    #[serde(default)]
    xmpp: XmppConfig,
}

#[derive(Debug, Deserialize)]
struct RawPluginSection {
    zapi: Option<RawZapiConfig>,
}

#[derive(Debug, Deserialize)]
struct RawZapiConfig {
    server: Option<String>,
    ssl_verify: Option<bool>,
    username: Option<String>,
    password: Option<String>,
    httpuser: Option<String>,
    httppasswd: Option<String>,
    loglevel: Option<String>,
    timeout: Option<u64>,
}

impl Config {
    /// Load config from the path in `LUDOLPH_CONFIG` (default `ludolph.toml`)
    pub fn from_env() -> AppResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// Load config from a file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigUnreadable,
                format!("Cannot read config file {}", path.display()),
                e,
            )
        })?;

        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), server = %config.zapi.server, "Configuration loaded");
        Ok(config)
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| {
            AppError::with_source(ErrorCode::ConfigInvalidValue, "Invalid config file", e)
        })?;

        let zapi = raw
            .ludolph_zabbix
            .and_then(|section| section.zapi)
            .ok_or_else(|| AppError::missing_config("ludolph_zabbix.zapi"))?;

        Ok(Self {
            zapi: ZapiConfig::from_raw(zapi)?,
            webserver: raw.webserver,
            xmpp: raw.xmpp,
        })
    }
}

impl ZapiConfig {
    fn from_raw(raw: RawZapiConfig) -> AppResult<Self> {
        let server = required(raw.server, "server")?;
        let server = server.trim_end_matches('/').to_string();
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(AppError::invalid_config(format!(
                "Invalid Zabbix server URI: {}",
                server
            )));
        }

        Ok(Self {
            server,
            ssl_verify: raw.ssl_verify.unwrap_or(true),
            username: required(raw.username, "username")?,
            password: required(raw.password, "password")?,
            httpuser: raw.httpuser.filter(|s| !s.is_empty()),
            httppasswd: raw.httppasswd.filter(|s| !s.is_empty()),
            loglevel: raw.loglevel.unwrap_or_else(|| "info".to_string()),
            timeout: Duration::from_secs(raw.timeout.unwrap_or(TIMEOUT)),
        })
    }

    /// Tracing filter directive for the API client target
    pub fn log_directive(&self) -> String {
        let level = match self.loglevel.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" | "critical" | "fatal" => "error",
            _ => "info",
        };
        format!("{}={}", ZAPI_LOG_TARGET, level)
    }
}

fn required(value: Option<String>, key: &str) -> AppResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::missing_config(&format!("ludolph_zabbix.zapi.{}", key)))
}
