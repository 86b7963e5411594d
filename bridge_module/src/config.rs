use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_INBOX_API_BASE_URL: &str = "https://public.missiveapp.com/v1";
pub const DEFAULT_CARRIER_API_BASE_URL: &str = "https://api.sendblue.co/api/v1";
pub const DEFAULT_DESTINATION_LABEL: &str = "Sendblue";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Process-wide settings. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub server: ServerConfig,
    pub inbox: InboxConfig,
    pub carrier: CarrierConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct InboxConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    /// Shared secret for `X-Missive-Signature`; `None` disables the check.
    pub webhook_secret: Option<String>,
    pub default_channel_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CarrierConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Expected `sb-signing-secret` header; `None` disables the check.
    pub signing_secret: Option<String>,
    pub destination_label: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            inbox: InboxConfig {
                api_base_url: DEFAULT_INBOX_API_BASE_URL.to_string(),
                api_token: None,
                webhook_secret: None,
                default_channel_id: None,
            },
            carrier: CarrierConfig {
                api_base_url: DEFAULT_CARRIER_API_BASE_URL.to_string(),
                api_key: None,
                api_secret: None,
                signing_secret: None,
                destination_label: DEFAULT_DESTINATION_LABEL.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct BridgeConfigFile {
    #[serde(default)]
    pub(crate) server: ServerFileConfig,
    #[serde(default)]
    pub(crate) inbox: InboxFileConfig,
    #[serde(default)]
    pub(crate) carrier: CarrierFileConfig,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ServerFileConfig {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) max_body_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct InboxFileConfig {
    pub(crate) api_base_url: Option<String>,
    pub(crate) default_channel_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct CarrierFileConfig {
    pub(crate) api_base_url: Option<String>,
    pub(crate) destination_label: Option<String>,
}

impl BridgeConfig {
    /// Loads `.env`, an optional `bridge.toml`, then applies environment
    /// overrides. Credentials are optional here; a missing one fails the
    /// request that needs it.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = match resolve_config_path() {
            Some(path) => load_config_file(&path)?,
            None => BridgeConfigFile::default(),
        };
        Self::from_parts(file)
    }

    pub(crate) fn from_parts(file: BridgeConfigFile) -> Result<Self, ConfigError> {
        let defaults = BridgeConfig::default();

        let host = env_value("BRIDGE_HOST")
            .or(file.server.host)
            .unwrap_or(defaults.server.host);
        let port = match env_value("BRIDGE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "BRIDGE_PORT",
                    value,
                })?,
            None => file.server.port.unwrap_or(defaults.server.port),
        };
        let max_body_bytes = match env_value("BRIDGE_MAX_BODY_BYTES") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "BRIDGE_MAX_BODY_BYTES",
                    value,
                })?,
            None => file
                .server
                .max_body_bytes
                .filter(|bytes| *bytes > 0)
                .unwrap_or(defaults.server.max_body_bytes),
        };

        let inbox = InboxConfig {
            api_base_url: trim_base_url(
                env_value("MISSIVE_API_BASE_URL")
                    .or(file.inbox.api_base_url)
                    .unwrap_or(defaults.inbox.api_base_url),
            ),
            api_token: env_value("MISSIVE_API_TOKEN"),
            webhook_secret: env_value("MISSIVE_WEBHOOK_SECRET"),
            default_channel_id: env_value("MISSIVE_CHANNEL_ID")
                .or(non_blank(file.inbox.default_channel_id)),
        };

        let carrier = CarrierConfig {
            api_base_url: trim_base_url(
                env_value("SENDBLUE_API_BASE_URL")
                    .or(file.carrier.api_base_url)
                    .unwrap_or(defaults.carrier.api_base_url),
            ),
            api_key: env_value("SENDBLUE_API_KEY"),
            api_secret: env_value("SENDBLUE_API_SECRET"),
            signing_secret: env_value("SENDBLUE_SIGNING_SECRET"),
            destination_label: env_value("SENDBLUE_DESTINATION_LABEL")
                .or(non_blank(file.carrier.destination_label))
                .unwrap_or(defaults.carrier.destination_label),
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                max_body_bytes,
            },
            inbox,
            carrier,
        })
    }
}

pub(crate) fn resolve_config_path() -> Option<PathBuf> {
    if let Some(path) = env_value("BRIDGE_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    let direct = env::current_dir().ok()?.join("bridge.toml");
    direct.exists().then_some(direct)
}

pub(crate) fn load_config_file(path: &Path) -> Result<BridgeConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<BridgeConfigFile>(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn env_value(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn trim_base_url(value: String) -> String {
    value.trim().trim_end_matches('/').to_string()
}
