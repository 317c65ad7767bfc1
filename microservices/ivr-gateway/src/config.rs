//! Configuration for the IVR gateway

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use inspire_core::config::{flag_env, optional_env, required_env};
use inspire_core::{InspireError, PhoneNumber, Result};

/// Transfer destination used when `ASSOCIATE_NUMBER` is unset
pub const DEFAULT_ASSOCIATE_NUMBER: &str = "919035864327";

/// Voice provider credentials
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub auth_id: String,
    pub auth_token: String,
}

impl ProviderCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth_id: required_env("PLIVO_AUTH_ID")?,
            auth_token: required_env("PLIVO_AUTH_TOKEN")?,
        })
    }
}

/// Voice provider client settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub credentials: ProviderCredentials,
    /// REST root, e.g. `https://api.plivo.com`
    pub api_base_url: String,
    /// No timeout when unset
    pub request_timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        let request_timeout = match optional_env("PROVIDER_TIMEOUT_SECS") {
            Some(v) => Some(Duration::from_secs(v.parse().map_err(|e| {
                InspireError::Config(format!("Invalid PROVIDER_TIMEOUT_SECS: {}", e))
            })?)),
            None => None,
        };

        Ok(Self {
            credentials: ProviderCredentials::from_env()?,
            api_base_url: optional_env("PLIVO_API_BASE_URL")
                .unwrap_or_else(|| "https://api.plivo.com".to_string()),
            request_timeout,
        })
    }
}

/// IVR gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP bind address
    pub http_bind: SocketAddr,
    pub provider: ProviderConfig,
    /// Caller number for originated calls and the transfer caller-ID
    pub source_number: PhoneNumber,
    /// Destination used when the trigger request leaves it out
    pub default_target_number: Option<PhoneNumber>,
    pub associate_number: PhoneNumber,
    /// Directory holding the trigger web form
    pub public_dir: PathBuf,
    /// Carry a per-call session token in every webhook URL
    pub session_scoped_urls: bool,
    pub session_ttl_secs: u64,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind = optional_env("HTTP_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let http_bind = bind
            .parse()
            .map_err(|e| InspireError::Config(format!("Invalid HTTP_BIND {}: {}", bind, e)))?;

        Ok(Self {
            http_bind,
            provider: ProviderConfig::from_env()?,
            source_number: PhoneNumber::new(required_env("PLIVO_SOURCE_NUMBER")?),
            default_target_number: optional_env("TARGET_NUMBER").map(PhoneNumber::new),
            associate_number: PhoneNumber::new(
                optional_env("ASSOCIATE_NUMBER")
                    .unwrap_or_else(|| DEFAULT_ASSOCIATE_NUMBER.to_string()),
            ),
            public_dir: PathBuf::from(
                optional_env("PUBLIC_DIR").unwrap_or_else(|| "public".to_string()),
            ),
            session_scoped_urls: flag_env("SESSION_SCOPED_URLS", false)?,
            session_ttl_secs: optional_env("SESSION_TTL_SECS")
                .map(|v| {
                    v.parse().map_err(|e| {
                        InspireError::Config(format!("Invalid SESSION_TTL_SECS: {}", e))
                    })
                })
                .transpose()?
                .unwrap_or(3600),
        })
    }
}
