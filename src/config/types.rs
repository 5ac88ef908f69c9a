use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claim string the authorization service expects for video playback.
pub const ACCESS_VIDEO_CLAIM: &str = "access-video";

/// Address attributed to requests whose location carries no origin.
pub const DEFAULT_ORIGIN_ADDRESS: &str = "203.113.131.5";

/// Polling cadence of the validation cycle.
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Path of the gated media asset, sent as `request_path`.
pub const DEFAULT_RESOURCE_PATH: &str = "/gtv-videos-bucket/sample/BigBuckBunny.mp4";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub origin: OriginConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Endpoint that accepts the validation request as a JSON POST
    #[serde(default = "default_service_url")]
    pub url: String,
}

fn default_service_url() -> String {
    "http://127.0.0.1:3000/api/check-token".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Milliseconds between validation requests (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Claim sent as `token_claim` (default: "access-video")
    #[serde(default = "default_claim")]
    pub claim: String,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_claim() -> String {
    ACCESS_VIDEO_CLAIM.to_string()
}

impl ValidationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            claim: default_claim(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginConfig {
    /// Address used when the location carries none
    #[serde(default = "default_origin_address")]
    pub default_address: String,

    /// Location parameter holding the origin address
    #[serde(default = "default_origin_param")]
    pub param: String,
}

fn default_origin_address() -> String {
    DEFAULT_ORIGIN_ADDRESS.to_string()
}

fn default_origin_param() -> String {
    "ip".to_string()
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            default_address: default_origin_address(),
            param: default_origin_param(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_base_url")]
    pub base_url: String,

    /// Path identifying the gated asset; also sent as `request_path`
    #[serde(default = "default_resource_path")]
    pub resource_path: String,
}

fn default_media_base_url() -> String {
    "https://commondatastorage.googleapis.com".to_string()
}

fn default_resource_path() -> String {
    DEFAULT_RESOURCE_PATH.to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_media_base_url(),
            resource_path: default_resource_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Sent as `request_useragent`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sent as `request_hostname`
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Initial navigable location used by the CLI player
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_user_agent() -> String {
    format!("streamgate/{}", env!("CARGO_PKG_VERSION"))
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_location() -> String {
    "http://localhost/player".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            hostname: default_hostname(),
            location: default_location(),
        }
    }
}
