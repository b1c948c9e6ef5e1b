//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Path segment under the web prefix where the REST transport is mounted.
pub const REST_MOUNT: &str = "/social/rest";

/// Root configuration for the social gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// REST dispatch settings.
    pub rest: RestConfig,

    /// Security token resolution.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Settings consumed by the request dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RestConfig {
    /// Prefix the deployment is served under (e.g. "/shindig"), empty for root.
    pub web_prefix: String,

    /// Include failure traces in 500 responses.
    pub debug: bool,

    /// Strip backslash escaping from request bodies.
    ///
    /// Only for clients that still send bodies escaped the way old PHP
    /// deployments with magic quotes did.
    pub unescape_body: bool,
}

impl RestConfig {
    /// Full path prefix stripped from request URIs before routing.
    pub fn api_prefix(&self) -> String {
        format!("{}{}", self.web_prefix, REST_MOUNT)
    }
}

/// Security token resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accept unencrypted tokens passed verbatim by the client.
    pub allow_plaintext_token: bool,

    /// Query/form parameter carrying the token.
    pub token_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_plaintext_token: true,
            token_param: "st".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
