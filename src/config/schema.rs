//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the maya fleet monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Proxy descriptors in `port:management_port:user:password` form.
    pub proxies: Vec<String>,

    /// Backend hosts permanently exempt from fault evaluation.
    pub excluded_hosts: Vec<String>,

    /// Discovery command settings.
    pub discovery: DiscoveryConfig,

    /// Liveness probe settings.
    pub probe: ProbeConfig,

    /// Management status fetch settings.
    pub fetch: FetchConfig,

    /// Alert delivery settings.
    pub alerting: AlertingConfig,

    /// Worker pool settings.
    pub workers: WorkerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// External discovery command configuration.
///
/// The command is invoked with a liveness port as its single argument and
/// prints one resolved host address per line.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Path to the discovery command binary.
    pub command: String,

    /// Timeout imposed on each command invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            command: "dbdig".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Liveness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Timeout for the whole connect-query-close round trip, in seconds.
    pub timeout_secs: u64,

    /// Database selected when opening the probe connection.
    pub database: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            database: "test".to_string(),
        }
    }
}

/// Management status fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for the status GET, in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

/// Alert delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// URL of the alerting CGI endpoint.
    pub endpoint: String,

    /// Notification group routed to (`group_name` on the wire).
    pub group_name: String,

    /// Alert group / service channel inside the notification group
    /// (`service_name`, `gmail_to` and `gmsg_to` on the wire).
    pub alert_group: String,

    /// Timeout for the alert POST, in seconds.
    pub timeout_secs: u64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://imonitor.sina.com.cn/cgi-bin/alertmail.cgi".to_string(),
            group_name: "DB".to_string(),
            alert_group: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum endpoints checked concurrently.
    pub max_workers: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { max_workers: 8 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level directive (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
