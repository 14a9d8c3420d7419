//! Shared helpers for the integration tests.

use async_trait::async_trait;

use maya_monitor::config::MonitorConfig;
use maya_monitor::discovery::lookup::{HostLookup, LookupError};
use maya_monitor::discovery::resolver::ProxyEndpoint;
use maya_monitor::probe::Probe;

/// Discovery stub returning a fixed host list for every descriptor.
pub struct StaticLookup {
    pub hosts: Vec<String>,
}

#[async_trait]
impl HostLookup for StaticLookup {
    async fn lookup(&self, _liveness_port: u16) -> Result<Vec<String>, LookupError> {
        Ok(self.hosts.clone())
    }
}

/// Probe stub that skips the MySQL round trip entirely.
pub struct FixedProbe {
    pub alive: bool,
}

#[async_trait]
impl Probe for FixedProbe {
    async fn is_alive(&self, _endpoint: &ProxyEndpoint) -> bool {
        self.alive
    }
}

/// A config pointing one proxy at localhost with the given management
/// port and alert endpoint, with short timeouts suitable for tests.
pub fn test_config(management_port: u16, alert_endpoint: &str) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.proxies = vec![format!("19601:{management_port}:mayauser:mayapass")];
    config.alerting.endpoint = alert_endpoint.to_string();
    config.alerting.group_name = "DB".to_string();
    config.alerting.alert_group = "dba-test".to_string();
    config.probe.timeout_secs = 1;
    config.fetch.timeout_secs = 2;
    config.alerting.timeout_secs = 2;
    config
}
