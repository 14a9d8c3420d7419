//! Management status retrieval.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::discovery::resolver::ProxyEndpoint;

/// Marker the legacy management plane puts in the body when it cannot
/// reach the proxy core. Treated the same as a connect failure.
const CONNECT_FAILURE_MARKER: &str = "couldn't connect to host";

/// Result of one management fetch: a body to evaluate, or a control-plane
/// failure that must itself be alerted. The two are distinct fault kinds;
/// an empty-but-successful report only means zero backends are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Body(String),
    Unreachable(String),
}

pub struct StatusFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl StatusFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// GET the status report from the instance's management port.
    pub async fn fetch(&self, endpoint: &ProxyEndpoint) -> FetchOutcome {
        let url = endpoint.management_url();
        let response = self.client.get(&url).timeout(self.timeout).send().await;

        let body = match response {
            Ok(response) => match response.text().await {
                Ok(body) => body,
                Err(e) => return FetchOutcome::Unreachable(e.to_string()),
            },
            Err(e) => return FetchOutcome::Unreachable(e.to_string()),
        };

        if body.contains(CONNECT_FAILURE_MARKER) {
            return FetchOutcome::Unreachable(format!(
                "management plane reported: {CONNECT_FAILURE_MARKER}"
            ));
        }
        FetchOutcome::Body(body)
    }
}
