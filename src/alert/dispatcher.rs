//! Alert delivery to the notification CGI.
//!
//! # Responsibilities
//! - Encode the form payload in the encoding the service expects (GBK)
//! - Perform a single POST with a bounded timeout
//! - Surface the response body as the dispatch confirmation
//!
//! # Design Decisions
//! - At-most-once: failures are returned to the caller, never retried here
//! - One dispatch failure must not affect any other alert in the run

use std::time::Duration;

use encoding_rs::GBK;
use url::form_urlencoded;

use crate::alert::event::AlertEvent;
use crate::config::AlertingConfig;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("alert endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct AlertDispatcher {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(config: &AlertingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// POST one alert; the response body is the delivery confirmation.
    pub async fn dispatch(&self, event: &AlertEvent) -> Result<String, DispatchError> {
        let body = encode_form(event);
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let confirmation = response.text().await?;
        tracing::debug!(subject = %event.subject, confirmation = %confirmation, "alert accepted");
        Ok(confirmation)
    }
}

/// Percent-encode the form in GBK; the alerting CGI does not speak UTF-8.
fn encode_form(event: &AlertEvent) -> String {
    fn to_gbk(input: &str) -> std::borrow::Cow<[u8]> {
        GBK.encode(input).0
    }
    let mut binding = form_urlencoded::Serializer::new(String::new());
    let serializer = binding.encoding_override(Some(&to_gbk));
    serializer
        .append_pair("group_name", &event.group_name)
        .append_pair("service_name", &event.service_name)
        .append_pair("object", &event.object_id)
        .append_pair("subject", &event.subject)
        .append_pair("content", &event.content)
        .append_pair("gmail_to", &event.service_name)
        .append_pair("gmsg_to", &event.service_name)
        .append_pair("grade", event.severity.grade());
    serializer.finish()
}
