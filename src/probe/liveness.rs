//! MySQL-protocol liveness probing.
//!
//! # Responsibilities
//! - Open a fresh protocol connection per probe
//! - Issue `SELECT 1` and verify the returned constant
//! - Close the connection regardless of outcome
//!
//! # Design Decisions
//! - The whole round trip races one timeout so a hung endpoint cannot
//!   stall the run
//! - The probe is a pure boolean check; liveness alerting belongs to the
//!   orchestrator

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection};
use tokio::time::timeout;

use crate::config::ProbeConfig;
use crate::discovery::resolver::ProxyEndpoint;
use crate::probe::Probe;

/// Value `SELECT 1` must come back with for the endpoint to count as alive.
const EXPECTED_PROBE_VALUE: i64 = 1;

pub struct LivenessProber {
    timeout: Duration,
    database: String,
}

impl LivenessProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            database: config.database.clone(),
        }
    }

    async fn round_trip(&self, endpoint: &ProxyEndpoint) -> Result<i64, sqlx::Error> {
        let options = MySqlConnectOptions::new()
            .host(&endpoint.host)
            .port(endpoint.liveness_port)
            .username(&endpoint.username)
            .password(&endpoint.password)
            .database(&self.database);

        let mut conn = MySqlConnection::connect_with(&options).await?;
        let value = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&mut conn)
            .await;
        // close even when the query failed; the connection must not leak
        let _ = conn.close().await;
        value
    }
}

#[async_trait]
impl Probe for LivenessProber {
    /// True when the endpoint accepts a connection and answers `SELECT 1`
    /// with the expected constant. Never raises; every failure mode reads
    /// as not-alive.
    async fn is_alive(&self, endpoint: &ProxyEndpoint) -> bool {
        match timeout(self.timeout, self.round_trip(endpoint)).await {
            Ok(Ok(value)) if value == EXPECTED_PROBE_VALUE => true,
            Ok(Ok(value)) => {
                tracing::warn!(
                    host = %endpoint.host,
                    port = endpoint.liveness_port,
                    value,
                    "liveness query returned unexpected value"
                );
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    host = %endpoint.host,
                    port = endpoint.liveness_port,
                    error = %e,
                    "liveness probe failed"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    host = %endpoint.host,
                    port = endpoint.liveness_port,
                    timeout_secs = self.timeout.as_secs(),
                    "liveness probe timed out"
                );
                false
            }
        }
    }
}
