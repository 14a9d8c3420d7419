//! Host lookup through the external discovery command.
//!
//! The fleet registry is fronted by a dig-style binary: invoked with a
//! liveness port it prints the addresses currently serving that logical
//! proxy, one per line. The command itself offers no timeout contract, so
//! one is imposed here.

use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::DiscoveryConfig;

/// Errors from one discovery invocation.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("discovery command failed to start: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("discovery command exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("discovery command timed out after {0} seconds")]
    Timeout(u64),

    #[error("discovery output was not valid UTF-8")]
    Encoding,
}

/// Resolves a liveness port to the hosts currently serving it.
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn lookup(&self, liveness_port: u16) -> Result<Vec<String>, LookupError>;
}

/// Production lookup that shells out to the configured discovery binary.
pub struct CommandLookup {
    command: String,
    timeout: Duration,
}

impl CommandLookup {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl HostLookup for CommandLookup {
    async fn lookup(&self, liveness_port: u16) -> Result<Vec<String>, LookupError> {
        let output = timeout(
            self.timeout,
            Command::new(&self.command)
                .arg(liveness_port.to_string())
                .output(),
        )
        .await
        .map_err(|_| LookupError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(LookupError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| LookupError::Encoding)?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_for(command: &str) -> CommandLookup {
        CommandLookup::new(&DiscoveryConfig {
            command: command.to_string(),
            timeout_secs: 2,
        })
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let lookup = lookup_for("/nonexistent/dbdig");
        let err = lookup.lookup(19601).await.unwrap_err();
        assert!(matches!(err, LookupError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_output_lines_become_hosts() {
        // `echo` stands in for the discovery binary: one arg, prints it back.
        let lookup = lookup_for("echo");
        let hosts = lookup.lookup(19601).await.unwrap();
        assert_eq!(hosts, vec!["19601".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_command_reports_status() {
        let lookup = lookup_for("false");
        let err = lookup.lookup(19601).await.unwrap_err();
        assert!(matches!(err, LookupError::Failed { .. }));
    }
}
