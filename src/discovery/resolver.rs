//! Proxy descriptor parsing and endpoint resolution.
//!
//! # Responsibilities
//! - Parse `port:management_port:user:password` descriptors
//! - Expand each descriptor into the hosts discovery reports for it
//! - Flatten multi-host failover groups into one endpoint list

use std::sync::Arc;

use crate::discovery::lookup::HostLookup;

/// One configured proxy group, before discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    pub liveness_port: u16,
    pub management_port: u16,
    pub username: String,
    pub password: String,
}

/// Errors from descriptor parsing. These are configuration errors and are
/// surfaced by validation before any probing begins.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("expected `port:management_port:user:password`, got {0} fields")]
    FieldCount(usize),

    #[error("invalid port `{0}`")]
    Port(String),

    #[error("missing credential")]
    MissingCredential,
}

impl ProxyDescriptor {
    /// Parse the `port:management_port:user:password` form. The password is
    /// the final field and may itself contain `:`.
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        let fields: Vec<&str> = raw.splitn(4, ':').collect();
        if fields.len() != 4 {
            return Err(DescriptorError::FieldCount(fields.len()));
        }

        let liveness_port = fields[0]
            .trim()
            .parse()
            .map_err(|_| DescriptorError::Port(fields[0].to_string()))?;
        let management_port = fields[1]
            .trim()
            .parse()
            .map_err(|_| DescriptorError::Port(fields[1].to_string()))?;

        if fields[2].is_empty() || fields[3].is_empty() {
            return Err(DescriptorError::MissingCredential);
        }

        Ok(Self {
            liveness_port,
            management_port,
            username: fields[2].to_string(),
            password: fields[3].to_string(),
        })
    }
}

/// A concrete monitored instance produced by discovery. Immutable once
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub liveness_port: u16,
    pub management_port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyEndpoint {
    /// Base URL of the management plane for this instance.
    pub fn management_url(&self) -> String {
        format!("http://{}:{}", self.host, self.management_port)
    }
}

/// Resolves descriptors into endpoints through a [`HostLookup`].
pub struct Resolver {
    lookup: Arc<dyn HostLookup>,
}

impl Resolver {
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve every descriptor, flattening multi-host failover groups.
    ///
    /// A descriptor whose lookup fails or returns zero hosts is skipped
    /// with a warning; this is not fatal to the run.
    pub async fn resolve(&self, descriptors: &[ProxyDescriptor]) -> Vec<ProxyEndpoint> {
        let mut endpoints = Vec::new();
        for descriptor in descriptors {
            let hosts = match self.lookup.lookup(descriptor.liveness_port).await {
                Ok(hosts) => hosts,
                Err(e) => {
                    tracing::warn!(
                        port = descriptor.liveness_port,
                        error = %e,
                        "discovery failed, skipping proxy"
                    );
                    continue;
                }
            };

            if hosts.is_empty() {
                tracing::warn!(
                    port = descriptor.liveness_port,
                    "proxy not in discovery, skipping"
                );
                continue;
            }

            for host in hosts {
                endpoints.push(ProxyEndpoint {
                    host,
                    liveness_port: descriptor.liveness_port,
                    management_port: descriptor.management_port,
                    username: descriptor.username.clone(),
                    password: descriptor.password.clone(),
                });
            }
        }
        endpoints
    }
}
