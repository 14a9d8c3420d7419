//! Liveness probing subsystem.

use async_trait::async_trait;

use crate::discovery::resolver::ProxyEndpoint;

pub mod liveness;

pub use liveness::LivenessProber;

/// A boolean liveness check against one endpoint.
///
/// Object-safe so tests can substitute the protocol round trip.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_alive(&self, endpoint: &ProxyEndpoint) -> bool;
}
