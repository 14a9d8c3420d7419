//! Endpoint discovery subsystem.
//!
//! # Data Flow
//! ```text
//! configured descriptors (`port:management_port:user:password`)
//!     → lookup.rs (external discovery command, one host per line)
//!     → resolver.rs (flatten failover groups)
//!     → Vec<ProxyEndpoint>
//! ```

pub mod lookup;
pub mod resolver;

pub use lookup::{CommandLookup, HostLookup, LookupError};
pub use resolver::{DescriptorError, ProxyDescriptor, ProxyEndpoint, Resolver};
