//! Monitor orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! MonitorConfig
//!     → orchestrator.rs (resolve, fan out bounded workers)
//!     → per-endpoint: probe → fetch → evaluate → dispatch
//!     → outcome.rs (tagged dispositions, RunSummary)
//! ```
//!
//! # Design Decisions
//! - One terminal pass per invocation; scheduling lives outside
//! - Per-endpoint isolation: the loop over endpoints is order-insensitive

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::Monitor;
pub use outcome::{Disposition, EndpointOutcome, RunSummary};
