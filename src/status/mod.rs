//! Management status subsystem.
//!
//! # Data Flow
//! ```text
//! alive endpoint
//!     → fetcher.rs (GET http://host:management_port, bounded timeout)
//!     → report.rs (serde wire types)
//!     → evaluator.rs (exclusions, healthy/fault classification)
//!     → AlertEvents + healthy log records
//! ```
//!
//! # Design Decisions
//! - Management unreachability and an empty report are distinct outcomes:
//!   one is a control-plane fault, the other may mean zero backends
//! - Liveness and management status are independent signals; neither
//!   implies the other

pub mod evaluator;
pub mod fetcher;
pub mod report;

pub use evaluator::{Evaluation, HealthyRecord, ParseError, StatusEvaluator};
pub use fetcher::{FetchOutcome, StatusFetcher};
pub use report::{BackendGroup, BackendRecord, FaultKind, HealthReport, WorkingStatus};
