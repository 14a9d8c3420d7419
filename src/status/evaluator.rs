//! Backend status evaluation.
//!
//! # Responsibilities
//! - Parse the management report into groups of backend records
//! - Apply the exclusion set before any classification
//! - Classify `error_code == 0` as healthy, anything else as a critical fault
//! - Produce alert events for faults and log-only records for healthy backends
//!
//! # Design Decisions
//! - Excluded hosts are invisible: no alert, no healthy record, no count
//! - A zero-group report is a warning, not an alert; it usually means a
//!   stale management endpoint rather than an all-healthy fleet
//! - Evaluation is deterministic in its inputs; the check time is a
//!   parameter, so equal reports produce identical alert sequences

use std::collections::HashSet;

use chrono::{DateTime, Local};

use crate::alert::event::{AlertEvent, AlertRoute};
use crate::discovery::resolver::ProxyEndpoint;
use crate::status::report::HealthReport;

/// The report body was not a valid health report.
#[derive(Debug, thiserror::Error)]
#[error("malformed health report: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// One healthy backend observation. Logged for operator visibility, never
/// alerted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthyRecord {
    pub group: String,
    pub host: String,
    pub port: u16,
    pub desc: String,
}

/// Everything one report evaluates to, in report order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub alerts: Vec<AlertEvent>,
    pub healthy: Vec<HealthyRecord>,
    /// The report parsed but contained zero backend groups.
    pub empty_report: bool,
}

pub struct StatusEvaluator {
    route: AlertRoute,
    exclusions: HashSet<String>,
}

impl StatusEvaluator {
    pub fn new(route: AlertRoute, exclusions: HashSet<String>) -> Self {
        Self { route, exclusions }
    }

    /// Evaluate a raw report body fetched from one proxy.
    pub fn evaluate(
        &self,
        endpoint: &ProxyEndpoint,
        body: &str,
        at: DateTime<Local>,
    ) -> Result<Evaluation, ParseError> {
        let report: HealthReport = serde_json::from_str(body)?;
        Ok(self.evaluate_report(endpoint, &report, at))
    }

    /// Classify every record of an already-parsed report.
    pub fn evaluate_report(
        &self,
        endpoint: &ProxyEndpoint,
        report: &HealthReport,
        at: DateTime<Local>,
    ) -> Evaluation {
        let mut evaluation = Evaluation {
            empty_report: report.is_empty(),
            ..Evaluation::default()
        };

        for group in report {
            for record in &group.dbs {
                if self.exclusions.contains(&record.host) {
                    tracing::debug!(
                        group = %group.name,
                        backend_host = %record.host,
                        backend_port = record.port,
                        "backend excluded from evaluation"
                    );
                    continue;
                }

                if record.working_status.is_ok() {
                    evaluation.healthy.push(HealthyRecord {
                        group: group.name.clone(),
                        host: record.host.clone(),
                        port: record.port,
                        desc: record.working_status.error_desc.clone(),
                    });
                } else {
                    tracing::warn!(
                        group = %group.name,
                        backend_host = %record.host,
                        backend_port = record.port,
                        error_code = record.working_status.error_code,
                        kind = ?record.working_status.kind(),
                        is_master = record.is_master,
                        "backend fault"
                    );
                    evaluation
                        .alerts
                        .push(AlertEvent::backend_fault(&self.route, endpoint, record, at));
                }
            }
        }
        evaluation
    }
}
