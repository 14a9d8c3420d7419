//! Alert events and their subject/content templates.

use chrono::{DateTime, Local};

use crate::discovery::resolver::ProxyEndpoint;
use crate::status::report::BackendRecord;

/// Wire severity grades understood by the alerting CGI. Every fault this
/// monitor raises is critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
}

impl Severity {
    pub fn grade(&self) -> &'static str {
        match self {
            Severity::Critical => "-1",
        }
    }
}

/// Routing identity for outgoing alerts: the notification group and the
/// service channel inside it.
#[derive(Debug, Clone)]
pub struct AlertRoute {
    pub group_name: String,
    pub service_name: String,
}

/// A single alert notification. Created on fault detection, consumed
/// immediately by the dispatcher, not retained afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub group_name: String,
    pub service_name: String,
    pub object_id: String,
    pub subject: String,
    pub content: String,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
}

/// Check-time stamp format used in every subject line.
pub fn format_check_time(at: DateTime<Local>) -> String {
    at.format("%y-%m-%d %H:%M:%S").to_string()
}

impl AlertEvent {
    /// Proxy refused or failed the liveness round trip.
    pub fn liveness_failure(
        route: &AlertRoute,
        endpoint: &ProxyEndpoint,
        at: DateTime<Local>,
    ) -> Self {
        let subject = format!(
            "DB:check_maya({host}:{port}) : Critical, conn {host}:{port} failed. check_time:{time}",
            host = endpoint.host,
            port = endpoint.liveness_port,
            time = format_check_time(at),
        );
        Self {
            group_name: route.group_name.clone(),
            service_name: route.service_name.clone(),
            object_id: ":".to_string(),
            content: subject.clone(),
            subject,
            severity: Severity::Critical,
            timestamp: at,
        }
    }

    /// Management port unreachable while the proxy itself is alive.
    pub fn management_down(
        route: &AlertRoute,
        endpoint: &ProxyEndpoint,
        at: DateTime<Local>,
    ) -> Self {
        let subject = format!(
            "DB:check_maya({host}:{port}) : Critical, conn {host}:{mport} management failed. check_time:{time}",
            host = endpoint.host,
            port = endpoint.liveness_port,
            mport = endpoint.management_port,
            time = format_check_time(at),
        );
        Self {
            group_name: route.group_name.clone(),
            service_name: route.service_name.clone(),
            object_id: ":".to_string(),
            content: subject.clone(),
            subject,
            severity: Severity::Critical,
            timestamp: at,
        }
    }

    /// A backend behind the proxy reported a nonzero working status.
    pub fn backend_fault(
        route: &AlertRoute,
        endpoint: &ProxyEndpoint,
        record: &BackendRecord,
        at: DateTime<Local>,
    ) -> Self {
        let master = if record.is_master { "Master " } else { "" };
        let subject = format!(
            "DB:check_maya_db({host}:{port}) : {master}Critical, mysql {db_host}:{db_port} is {desc}. check_time:{time}",
            host = endpoint.host,
            port = endpoint.liveness_port,
            db_host = record.host,
            db_port = record.port,
            desc = record.working_status.error_desc,
            time = format_check_time(at),
        );
        let content = format!(
            "{subject}\n== working_status ==\nerror_code:{code} error_desc:{desc}\n== db_status ==\n{db_status}",
            code = record.working_status.error_code,
            desc = record.working_status.error_desc,
            db_status = record.db_status,
        );
        Self {
            group_name: route.group_name.clone(),
            service_name: route.service_name.clone(),
            object_id: ":".to_string(),
            subject,
            content,
            severity: Severity::Critical,
            timestamp: at,
        }
    }
}
