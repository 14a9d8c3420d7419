//! Health report wire format.
//!
//! The management endpoint returns a JSON array of backend groups:
//! `[{name, dbs: [{is_master, host, port, working_status: {error_code,
//! error_desc}, db_status}]}]`. `db_status` is an opaque blob of raw
//! server variables and is passed through untouched into alert bodies.

use serde::{Deserialize, Deserializer};

/// A parsed management report: every backend group the proxy routes to.
pub type HealthReport = Vec<BackendGroup>;

/// One named group of backends (a master plus its replicas).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendGroup {
    pub name: String,
    pub dbs: Vec<BackendRecord>,
}

/// One backend database server as the proxy sees it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendRecord {
    /// The proxy reports this as `0`/`1`; some builds emit a bool.
    #[serde(deserialize_with = "bool_from_int")]
    pub is_master: bool,
    pub host: String,
    pub port: u16,
    pub working_status: WorkingStatus,
    /// Raw per-backend status variables, opaque to the monitor.
    #[serde(default)]
    pub db_status: serde_json::Value,
}

/// Error condition the proxy's internal monitor assigned to a backend.
/// `error_code == 0` means healthy; anything else is a fault.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkingStatus {
    pub error_code: i64,
    pub error_desc: String,
}

/// Well-known `error_code` values emitted by the proxy.
pub mod codes {
    pub const OK: i64 = 0;
    pub const DB_QUERY_ERROR: i64 = 101;
    pub const DB_NO_STATUS: i64 = 102;
    pub const DB_TOO_MANY_CONNECTIONS: i64 = 103;
    pub const SLAVE_NO_STATUS: i64 = 301;
    pub const SLAVE_IO_ERROR: i64 = 302;
    pub const SLAVE_SQL_ERROR: i64 = 303;
    pub const SECONDS_BEHIND_MASTER_ERROR: i64 = 304;
    pub const DB_CONNECTION_ERROR: i64 = 401;
}

/// Coarse classification of a fault, for operator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Connection,
    Query,
    Replication,
    Other,
}

impl WorkingStatus {
    pub fn is_ok(&self) -> bool {
        self.error_code == codes::OK
    }

    /// Map the proxy's code ranges onto a coarse fault kind. Unknown codes
    /// fall through to [`FaultKind::Other`].
    pub fn kind(&self) -> FaultKind {
        match self.error_code {
            codes::DB_CONNECTION_ERROR => FaultKind::Connection,
            codes::DB_QUERY_ERROR | codes::DB_NO_STATUS | codes::DB_TOO_MANY_CONNECTIONS => {
                FaultKind::Query
            }
            codes::SLAVE_NO_STATUS
            | codes::SLAVE_IO_ERROR
            | codes::SLAVE_SQL_ERROR
            | codes::SECONDS_BEHIND_MASTER_ERROR => FaultKind::Replication,
            _ => FaultKind::Other,
        }
    }
}

fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        other => Err(D::Error::custom(format!(
            "expected bool or integer for is_master, got {other}"
        ))),
    }
}
