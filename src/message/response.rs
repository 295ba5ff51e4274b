//! Server-to-client response payloads.

use std::fmt;

use serde::Deserialize;

use crate::types::Row;

/// Discriminator of a query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Error,
    Begin,
    Commit,
    Rollback,
    Write,
    Read,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Begin => "begin",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
            Self::Write => "write",
            Self::Read => "read",
        }
    }

    /// Parses the wire `type` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "error" => Self::Error,
            "begin" => Self::Begin,
            "commit" => Self::Commit,
            "rollback" => Self::Rollback,
            "write" => Self::Write,
            "read" => Self::Read,
            _ => return None,
        })
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one query in a batch. `time` is the server-side execution
/// time in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// The query failed on the server.
    Error { message: String, time: f64 },

    /// A transaction was started.
    Begin { tx_id: String, time: f64 },

    Commit { time: f64 },

    Rollback { time: f64 },

    /// A statement that modified data. `columns`/`rows` are only present
    /// for statements that also return rows.
    Write {
        last_insert_id: i64,
        rows_affected: i64,
        columns: Option<Vec<String>>,
        rows: Option<Vec<Row>>,
        time: f64,
    },

    /// A statement that returned rows.
    Read {
        columns: Vec<String>,
        types: Vec<String>,
        rows: Vec<Row>,
        time: f64,
    },
}

impl QueryResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Error { .. } => ResponseKind::Error,
            Self::Begin { .. } => ResponseKind::Begin,
            Self::Commit { .. } => ResponseKind::Commit,
            Self::Rollback { .. } => ResponseKind::Rollback,
            Self::Write { .. } => ResponseKind::Write,
            Self::Read { .. } => ResponseKind::Read,
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            Self::Error { time, .. }
            | Self::Begin { time, .. }
            | Self::Commit { time }
            | Self::Rollback { time }
            | Self::Write { time, .. }
            | Self::Read { time, .. } => *time,
        }
    }

    /// Returns the error message of an `Error` response.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Server statistics returned by `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub started_at: String,
    pub uptime: String,
    pub queued_writes: i64,
    pub queued_http_requests: i64,
    pub totals: StatsCounters,
    pub stats: Vec<StatsMinute>,
}

/// Aggregate counters since server start.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsCounters {
    pub reads: i64,
    pub writes: i64,
    pub begins: i64,
    pub commits: i64,
    pub rollbacks: i64,
    pub errors: i64,
    pub http_requests: i64,
}

/// Counters for a single minute.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatsMinute {
    pub minute: String,
    #[serde(flatten)]
    pub counters: StatsCounters,
}
