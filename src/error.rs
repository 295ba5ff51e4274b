//! Error types for the NSQLite client and driver.

use std::time::Duration;

use crate::message::ResponseKind;

/// Errors produced while parsing a connection string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid protocol {0:?}, must be http or https")]
    InvalidProtocol(String),

    #[error("host is required")]
    MissingHost,

    #[error("malformed connection string: {0}")]
    MalformedInput(String),
}

/// Errors that can occur while talking to an NSQLite server.
#[derive(Debug, thiserror::Error)]
pub enum NsqliteError {
    #[error("invalid connection string: {0}")]
    Parse(#[from] ParseError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("unwanted response status: {status} {reason}")]
    Server { status: u16, reason: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unexpected response type: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: ResponseKind,
        actual: ResponseKind,
    },

    #[error("query error: {0}")]
    Query(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("health check failed: {0}")]
    Health(String),

    #[error("bad connection, error resetting session: {0}")]
    BadConnection(Box<NsqliteError>),
}

impl NsqliteError {
    /// Wraps any displayable error as a transport error.
    pub fn transport(e: impl std::fmt::Display) -> Self {
        Self::Transport(e.to_string())
    }

    /// Wraps any displayable error as a protocol error.
    pub fn protocol(e: impl std::fmt::Display) -> Self {
        Self::Protocol(e.to_string())
    }

    /// True for network failures and timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// True when the connection must be discarded instead of reused.
    pub fn is_bad_connection(&self) -> bool {
        matches!(self, Self::BadConnection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_predicate_covers_timeouts() {
        assert!(NsqliteError::transport("connection refused").is_transport());
        assert!(NsqliteError::Timeout(Duration::from_secs(1)).is_transport());
        assert!(!NsqliteError::Protocol("empty response".into()).is_transport());
    }

    #[test]
    fn bad_connection_keeps_cause() {
        let err = NsqliteError::BadConnection(Box::new(NsqliteError::transport("reset by peer")));
        assert!(err.is_bad_connection());
        assert!(err.to_string().contains("reset by peer"));
    }

    #[test]
    fn unexpected_response_names_both_kinds() {
        let err = NsqliteError::UnexpectedResponse {
            expected: ResponseKind::Write,
            actual: ResponseKind::Read,
        };
        assert_eq!(
            err.to_string(),
            "unexpected response type: expected write, got read"
        );
    }
}
