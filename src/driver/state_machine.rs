//! Connection transaction state machine.
//!
//! NSQLite is stateless over HTTP; a transaction exists only as a
//! server-issued id that every query inside it must carry. The connection
//! keeps that id here.

use crate::error::NsqliteError;

/// The transaction state of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TxState {
    /// No active transaction; queries run in auto-commit mode.
    #[default]
    Idle,
    /// Inside an explicit transaction.
    InTransaction { tx_id: String },
}

impl TxState {
    /// The active transaction id, if any.
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::InTransaction { tx_id } => Some(tx_id),
        }
    }

    pub fn is_in_transaction(&self) -> bool {
        matches!(self, Self::InTransaction { .. })
    }

    /// Checks that BEGIN may be sent. An active transaction id is never
    /// overwritten.
    pub fn check_begin(&self) -> Result<(), NsqliteError> {
        match self {
            Self::Idle => Ok(()),
            Self::InTransaction { tx_id } => Err(NsqliteError::Transaction(format!(
                "transaction {tx_id} is already active on this connection"
            ))),
        }
    }

    /// Records the id returned by a successful BEGIN.
    pub fn begin(&mut self, tx_id: String) -> Result<(), NsqliteError> {
        self.check_begin()?;
        *self = Self::InTransaction { tx_id };
        Ok(())
    }

    /// Ends the transaction and returns its id, leaving the state `Idle`.
    ///
    /// COMMIT and ROLLBACK take the id before the round trip, so the state
    /// is reset whether or not the request succeeds.
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::InTransaction { tx_id } => Some(tx_id),
        }
    }
}
