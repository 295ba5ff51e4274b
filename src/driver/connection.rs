//! A logical connection to an NSQLite server.

use std::sync::Arc;

use crate::client::NsqliteClient;
use crate::driver::state_machine::TxState;
use crate::driver::statement::{ExecResult, Rows, Statement};
use crate::driver::transaction::Transaction;
use crate::error::NsqliteError;
use crate::message::{Query, QueryParam, QueryResponse, ResponseKind};

/// A stateful connection on top of the stateless HTTP client.
///
/// The only state is the active transaction id, which is attached to every
/// query sent while a transaction is open. Every stateful operation takes
/// `&mut self`, so a connection serves one caller at a time; pools hand it
/// out exclusively and call [`Connection::reset_session`] on return.
pub struct Connection {
    client: Arc<NsqliteClient>,
    state: TxState,
}

impl Connection {
    pub fn new(client: Arc<NsqliteClient>) -> Self {
        Self {
            client,
            state: TxState::Idle,
        }
    }

    pub fn client(&self) -> &NsqliteClient {
        &self.client
    }

    pub fn state(&self) -> &TxState {
        &self.state
    }

    /// The active transaction id, if any.
    pub fn tx_id(&self) -> Option<&str> {
        self.state.tx_id()
    }

    /// Prepares a statement. No round trip is made.
    pub fn prepare(&mut self, query: impl Into<String>) -> Statement<'_> {
        Statement::new(self, query.into())
    }

    /// Runs a statement that does not return rows and expects a `write`
    /// response.
    pub async fn execute(
        &mut self,
        query: &str,
        params: Vec<QueryParam>,
    ) -> Result<ExecResult, NsqliteError> {
        let response = self.send(query, params).await?;
        ExecResult::from_response(response)
    }

    /// Runs a statement that returns rows and expects a `read` response.
    pub async fn query(&mut self, query: &str, params: Vec<QueryParam>) -> Result<Rows, NsqliteError> {
        let response = self.send(query, params).await?;
        Rows::from_response(response)
    }

    async fn send(&self, query: &str, params: Vec<QueryParam>) -> Result<QueryResponse, NsqliteError> {
        let query = Query::new(query).params(params).tx_id(self.state.tx_id());
        self.client.send_query(query).await
    }

    /// Starts a transaction and stores the server-issued id.
    ///
    /// Fails without a round trip if a transaction is already active.
    pub async fn begin(&mut self) -> Result<Transaction<'_>, NsqliteError> {
        self.state.check_begin()?;

        match self.client.send_query(Query::begin()).await? {
            QueryResponse::Begin { tx_id, .. } => {
                tracing::debug!(tx_id = %tx_id, "transaction started");
                self.state.begin(tx_id)?;
            }
            QueryResponse::Error { message, .. } => {
                return Err(NsqliteError::Query(format!(
                    "failed to begin transaction: {message}"
                )));
            }
            other => {
                return Err(NsqliteError::UnexpectedResponse {
                    expected: ResponseKind::Begin,
                    actual: other.kind(),
                });
            }
        }
        Ok(Transaction::new(self))
    }

    /// Commits the active transaction. A no-op when idle.
    pub async fn commit(&mut self) -> Result<(), NsqliteError> {
        self.end_transaction(ResponseKind::Commit).await
    }

    /// Rolls back the active transaction. A no-op when idle.
    pub async fn rollback(&mut self) -> Result<(), NsqliteError> {
        self.end_transaction(ResponseKind::Rollback).await
    }

    async fn end_transaction(&mut self, kind: ResponseKind) -> Result<(), NsqliteError> {
        // The id is cleared before the round trip: a failed or cancelled
        // COMMIT/ROLLBACK never leaves a stale id behind.
        let Some(tx_id) = self.state.finish() else {
            return Ok(());
        };

        let query = match kind {
            ResponseKind::Commit => Query::commit(&tx_id),
            _ => Query::rollback(&tx_id),
        };
        tracing::debug!(tx_id = %tx_id, action = %kind, "ending transaction");

        let response = self.client.send_query(query).await?;
        match response {
            r if r.kind() == kind => Ok(()),
            QueryResponse::Error { message, .. } => Err(NsqliteError::Query(format!(
                "failed to {kind} transaction {tx_id}: {message}"
            ))),
            other => Err(NsqliteError::UnexpectedResponse {
                expected: kind,
                actual: other.kind(),
            }),
        }
    }

    /// Checks that the server is reachable. Does not touch the transaction.
    pub async fn ping(&self) -> Result<(), NsqliteError> {
        self.client.ping().await
    }

    /// Prepares the connection for reuse by rolling back any open
    /// transaction. A failed rollback yields
    /// [`NsqliteError::BadConnection`]: discard the connection.
    pub async fn reset_session(&mut self) -> Result<(), NsqliteError> {
        self.rollback()
            .await
            .map_err(|e| NsqliteError::BadConnection(Box::new(e)))
    }

    /// Whether the server still answers health checks.
    pub async fn is_valid(&self) -> bool {
        match self.client.is_healthy().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "connection failed validity check");
                false
            }
        }
    }

    /// Closes the connection, rolling back any open transaction.
    ///
    /// Rollback failures are logged, not returned.
    pub async fn close(mut self) {
        if let Err(e) = self.rollback().await {
            tracing::warn!(error = %e, "failed to roll back transaction while closing connection");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(tx_id) = self.state.tx_id() {
            tracing::warn!(tx_id, "connection dropped with an open transaction");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("conn_str", self.client.conn_str())
            .field("state", &self.state)
            .finish()
    }
}
