//! Connection factory and pool integration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::NsqliteClient;
use crate::driver::Connection;
use crate::error::NsqliteError;

/// Hooks an external connection pool calls around check-out and check-in.
///
/// A pool must hand each connection to one caller at a time, call
/// [`recycle`](ConnectionManager::recycle) when it comes back and discard
/// it when recycling fails or [`is_valid`](ConnectionManager::is_valid)
/// returns false. Retrying is left to the pool.
#[async_trait]
pub trait ConnectionManager: Send + Sync + 'static {
    type Connection: Send;

    /// Opens a new connection.
    async fn connect(&self) -> Result<Self::Connection, NsqliteError>;

    /// Last-chance health check before a connection is reused.
    async fn is_valid(&self, conn: &mut Self::Connection) -> bool;

    /// Resets session state before a connection is reused.
    async fn recycle(&self, conn: &mut Self::Connection) -> Result<(), NsqliteError>;
}

/// Creates connections that share one [`NsqliteClient`].
///
/// Build it once at startup and pass it to whatever needs connections;
/// clones share the same client and its HTTP connection pool.
#[derive(Clone, Debug)]
pub struct Connector {
    client: Arc<NsqliteClient>,
}

impl Connector {
    pub fn new(client: Arc<NsqliteClient>) -> Self {
        Self { client }
    }

    /// Parses `conn_str` and builds a client with default settings.
    pub fn from_conn_str(conn_str: &str) -> Result<Self, NsqliteError> {
        Ok(Self::new(Arc::new(NsqliteClient::new(conn_str)?)))
    }

    pub fn client(&self) -> &Arc<NsqliteClient> {
        &self.client
    }

    /// Returns a new idle connection. No request is made.
    pub fn connect(&self) -> Connection {
        Connection::new(self.client.clone())
    }
}

#[async_trait]
impl ConnectionManager for Connector {
    type Connection = Connection;

    async fn connect(&self) -> Result<Connection, NsqliteError> {
        Ok(Connector::connect(self))
    }

    async fn is_valid(&self, conn: &mut Connection) -> bool {
        conn.is_valid().await
    }

    async fn recycle(&self, conn: &mut Connection) -> Result<(), NsqliteError> {
        conn.reset_session().await
    }
}
