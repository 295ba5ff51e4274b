//! Client builder and transport configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::client::NsqliteClient;
use crate::client::transport::{HyperTransport, Transport};
use crate::dsn::ConnStr;
use crate::error::NsqliteError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 100;
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builder for configuring an [`NsqliteClient`].
pub struct ClientBuilder {
    conn_str: String,
    timeout: Duration,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub(crate) fn new(conn_str: impl Into<String>) -> Self {
        Self {
            conn_str: conn_str.into(),
            timeout: DEFAULT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: Some(DEFAULT_POOL_IDLE_TIMEOUT),
            transport: None,
        }
    }

    /// Sets the per-request timeout, covering connect, send and body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many idle keep-alive connections are kept per host.
    /// Ignored when a custom transport is set.
    pub fn pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Sets how long idle keep-alive connections are kept, `None` for no
    /// limit. Ignored when a custom transport is set.
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Replaces the default hyper transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Parses the connection string and builds the client.
    pub fn build(self) -> Result<NsqliteClient, NsqliteError> {
        let conn_str = ConnStr::parse(&self.conn_str)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HyperTransport::new(
                self.pool_max_idle_per_host,
                self.pool_idle_timeout,
            )),
        };

        tracing::debug!(
            conn_str = %conn_str,
            timeout = ?self.timeout,
            "NSQLite client configured"
        );
        Ok(NsqliteClient::from_parts(conn_str, transport, self.timeout))
    }
}
