//! The NSQLite wire client: authenticated HTTP requests and JSON decoding.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::builder::ClientBuilder;
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::dsn::ConnStr;
use crate::error::NsqliteError;
use crate::message::decode::{decode_envelope, decode_stats};
use crate::message::encode::encode_batch;
use crate::message::{Query, QueryResponse, Stats, header, path};

/// Longest health-check body echoed back in an error.
const MAX_HEALTH_BODY: usize = 100;

/// HTTP client for an NSQLite server.
///
/// Cheap to share behind an `Arc`; it holds no per-connection state.
pub struct NsqliteClient {
    conn_str: ConnStr,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl NsqliteClient {
    /// Creates a client with the default transport settings.
    pub fn new(conn_str: &str) -> Result<Self, NsqliteError> {
        Self::builder(conn_str).build()
    }

    pub fn builder(conn_str: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(conn_str)
    }

    pub(crate) fn from_parts(
        conn_str: ConnStr,
        transport: Arc<dyn Transport>,
        timeout: Duration,
    ) -> Self {
        Self {
            conn_str,
            transport,
            timeout,
        }
    }

    pub fn conn_str(&self) -> &ConnStr {
        &self.conn_str
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn new_request(&self, method: Method, path: &str, body: Option<Bytes>) -> HttpRequest {
        let mut headers = vec![(header::CONTENT_TYPE.to_string(), header::JSON.to_string())];
        if self.conn_str.has_auth_token() {
            headers.push((
                header::AUTHORIZATION.to_string(),
                self.conn_str.auth_token().to_string(),
            ));
        }
        HttpRequest {
            method,
            url: self.conn_str.create_url(path),
            headers,
            body,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NsqliteError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "NSQLite request");
        tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| NsqliteError::Timeout(self.timeout))?
    }

    /// Maps 401 to an authentication error and any other non-200 status to
    /// a server error.
    fn check_status(response: &HttpResponse) -> Result<(), NsqliteError> {
        match response.status {
            200 => Ok(()),
            401 => Err(NsqliteError::Authentication(
                "please check your credentials".into(),
            )),
            status => Err(NsqliteError::Server {
                status,
                reason: response.reason.clone(),
            }),
        }
    }

    /// Checks that the server is alive.
    ///
    /// The body of `GET /health` must be `ok` in any case. An `X-Server`
    /// header, when present, must name NSQLite.
    pub async fn ping(&self) -> Result<(), NsqliteError> {
        let response = self.send(self.new_request(Method::Get, path::HEALTH, None)).await?;
        match response.status {
            200 => {}
            401 => {
                return Err(NsqliteError::Authentication(
                    "please check your credentials".into(),
                ));
            }
            _ => {
                return Err(NsqliteError::Health(format!(
                    "unwanted response status {}",
                    response.status_line()
                )));
            }
        }

        let body = response.text();
        if !body.eq_ignore_ascii_case("ok") {
            return Err(NsqliteError::Health(format!(
                "expected \"OK\" but got \"{}\"",
                truncate(&body, MAX_HEALTH_BODY)
            )));
        }

        if let Some(server) = response.header(header::SERVER_ID) {
            if !server.eq_ignore_ascii_case(header::SERVER_NAME) {
                tracing::warn!(server, "health endpoint answered by a non-NSQLite server");
                return Err(NsqliteError::Health(format!(
                    "expected NSQLite in {} header but got \"{server}\"",
                    header::SERVER_ID
                )));
            }
        }
        Ok(())
    }

    /// Health check used before handing out pooled connections.
    pub async fn is_healthy(&self) -> Result<(), NsqliteError> {
        self.ping().await
    }

    /// Returns the server version string.
    pub async fn version(&self) -> Result<String, NsqliteError> {
        let response = self.send(self.new_request(Method::Get, path::VERSION, None)).await?;
        Self::check_status(&response)?;
        Ok(response.text())
    }

    /// Returns the server statistics.
    pub async fn stats(&self) -> Result<Stats, NsqliteError> {
        let response = self.send(self.new_request(Method::Get, path::STATS, None)).await?;
        Self::check_status(&response)?;
        decode_stats(&response.body)
    }

    /// Sends one or more queries in a single request. Responses come back in
    /// the order of `queries`.
    pub async fn send_queries(&self, queries: &[Query]) -> Result<Vec<QueryResponse>, NsqliteError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let body = encode_batch(queries)?;
        tracing::debug!(queries = queries.len(), "sending query batch");
        let response = self
            .send(self.new_request(Method::Post, path::QUERY, Some(body)))
            .await?;
        Self::check_status(&response)?;

        let results = decode_envelope(&response.body)?;
        if results.len() != queries.len() {
            return Err(NsqliteError::Protocol(format!(
                "sent {} queries but got {} results",
                queries.len(),
                results.len()
            )));
        }
        Ok(results)
    }

    /// Sends a single query and returns its response.
    pub async fn send_query(&self, query: Query) -> Result<QueryResponse, NsqliteError> {
        self.send_queries(std::slice::from_ref(&query))
            .await?
            .pop()
            .ok_or_else(|| NsqliteError::Protocol("empty response".into()))
    }
}

impl std::fmt::Debug for NsqliteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NsqliteClient")
            .field("conn_str", &self.conn_str)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
