//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::NsqliteClient;
use crate::error::NsqliteError;

enum Scripted {
    Reply(Result<HttpResponse, NsqliteError>),
    /// Never answers; counts the request as cancelled once it is dropped.
    Stall,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    cancelled: AtomicUsize,
}

struct CancelGuard<'a>(&'a AtomicUsize);

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Scripted::Reply(Ok(response)));
    }

    /// Queues a 200 response with a JSON body.
    pub(crate) fn push_json(&self, body: &str) {
        self.push(
            HttpResponse::new(200, body.to_string()).with_header("Content-Type", "application/json"),
        );
    }

    /// Queues a `{"results":[...]}` envelope built from raw result objects.
    pub(crate) fn push_results(&self, results: &[&str]) {
        self.push_json(&format!(r#"{{"results":[{}]}}"#, results.join(",")));
    }

    pub(crate) fn push_error(&self, error: NsqliteError) {
        self.responses.lock().unwrap().push_back(Scripted::Reply(Err(error)));
    }

    /// Queues a request that hangs until its future is dropped.
    pub(crate) fn push_stall(&self) {
        self.responses.lock().unwrap().push_back(Scripted::Stall);
    }

    /// Number of stalled requests whose futures were dropped.
    pub(crate) fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Request bodies parsed as JSON, in send order.
    pub(crate) fn bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .filter_map(|r| r.body.as_ref())
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NsqliteError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(response)) => response,
            Some(Scripted::Stall) => {
                let _guard = CancelGuard(&self.cancelled);
                std::future::pending().await
            }
            None => Err(NsqliteError::transport("no scripted response")),
        }
    }
}

/// Builds a client for `conn_str` that talks to `mock`.
pub(crate) fn client(conn_str: &str, mock: &Arc<MockTransport>) -> NsqliteClient {
    NsqliteClient::builder(conn_str)
        .transport(mock.clone())
        .build()
        .unwrap()
}
