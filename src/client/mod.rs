//! NSQLite HTTP client: builds requests, sends query batches and decodes
//! the tagged response envelope.

mod builder;
mod http;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use builder::{
    ClientBuilder, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT,
};
pub use http::NsqliteClient;
pub use transport::{HttpRequest, HttpResponse, HyperTransport, Method, Transport};
