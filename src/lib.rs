//! nsqlite: a pure-Rust client and driver for the NSQLite HTTP/JSON SQL server.
//!
//! NSQLite is reachable only over HTTP: every query is a JSON request and
//! every answer a JSON envelope. This crate maps that stateless protocol
//! onto connections, transactions and row iteration.
//!
//! # Architecture
//!
//! - **`dsn`**: Connection strings (`http://host:port?authToken=...`)
//! - **`message`**: Query payloads and the tagged response envelope
//! - **`types`**: NSQLite scalar values
//! - **`client`**: HTTP client: health, version, stats and query batches
//! - **`driver`**: Connections, transactions, statements and rows
//!
//! Operations are async. Dropping a future cancels the in-flight request;
//! the client's timeout bounds each request.

pub mod client;
pub mod driver;
pub mod dsn;
pub mod error;
pub mod message;
pub mod types;

pub use client::NsqliteClient;
pub use driver::{Connection, Connector, ExecResult, Rows, Statement, Transaction};
pub use dsn::ConnStr;
pub use error::{NsqliteError, ParseError};
pub use message::{Query, QueryParam, QueryResponse, ResponseKind};
pub use types::NsqliteValue;
