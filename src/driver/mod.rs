//! Connection-oriented driver on top of the HTTP client: connections,
//! transactions, prepared statements and row iteration.

mod connection;
mod connector;
pub mod state_machine;
mod statement;
mod transaction;

pub use connection::Connection;
pub use connector::{ConnectionManager, Connector};
pub use state_machine::TxState;
pub use statement::{ExecResult, Rows, Statement};
pub use transaction::Transaction;
