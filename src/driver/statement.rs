//! Prepared statements and their results.

use crate::driver::Connection;
use crate::error::NsqliteError;
use crate::message::{QueryParam, QueryResponse, ResponseKind};
use crate::types::Row;

/// A prepared statement bound to a connection.
///
/// NSQLite has no server-side prepare, so a statement is just the query
/// text. Each execution picks up the connection's transaction at call time.
pub struct Statement<'c> {
    conn: &'c mut Connection,
    query: String,
}

impl<'c> Statement<'c> {
    pub(crate) fn new(conn: &'c mut Connection, query: String) -> Self {
        Self { conn, query }
    }

    pub fn query_text(&self) -> &str {
        &self.query
    }

    /// Number of placeholders, always `None` (unknown) since the text is
    /// not parsed client-side.
    pub fn num_input(&self) -> Option<usize> {
        None
    }

    /// Executes a statement that does not return rows (INSERT, UPDATE, ...).
    pub async fn execute(&mut self, params: Vec<QueryParam>) -> Result<ExecResult, NsqliteError> {
        self.conn.execute(&self.query, params).await
    }

    /// Executes a statement that returns rows (SELECT).
    pub async fn query(&mut self, params: Vec<QueryParam>) -> Result<Rows, NsqliteError> {
        self.conn.query(&self.query, params).await
    }

    /// Releases the statement. Nothing is held server-side.
    pub fn close(self) {}
}

/// Outcome of a write statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecResult {
    last_insert_id: i64,
    rows_affected: i64,
    columns: Option<Vec<String>>,
    rows: Option<Vec<Row>>,
}

impl ExecResult {
    /// Accepts only `write` responses.
    pub(crate) fn from_response(response: QueryResponse) -> Result<Self, NsqliteError> {
        match response {
            QueryResponse::Write {
                last_insert_id,
                rows_affected,
                columns,
                rows,
                ..
            } => Ok(Self {
                last_insert_id,
                rows_affected,
                columns,
                rows,
            }),
            QueryResponse::Error { message, .. } => Err(NsqliteError::Query(message)),
            other => Err(NsqliteError::UnexpectedResponse {
                expected: ResponseKind::Write,
                actual: other.kind(),
            }),
        }
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    /// Columns of a `RETURNING` clause, if the statement had one.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Rows of a `RETURNING` clause, if the statement had one.
    pub fn returning(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }
}

/// Rows returned by a read statement.
///
/// The whole result arrives in one HTTP response and is buffered; iterate
/// with [`Rows::next_row`] or as an [`Iterator`].
#[derive(Debug)]
pub struct Rows {
    columns: Vec<String>,
    types: Vec<String>,
    rows: std::vec::IntoIter<Row>,
}

impl Rows {
    /// Accepts only `read` responses.
    pub(crate) fn from_response(response: QueryResponse) -> Result<Self, NsqliteError> {
        match response {
            QueryResponse::Read {
                columns,
                types,
                rows,
                ..
            } => Ok(Self {
                columns,
                types,
                rows: rows.into_iter(),
            }),
            QueryResponse::Error { message, .. } => Err(NsqliteError::Query(message)),
            other => Err(NsqliteError::UnexpectedResponse {
                expected: ResponseKind::Read,
                actual: other.kind(),
            }),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Declared column types as reported by the server.
    pub fn column_types(&self) -> &[String] {
        &self.types
    }

    /// Upper-cased declared type of column `index`, empty when unknown.
    /// Advisory only: values are already typed when decoded.
    pub fn column_type_database_type_name(&self, index: usize) -> String {
        self.types
            .get(index)
            .map(|t| t.to_uppercase())
            .unwrap_or_default()
    }

    /// Returns the next row, or `None` once every row has been read.
    pub fn next_row(&mut self) -> Option<Row> {
        self.rows.next()
    }

    /// Rows not yet read.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn close(self) {}
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.next_row()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
