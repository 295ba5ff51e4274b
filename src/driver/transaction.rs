//! Explicit transaction handle.

use std::ops::{Deref, DerefMut};

use crate::driver::Connection;
use crate::error::NsqliteError;

/// An open transaction on a connection.
///
/// Dereferences to the connection, so statements prepared or executed
/// through it run inside the transaction. Dropping the handle without
/// committing leaves the transaction open until the connection is
/// rolled back, reset or closed.
#[derive(Debug)]
pub struct Transaction<'c> {
    conn: &'c mut Connection,
}

impl<'c> Transaction<'c> {
    pub(crate) fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    pub async fn commit(self) -> Result<(), NsqliteError> {
        self.conn.commit().await
    }

    pub async fn rollback(self) -> Result<(), NsqliteError> {
        self.conn.rollback().await
    }
}

impl Deref for Transaction<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
    }
}
