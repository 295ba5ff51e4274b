//! Client-to-server query payloads.

use serde::Serialize;

use crate::types::NsqliteValue;

/// One parameter of a parameterized query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    /// Parameter name for named placeholders, `None` for positional ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: NsqliteValue,
}

impl QueryParam {
    /// Creates a positional parameter.
    pub fn positional(value: impl Into<NsqliteValue>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// Creates a named parameter.
    pub fn named(name: impl Into<String>, value: impl Into<NsqliteValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

impl From<NsqliteValue> for QueryParam {
    fn from(value: NsqliteValue) -> Self {
        Self::positional(value)
    }
}

/// A query sent to the remote server, optionally inside a transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Query {
    /// The SQL text (required).
    pub query: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<QueryParam>,
    #[serde(rename = "txId", skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

impl Query {
    /// Creates a query without parameters or transaction.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Sets the parameters.
    pub fn params(mut self, params: Vec<QueryParam>) -> Self {
        self.params = params;
        self
    }

    /// Runs the query inside the given transaction. `None` or an empty id
    /// leaves the query outside any transaction.
    pub fn tx_id(mut self, tx_id: Option<&str>) -> Self {
        self.tx_id = tx_id.filter(|id| !id.is_empty()).map(str::to_owned);
        self
    }

    pub fn begin() -> Self {
        Self::new("BEGIN;")
    }

    pub fn commit(tx_id: &str) -> Self {
        Self::new("COMMIT;").tx_id(Some(tx_id))
    }

    pub fn rollback(tx_id: &str) -> Self {
        Self::new("ROLLBACK;").tx_id(Some(tx_id))
    }
}
