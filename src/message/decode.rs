//! Decode JSON response bodies into typed responses.

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{QueryResponse, ResponseKind, Stats};
use crate::error::NsqliteError;
use crate::types::{NsqliteValue, Row};

/// The `{"results": [...]}` envelope of `POST /query`.
#[derive(Deserialize)]
struct RawEnvelope {
    results: Option<Vec<RawResult>>,
}

/// One result as it appears on the wire: a flat record whose populated
/// fields depend on `type`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    #[serde(rename = "type")]
    kind: Option<String>,
    time: Option<f64>,
    columns: Option<Vec<String>>,
    types: Option<Vec<String>>,
    values: Option<Vec<Vec<Box<RawValue>>>>,
    last_insert_id: Option<i64>,
    rows_affected: Option<i64>,
    tx_id: Option<String>,
    error: Option<String>,
}

/// Decodes the response body of `POST /query`.
///
/// Fails with a protocol error if the envelope is missing, malformed or
/// holds no results.
pub fn decode_envelope(body: &[u8]) -> Result<Vec<QueryResponse>, NsqliteError> {
    let envelope: RawEnvelope = serde_json::from_slice(body)
        .map_err(|e| NsqliteError::Protocol(format!("failed to decode response: {e}")))?;

    let results = envelope
        .results
        .ok_or_else(|| NsqliteError::Protocol("response has no results field".into()))?;
    if results.is_empty() {
        return Err(NsqliteError::Protocol("empty response".into()));
    }

    results.into_iter().map(decode_result).collect()
}

fn decode_result(raw: RawResult) -> Result<QueryResponse, NsqliteError> {
    let tag = raw
        .kind
        .ok_or_else(|| NsqliteError::Protocol("result without type".into()))?;
    let kind = ResponseKind::from_tag(&tag)
        .ok_or_else(|| NsqliteError::Protocol(format!("unknown response type: {tag:?}")))?;
    let time = raw.time.unwrap_or_default();

    Ok(match kind {
        ResponseKind::Error => QueryResponse::Error {
            message: raw.error.unwrap_or_default(),
            time,
        },
        ResponseKind::Begin => QueryResponse::Begin {
            tx_id: raw
                .tx_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| NsqliteError::Protocol("begin response without txId".into()))?,
            time,
        },
        ResponseKind::Commit => QueryResponse::Commit { time },
        ResponseKind::Rollback => QueryResponse::Rollback { time },
        ResponseKind::Write => QueryResponse::Write {
            last_insert_id: raw.last_insert_id.unwrap_or_default(),
            rows_affected: raw.rows_affected.unwrap_or_default(),
            columns: raw.columns,
            rows: raw.values.map(decode_rows).transpose()?,
            time,
        },
        ResponseKind::Read => QueryResponse::Read {
            columns: raw.columns.unwrap_or_default(),
            types: raw.types.unwrap_or_default(),
            rows: raw.values.map(decode_rows).transpose()?.unwrap_or_default(),
            time,
        },
    })
}

fn decode_rows(values: Vec<Vec<Box<RawValue>>>) -> Result<Vec<Row>, NsqliteError> {
    values
        .iter()
        .map(|row| row.iter().map(|v| NsqliteValue::from_raw_json(v)).collect())
        .collect()
}

/// Decodes the response body of `GET /stats`.
pub fn decode_stats(body: &[u8]) -> Result<Stats, NsqliteError> {
    serde_json::from_slice(body)
        .map_err(|e| NsqliteError::Protocol(format!("failed to decode stats: {e}")))
}
