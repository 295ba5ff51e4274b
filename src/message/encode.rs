//! Encode query batches to JSON request bodies.

use bytes::Bytes;

use super::Query;
use crate::error::NsqliteError;

/// Encodes a batch of queries as the JSON array expected by `POST /query`.
pub fn encode_batch(queries: &[Query]) -> Result<Bytes, NsqliteError> {
    serde_json::to_vec(queries)
        .map(Bytes::from)
        .map_err(|e| NsqliteError::Protocol(format!("failed to marshal request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::QueryParam;
    use crate::types::NsqliteValue;

    fn encode_str(queries: &[Query]) -> String {
        String::from_utf8(encode_batch(queries).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn encode_plain_query() {
        assert_eq!(
            encode_str(&[Query::new("SELECT 1")]),
            r#"[{"query":"SELECT 1"}]"#
        );
    }

    #[test]
    fn encode_params_and_tx() {
        let q = Query::new("INSERT INTO t VALUES (?, :b)")
            .params(vec![
                QueryParam::positional(1),
                QueryParam::named("b", NsqliteValue::Null),
            ])
            .tx_id(Some("tx-9"));
        assert_eq!(
            encode_str(&[q]),
            r#"[{"query":"INSERT INTO t VALUES (?, :b)","params":[{"value":1},{"name":"b","value":null}],"txId":"tx-9"}]"#
        );
    }

    #[test]
    fn empty_tx_id_is_omitted() {
        let q = Query::new("SELECT 1").tx_id(Some(""));
        assert_eq!(q.tx_id, None);
        assert_eq!(encode_str(&[q]), r#"[{"query":"SELECT 1"}]"#);
    }

    #[test]
    fn encode_batch_keeps_order() {
        let body = encode_str(&[Query::begin(), Query::commit("a"), Query::rollback("b")]);
        assert_eq!(
            body,
            r#"[{"query":"BEGIN;"},{"query":"COMMIT;","txId":"a"},{"query":"ROLLBACK;","txId":"b"}]"#
        );
    }
}
