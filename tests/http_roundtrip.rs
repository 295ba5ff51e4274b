//! End-to-end tests: the hyper transport against an in-process HTTP server
//! that speaks the NSQLite wire protocol.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde_json::{Value, json};

use nsqlite::driver::ConnectionManager;
use nsqlite::{Connector, NsqliteClient, NsqliteError, NsqliteValue, Query, QueryParam};

const TOKEN: &str = "secret";

/// Answers each query in a batch by looking at its text.
fn answer(query: &Value, tx_counter: &AtomicUsize) -> Value {
    let sql = query["query"].as_str().unwrap_or_default();
    let tx_id = query.get("txId").cloned().unwrap_or(Value::Null);
    match sql.split_whitespace().next().unwrap_or_default() {
        "BEGIN;" => {
            let n = tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
            json!({"type": "begin", "time": 0.001, "txId": format!("tx-{n}")})
        }
        "COMMIT;" => json!({"type": "commit", "time": 0.001}),
        "ROLLBACK;" => json!({"type": "rollback", "time": 0.001}),
        "SELECT" => json!({
            "type": "read",
            "time": 0.002,
            "columns": ["tx", "big"],
            "types": ["text", "integer"],
            "values": [[tx_id, 9007199254740993i64]],
        }),
        "INSERT" => json!({"type": "write", "time": 0.003, "lastInsertId": 5, "rowsAffected": 1}),
        _ => json!({"type": "error", "time": 0.0, "error": format!("near \"{sql}\": syntax error")}),
    }
}

async fn handle(
    request: Request<Body>,
    tx_counter: Arc<AtomicUsize>,
) -> Result<Response<Body>, Infallible> {
    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(TOKEN);

    let response = match (request.method(), request.uri().path()) {
        (&Method::GET, "/health") => Response::builder()
            .header("X-Server", "NSQLite")
            .body(Body::from("OK")),
        (_, _) if !authorized => Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Body::empty()),
        (&Method::GET, "/version") => Response::builder().body(Body::from("v0.9.0")),
        (&Method::POST, "/query") => {
            let body = hyper::body::to_bytes(request.into_body()).await.unwrap_or_default();
            let queries: Vec<Value> = serde_json::from_slice(&body).unwrap_or_default();
            let results: Vec<Value> = queries.iter().map(|q| answer(q, &tx_counter)).collect();
            Response::builder()
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "results": results }).to_string()))
        }
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty()),
    };
    Ok(response.unwrap())
}

async fn spawn_server() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let tx_counter = Arc::new(AtomicUsize::new(0));
    let make_service = make_service_fn(move |_conn| {
        let tx_counter = tx_counter.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(req, tx_counter.clone())))
        }
    });
    let server = Server::from_tcp(listener).unwrap().serve(make_service);
    tokio::spawn(server);
    addr
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn health_version_and_auth() {
    init_tracing();
    let addr = spawn_server().await;

    let authed = NsqliteClient::new(&format!("http://{addr}?authToken={TOKEN}")).unwrap();
    authed.ping().await.unwrap();
    assert_eq!(authed.version().await.unwrap(), "v0.9.0");

    let anonymous = NsqliteClient::new(&format!("http://{addr}")).unwrap();
    anonymous.ping().await.unwrap();
    assert!(matches!(
        anonymous.version().await.unwrap_err(),
        NsqliteError::Authentication(_)
    ));
    assert!(matches!(
        anonymous.send_query(Query::new("SELECT 1")).await.unwrap_err(),
        NsqliteError::Authentication(_)
    ));
}

#[tokio::test]
async fn batch_round_trip_keeps_order() {
    init_tracing();
    let addr = spawn_server().await;
    let client = NsqliteClient::new(&format!("http://{addr}?authToken={TOKEN}")).unwrap();

    let results = client
        .send_queries(&[
            Query::new("INSERT INTO t VALUES (?)").params(vec![QueryParam::positional(1)]),
            Query::new("SELECT * FROM t"),
            Query::new("DROP"),
        ])
        .await
        .unwrap();
    let kinds: Vec<_> = results.iter().map(|r| r.kind().as_str()).collect();
    assert_eq!(kinds, ["write", "read", "error"]);
}

#[tokio::test]
async fn transaction_through_driver() {
    init_tracing();
    let addr = spawn_server().await;
    let connector = Connector::from_conn_str(&format!("http://{addr}?authToken={TOKEN}")).unwrap();
    let mut conn = ConnectionManager::connect(&connector).await.unwrap();

    let mut tx = conn.begin().await.unwrap();
    let result = tx
        .execute("INSERT INTO t VALUES (?)", vec![QueryParam::positional("a")])
        .await
        .unwrap();
    assert_eq!(result.last_insert_id(), 5);
    assert_eq!(result.rows_affected(), 1);

    let mut rows = tx.prepare("SELECT * FROM t").query(vec![]).await.unwrap();
    assert_eq!(rows.columns(), ["tx", "big"]);
    assert_eq!(rows.column_type_database_type_name(1), "INTEGER");
    assert_eq!(
        rows.next_row(),
        Some(vec![
            NsqliteValue::Text("tx-1".into()),
            NsqliteValue::Integer(9_007_199_254_740_993),
        ])
    );
    assert_eq!(rows.next_row(), None);
    tx.commit().await.unwrap();
    assert_eq!(conn.tx_id(), None);

    // Outside the transaction no id is attached.
    let mut rows = conn.query("SELECT * FROM t", vec![]).await.unwrap();
    assert_eq!(rows.next_row().unwrap()[0], NsqliteValue::Null);

    assert!(connector.is_valid(&mut conn).await);
    connector.recycle(&mut conn).await.unwrap();
    conn.close().await;
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    init_tracing();
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let connector = Connector::from_conn_str(&format!("http://{addr}")).unwrap();
    let mut conn = connector.connect();

    let err = conn.execute("INSERT INTO t VALUES (1)", vec![]).await.unwrap_err();
    assert!(err.is_transport(), "{err}");
    assert!(!conn.is_valid().await);
}
