//! NSQLite HTTP/JSON protocol messages.

pub mod decode;
pub mod encode;
pub mod request;
pub mod response;

pub use request::{Query, QueryParam};
pub use response::{QueryResponse, ResponseKind, Stats, StatsCounters, StatsMinute};

/// Endpoint paths.
pub mod path {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
    pub const QUERY: &str = "/query";
    pub const STATS: &str = "/stats";
}

/// Header names and values used by the protocol.
pub mod header {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const SERVER_ID: &str = "X-Server";

    pub const JSON: &str = "application/json";
    pub const SERVER_NAME: &str = "nsqlite";
}
