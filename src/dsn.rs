//! NSQLite connection strings.
//!
//! A connection string has the shape `protocol://host[:port][?authToken=token]`:
//!
//! - the protocol must be `http` or `https`,
//! - the host is an IP address or domain name,
//! - the port defaults to 9876,
//! - the optional `authToken` is sent to the server on every request.

use std::fmt;

use crate::error::ParseError;

/// Port used when the connection string does not name one.
pub const DEFAULT_PORT: &str = "9876";
/// Protocol used by [`ConnStr::default`].
pub const DEFAULT_PROTOCOL: &str = "http";
/// Host used by [`ConnStr::default`].
pub const DEFAULT_HOST: &str = "localhost";

/// A parsed and normalized NSQLite connection string.
///
/// Defaults are filled in once, when the value is built, so every accessor
/// observes the same protocol, host and port for the lifetime of the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnStr {
    protocol: String,
    host: String,
    port: String,
    auth_token: String,
}

impl ConnStr {
    /// Builds a connection string from its parts, filling empty parts with
    /// the defaults (`http`, `localhost`, `9876`).
    pub fn from_parts(
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        let mut conn_str = Self {
            protocol: protocol.into(),
            host: host.into(),
            port: port.into(),
            auth_token: auth_token.into(),
        };
        conn_str.fill_defaults();
        conn_str
    }

    /// Parses a connection string such as
    /// `https://db.example.com:8080?authToken=secret`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (scheme, rest) = text
            .split_once("://")
            .ok_or_else(|| ParseError::MalformedInput(format!("missing \"://\" in {text:?}")))?;

        if scheme.is_empty() {
            return Err(ParseError::MalformedInput("missing protocol scheme".into()));
        }
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(ParseError::MalformedInput(format!(
                "invalid character in scheme {scheme:?}"
            )));
        }
        let protocol = scheme.to_ascii_lowercase();
        if protocol != "http" && protocol != "https" {
            return Err(ParseError::InvalidProtocol(protocol));
        }

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (before_query, query) = match rest.split_once('?') {
            Some((before, query)) => (before, Some(query)),
            None => (rest, None),
        };
        let authority = before_query
            .split_once('/')
            .map_or(before_query, |(authority, _)| authority);
        // Credentials in the authority are not used by NSQLite.
        let host_port = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host_port)| host_port);

        let (host, port) = split_host_port(host_port)?;
        if host.is_empty() {
            return Err(ParseError::MissingHost);
        }

        let auth_token = query.and_then(|q| query_value(q, "authToken")).unwrap_or_default();

        Ok(Self::from_parts(protocol, host, port, auth_token))
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// The auth token, empty when none is configured.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn has_auth_token(&self) -> bool {
        !self.auth_token.is_empty()
    }

    /// Returns `protocol://host:port`, never including the auth token.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') {
            format!("{}://[{}]:{}", self.protocol, self.host, self.port)
        } else {
            format!("{}://{}:{}", self.protocol, self.host, self.port)
        }
    }

    /// Joins `path` onto the base URL.
    ///
    /// Anything after the first `?` in `path` is kept verbatim as the query
    /// string. A leading `/` on the path is not doubled.
    pub fn create_url(&self, path: &str) -> String {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path, ""),
        };

        let mut url = self.base_url();
        if !path.is_empty() {
            url.push('/');
            url.push_str(path.trim_start_matches('/'));
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn fill_defaults(&mut self) {
        if self.protocol.is_empty() {
            self.protocol = DEFAULT_PROTOCOL.to_string();
        }
        if self.host.is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port.is_empty() {
            self.port = DEFAULT_PORT.to_string();
        }
    }
}

impl Default for ConnStr {
    fn default() -> Self {
        Self::from_parts("", "", "", "")
    }
}

impl std::str::FromStr for ConnStr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Redacted form: the token is replaced with `****`.
impl fmt::Display for ConnStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())?;
        if self.has_auth_token() {
            f.write_str("?authToken=****")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConnStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnStr")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_token", &if self.has_auth_token() { "****" } else { "" })
            .finish()
    }
}

fn split_host_port(host_port: &str) -> Result<(String, String), ParseError> {
    let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| ParseError::MalformedInput("missing ']' in host".into()))?;
        let port = match after {
            "" => "",
            _ => after.strip_prefix(':').ok_or_else(|| {
                ParseError::MalformedInput(format!("invalid port {after:?} after host"))
            })?,
        };
        (host, port)
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => (host_port, ""),
        }
    };

    if !port.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::MalformedInput(format!("invalid port {port:?}")));
    }
    if host.contains(|c: char| c.is_whitespace() || matches!(c, '[' | ']')) {
        return Err(ParseError::MalformedInput(format!("invalid host {host:?}")));
    }
    Ok((host.to_string(), port.to_string()))
}

/// Returns the decoded value of the first `key` pair in a query string.
fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((k, v)) => Some((k, v)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(k, _)| percent_decode(k) == key)
        .map(|(_, v)| percent_decode(v))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
