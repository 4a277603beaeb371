//! Dev Proxy
//!
//! During local development the client shell and the backend run on
//! different origins. Requests whose path starts with one of a fixed set
//! of literal prefixes are re-sent to the backend origin with the path
//! and query unchanged; everything else passes through.
//!
//! In production the map is empty and nothing is rewritten.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use reqwest::{Client, Url};
use thiserror::Error;

/// API prefixes forwarded to the backend during development
pub const DEV_PREFIXES: [&str; 5] = [
    "/upload-items",
    "/check-weights",
    "/calculate-fixed",
    "/items",
    "/edit-csv",
];

/// Default backend origin for development
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8080";

/// Headers that describe a single connection and must not be forwarded
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

/// Proxy errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid proxy prefix {0:?}: must start with '/'")]
    InvalidPrefix(String),

    #[error("Duplicate proxy prefix: {0}")]
    DuplicatePrefix(String),

    #[error("Invalid backend origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Backend request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A literal path prefix and the origin it is forwarded to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntry {
    prefix: String,
    origin: Url,
}

impl ProxyEntry {
    pub fn new(prefix: &str, origin: &str) -> Result<Self, ProxyError> {
        if !prefix.starts_with('/') {
            return Err(ProxyError::InvalidPrefix(prefix.to_string()));
        }

        let invalid = |reason: &str| ProxyError::InvalidOrigin {
            origin: origin.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(origin).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("origin must not carry a path, query or fragment"));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            origin: url,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Origin without the trailing slash, e.g. `http://localhost:8080`
    pub fn origin_str(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }
}

/// Ordered, immutable prefix → origin map
#[derive(Debug, Clone, Default)]
pub struct ProxyMap {
    entries: Vec<ProxyEntry>,
}

impl ProxyMap {
    pub fn new(entries: Vec<ProxyEntry>) -> Result<Self, ProxyError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.prefix == entry.prefix) {
                return Err(ProxyError::DuplicatePrefix(entry.prefix.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The development map: every API prefix forwarded to `origin`
    pub fn development(origin: &str) -> Result<Self, ProxyError> {
        Self::with_prefixes(&DEV_PREFIXES, origin)
    }

    /// Forward each of `prefixes` to `origin`
    pub fn with_prefixes<S: AsRef<str>>(prefixes: &[S], origin: &str) -> Result<Self, ProxyError> {
        let entries = prefixes
            .iter()
            .map(|p| ProxyEntry::new(p.as_ref(), origin))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// An empty map; nothing is proxied
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ProxyEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose prefix the path literally starts with
    pub fn match_path(&self, path: &str) -> Option<&ProxyEntry> {
        self.entries.iter().find(|e| path.starts_with(&e.prefix))
    }

    /// Destination URL for a request, or `None` to pass it through.
    /// The path and query are kept verbatim.
    pub fn rewrite(&self, path_and_query: &str) -> Option<Url> {
        let entry = self.match_path(path_and_query)?;
        Url::parse(&format!("{}{}", entry.origin_str(), path_and_query)).ok()
    }
}

/// Sends rewritten requests to the backend
#[derive(Clone)]
pub struct ProxyForwarder {
    client: Client,
    max_body_bytes: usize,
}

impl ProxyForwarder {
    /// Build a forwarder. Without `timeout` requests wait as long as
    /// the backend takes.
    pub fn new(timeout: Option<Duration>, max_body_bytes: usize) -> Result<Self, ProxyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProxyError::Client)?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// Forward `req` to `target`, returning the backend's response as is
    pub async fn forward(&self, target: Url, req: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = req.into_parts();
        let body = read_limited(body, self.max_body_bytes).await?;

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .map_err(|e| ProxyError::Body(e.to_string()))?;

        let mut upstream = self.client.request(method, target.clone());
        for (name, value) in parts.headers.iter() {
            if HOP_BY_HOP.contains(&name.as_str()) {
                continue;
            }
            upstream = upstream.header(name.as_str(), value.as_bytes());
        }

        tracing::debug!(method = %parts.method, url = %target, "Proxying request");

        let response = upstream
            .body(body)
            .send()
            .await
            .map_err(|source| ProxyError::Upstream {
                url: target.to_string(),
                source,
            })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let mut builder = Response::builder().status(status);
        for (name, value) in response.headers() {
            let name = name.as_str();
            if HOP_BY_HOP.contains(&name) || name == "content-length" {
                continue;
            }
            builder = builder.header(name, value.as_bytes());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ProxyError::Upstream {
                url: target.to_string(),
                source,
            })?;

        tracing::debug!(status = status.as_u16(), bytes = bytes.len(), url = %target, "Backend responded");

        builder
            .body(Body::from(bytes))
            .map_err(|e| ProxyError::Body(e.to_string()))
    }
}

/// Buffer a request body, failing once it grows past `limit`
async fn read_limited(body: Body, limit: usize) -> Result<Vec<u8>, ProxyError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ProxyError::Body(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(ProxyError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_map() -> ProxyMap {
        ProxyMap::development(DEFAULT_BACKEND_ORIGIN).unwrap()
    }

    #[test]
    fn test_every_prefix_rewritten_to_backend() {
        let map = dev_map();

        for prefix in DEV_PREFIXES {
            let url = map.rewrite(prefix).unwrap();
            assert_eq!(url.as_str(), format!("http://localhost:8080{}", prefix));
        }
    }

    #[test]
    fn test_suffix_and_query_unchanged() {
        let map = dev_map();

        let url = map.rewrite("/items/42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/items/42");

        let url = map.rewrite("/items?page=2&sort=box_no").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/items?page=2&sort=box_no");

        let url = map.rewrite("/edit-csv").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/edit-csv");
    }

    #[test]
    fn test_unmatched_paths_pass_through() {
        let map = dev_map();

        assert!(map.rewrite("/").is_none());
        assert!(map.rewrite("/csv").is_none());
        assert!(map.rewrite("/item-list").is_none());
        assert!(map.rewrite("/calculate").is_none());
        assert!(map.rewrite("/assets/app.js").is_none());
    }

    #[test]
    fn test_prefix_is_literal() {
        let map = dev_map();

        // literal prefix match, not segment match
        assert_eq!(map.match_path("/itemsets").unwrap().prefix(), "/items");
        // `/calculate-fixed` is proxied, `/calculate` is a page
        assert!(map.match_path("/calculate-fixed").is_some());
        assert!(map.match_path("/calculate").is_none());
    }

    #[test]
    fn test_first_declared_prefix_wins() {
        let map = ProxyMap::new(vec![
            ProxyEntry::new("/items", "http://a.test").unwrap(),
            ProxyEntry::new("/items/special", "http://b.test").unwrap(),
        ])
        .unwrap();

        let url = map.rewrite("/items/special/1").unwrap();
        assert_eq!(url.host_str(), Some("a.test"));
    }

    #[test]
    fn test_disabled_map_rewrites_nothing() {
        let map = ProxyMap::disabled();
        assert!(map.is_empty());
        assert!(map.rewrite("/items/1").is_none());
    }

    #[test]
    fn test_invalid_entries() {
        assert!(matches!(
            ProxyEntry::new("items", DEFAULT_BACKEND_ORIGIN),
            Err(ProxyError::InvalidPrefix(_))
        ));
        assert!(matches!(
            ProxyEntry::new("/items", "ftp://host"),
            Err(ProxyError::InvalidOrigin { .. })
        ));
        assert!(matches!(
            ProxyEntry::new("/items", "http://host/api"),
            Err(ProxyError::InvalidOrigin { .. })
        ));
        assert!(matches!(
            ProxyEntry::new("/items", "not a url"),
            Err(ProxyError::InvalidOrigin { .. })
        ));
        assert!(matches!(
            ProxyMap::with_prefixes(&["/a", "/a"], DEFAULT_BACKEND_ORIGIN),
            Err(ProxyError::DuplicatePrefix(_))
        ));
    }

    #[tokio::test]
    async fn test_forward_unreachable_backend() {
        // Nothing listens on port 9 (discard) in the test environment
        let forwarder = ProxyForwarder::new(Some(Duration::from_secs(5)), 1024).unwrap();
        let target = Url::parse("http://127.0.0.1:9/items").unwrap();
        let req = Request::builder().uri("/items").body(Body::empty()).unwrap();

        let err = forwarder.forward(target, req).await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_forward_rejects_oversized_body() {
        // the body is refused before any connection is attempted
        let forwarder = ProxyForwarder::new(None, 8).unwrap();
        let target = Url::parse("http://127.0.0.1:9/edit-csv").unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/edit-csv")
            .body(Body::from("0123456789"))
            .unwrap();

        let err = forwarder.forward(target, req).await.unwrap_err();
        assert!(matches!(err, ProxyError::TooLarge { limit: 8 }));
    }

    #[tokio::test]
    async fn test_read_limited_accepts_body_at_limit() {
        let bytes = read_limited(Body::from("01234567"), 8).await.unwrap();
        assert_eq!(bytes, b"01234567");
    }
}
