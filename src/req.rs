//! HTTP request wrapper
//!
//! [`Req`] provides ergonomic access to request data including
//! the method, path, headers, and query string.

use hyper::{
    Method, Request, Uri,
    body::Incoming,
    header,
};

use crate::{Error, Result};

/// HTTP request
pub struct Req {
    inner: Request<Incoming>,
}

impl Req {
    /// Create from hyper request
    pub fn from_hyper(inner: Request<Incoming>) -> Self {
        Self { inner }
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Get the raw query string
    pub fn query(&self) -> Option<&str> {
        self.inner.uri().query()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all headers
    pub fn headers(&self) -> &header::HeaderMap {
        self.inner.headers()
    }

    /// Ordered name/value pairs from the query string
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        parse_query(self.query().unwrap_or(""))
    }

    /// First value for a named query parameter
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .ok()?
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Decode a URL-encoded query string into ordered pairs, repeats kept.
pub fn parse_query(raw: &str) -> Result<Vec<(String, String)>> {
    serde_urlencoded::from_str(raw).map_err(|e| Error::bad_request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ordered_pairs() {
        let pairs = parse_query("query=the+matrix&page=2").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "the matrix".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_repeated_names() {
        let pairs = parse_query("tag=a&tag=b").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1, "a");
        assert_eq!(pairs[1].1, "b");
    }

    #[test]
    fn empty_query_is_empty() {
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn percent_decoding() {
        let pairs = parse_query("url=https%3A%2F%2Fexample.com%2F%3Fx%3D1").unwrap();
        assert_eq!(pairs[0].1, "https://example.com/?x=1");
    }
}
