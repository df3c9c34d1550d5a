//! HTTP response.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode, header};
use serde::Serialize;

static CONTENT_TYPE_TEXT: header::HeaderValue =
    header::HeaderValue::from_static("text/plain; charset=utf-8");
static CONTENT_TYPE_HTML: header::HeaderValue =
    header::HeaderValue::from_static("text/html; charset=utf-8");
static CONTENT_TYPE_JSON: header::HeaderValue =
    header::HeaderValue::from_static("application/json");

/// HTTP response with a fixed body.
pub struct Res {
    status: StatusCode,
    headers: header::HeaderMap,
    body: Bytes,
}

impl Res {
    fn with_content_type(content_type: header::HeaderValue, body: Bytes) -> Self {
        let mut headers = header::HeaderMap::with_capacity(4);
        headers.insert(header::CONTENT_TYPE, content_type);
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// Text response.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type(CONTENT_TYPE_TEXT.clone(), Bytes::from(body.into()))
    }

    /// HTML response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type(CONTENT_TYPE_HTML.clone(), Bytes::from(body.into()))
    }

    /// JSON response (serializes to `Vec<u8>` directly).
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::with_content_type(CONTENT_TYPE_JSON.clone(), Bytes::from(bytes)),
            Err(e) => {
                let error_msg = format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e);
                Self::with_content_type(CONTENT_TYPE_JSON.clone(), Bytes::from(error_msg))
                    .with_status(500)
            }
        }
    }

    /// Replace the status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_ref().as_bytes()),
            header::HeaderValue::from_str(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Get status code.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Get headers.
    pub fn headers(&self) -> &header::HeaderMap {
        &self.headers
    }

    /// Body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, lossy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Unwrap to hyper response.
    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        let mut res = Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type_and_body() {
        let res = Res::json(&serde_json::json!({"a": 1}));
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(res.body_text(), r#"{"a":1}"#);
    }

    #[test]
    fn status_and_header_chain() {
        let res = Res::text("nope").with_status(405).header("Allow", "GET");
        assert_eq!(res.status_code().as_u16(), 405);
        assert_eq!(res.headers()["Allow"], "GET");
    }

    #[test]
    fn html_content_type() {
        let res = Res::html("<p>hi</p>");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    }
}
