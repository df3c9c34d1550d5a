//! Error types.

use std::fmt;

use crate::Res;

/// Result type with crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Service error.
#[derive(Debug)]
pub enum Error {
    /// HTTP status with optional message.
    Status(u16, Option<String>),
    /// JSON error.
    Json(String),
    /// Upstream fetch error.
    Upstream(reqwest::Error),
    /// IO error.
    Io(std::io::Error),
    /// Custom error.
    Custom(String),
}

impl Error {
    /// Create 400 Bad Request.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Status(400, Some(msg.into()))
    }

    /// Create 404 Not Found.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::Status(404, Some(msg.into()))
    }

    /// Create 405 Method Not Allowed.
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::Status(405, Some(msg.into()))
    }

    /// Create 500 Internal Server Error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Status(500, Some(msg.into()))
    }

    /// HTTP status this error renders with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Status(code, _) => *code,
            Error::Json(_) => 400,
            Error::Upstream(_) | Error::Io(_) | Error::Custom(_) => 500,
        }
    }

    /// Render as the service's JSON error body, `{"error": <message>}`.
    pub fn into_res(self) -> Res {
        let status = self.status_code();
        let message = match &self {
            Error::Status(_, Some(msg)) => msg.clone(),
            Error::Status(code, None) => status_text(*code),
            other => other.to_string(),
        };
        Res::json(&serde_json::json!({ "error": message })).with_status(status)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Status(code, Some(msg)) => write!(f, "HTTP {}: {}", code, msg),
            Error::Status(code, None) => write!(f, "HTTP {}", code),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Upstream(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Custom(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Custom(msg.to_string())
    }
}

fn status_text(code: u16) -> String {
    match code {
        400 => "Bad Request".to_string(),
        404 => "Not Found".to_string(),
        405 => "Method Not Allowed".to_string(),
        500 => "Internal Server Error".to_string(),
        _ => format!("HTTP {}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Error::bad_request("nope").status_code(), 400);
        assert_eq!(Error::not_found("gone").status_code(), 404);
        assert_eq!(Error::Custom("boom".into()).status_code(), 500);
        assert_eq!(Error::Json("bad".into()).status_code(), 400);
    }

    #[test]
    fn renders_json_body() {
        let res = Error::bad_request("Query parameter is required").into_res();
        assert_eq!(res.status_code().as_u16(), 400);
        assert_eq!(
            res.body_text(),
            r#"{"error":"Query parameter is required"}"#
        );
    }

    #[test]
    fn display_keeps_custom_message_bare() {
        let err = Error::Custom("Failed to fetch".into());
        assert_eq!(err.to_string(), "Failed to fetch");
    }
}
