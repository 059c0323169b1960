//! HTTP transport abstraction layer for Quill.
//!
//! Provides the [`HttpTransport`] trait that the session layer talks to,
//! plus the request/response values that cross it. The transport also owns
//! the long-lived credential channel: the refresh cookie the auth API sets
//! lives inside the transport (a cookie jar, a keychain, ...) and is never
//! visible to the code above.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestTransport`], backed by `reqwest` with a
//!   cookie store
//! - `mock`: [`MockTransport`], an in-memory scripted transport for tests

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "reqwest")]
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::ReqwestTransport;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockTransport};

use std::fmt;
use std::future::Future;

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the canonical upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request about to be sent to the API.
///
/// `path` is either relative to the transport's base URL (`/auth/login`)
/// or an absolute `http(s)://` URL, which transports use verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Builder form of [`set_header`](Self::set_header).
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a JSON body and the matching `Content-Type`.
    pub fn json_body(mut self, body: Vec<u8>) -> Self {
        self.set_header("Content-Type", "application/json");
        self.body = Some(body);
        self
    }

    /// Sets a header, replacing any existing header with the same name.
    ///
    /// Header names compare case-insensitively, as in HTTP.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Returns the value of the named header, if present.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as received from the API. The body is kept as raw bytes;
/// decoding is the protocol layer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for 401, the server's authoritative "token no longer valid".
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns the value of the named header, if present.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to the API and carries the long-lived credential.
///
/// Every request goes out with the credential channel included (for the
/// reqwest transport: the cookie jar), so the server can read and rotate
/// the refresh credential on its own.
///
/// The returned future must be `Send` so a shared session manager can be
/// driven from any Tokio task.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends the request and waits for the full response.
    ///
    /// Any HTTP status is `Ok`; `Err` means no response was received.
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display_is_upper_case() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut req = ApiRequest::get("/posts").header("authorization", "Bearer old");

        req.set_header("Authorization", "Bearer new");

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let req = ApiRequest::post("/auth/login").json_body(b"{}".to_vec());

        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(ApiResponse::new(204, Vec::new()).is_success());
        assert!(!ApiResponse::new(301, Vec::new()).is_success());
        assert!(ApiResponse::new(401, Vec::new()).is_unauthorized());
        assert!(!ApiResponse::new(403, Vec::new()).is_unauthorized());
    }
}
