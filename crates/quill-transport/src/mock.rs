//! Scripted in-memory transport for tests.
//!
//! Replies are queued per `(method, path)` and handed out in order. Every
//! request is recorded so tests can assert how many round-trips happened
//! and which headers were sent.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.push_json(Method::Post, "/auth/refresh", 200, r#"{"success":true}"#);
//!
//! let res = transport.send(&ApiRequest::post("/auth/refresh")).await?;
//! assert_eq!(transport.calls(Method::Post, "/auth/refresh"), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};

/// One scripted outcome for a request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(ApiResponse),
    Fail(TransportError),
}

#[derive(Default)]
struct MockState {
    replies: HashMap<(Method, String), VecDeque<MockReply>>,
    requests: Vec<ApiRequest>,
}

/// Cloning shares the script and the request log, so a test can keep a
/// handle while the session manager owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a reply for the next unanswered `method path` request.
    pub fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.lock()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queues a response with the given status and raw body.
    pub fn push_json(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            MockReply::Respond(ApiResponse::new(status, body.as_bytes().to_vec())),
        );
    }

    /// Queues a transport failure (no response received).
    pub fn push_failure(&self, method: Method, path: &str, error: TransportError) {
        self.push(method, path, MockReply::Fail(error));
    }

    /// Returns every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Returns the requests sent to `method path`, oldest first.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// Number of requests sent to `method path`.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// Total number of requests sent.
    pub fn total_calls(&self) -> usize {
        self.lock().requests.len()
    }
}

impl HttpTransport for MockTransport {
    async fn send(
        &self,
        request: &ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state
                .replies
                .get_mut(&(request.method, request.path.clone()))
                .and_then(VecDeque::pop_front)
        };

        // Let other tasks run, as a real round-trip would.
        tokio::task::yield_now().await;

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            None => Err(TransportError::Connect(format!(
                "no scripted reply for {} {}",
                request.method, request.path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_returns_replies_in_order() {
        let t = MockTransport::new();
        t.push_json(Method::Get, "/posts", 401, "");
        t.push_json(Method::Get, "/posts", 200, "[]");

        let first = t.send(&ApiRequest::get("/posts")).await.unwrap();
        let second = t.send(&ApiRequest::get("/posts")).await.unwrap();

        assert_eq!(first.status, 401);
        assert_eq!(second.status, 200);
        assert_eq!(t.calls(Method::Get, "/posts"), 2);
    }

    #[tokio::test]
    async fn test_send_unscripted_request_fails_and_is_recorded() {
        let t = MockTransport::new();

        let result = t.send(&ApiRequest::post("/auth/refresh")).await;

        assert!(matches!(result, Err(TransportError::Connect(_))));
        assert_eq!(t.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_push_failure_surfaces_transport_error() {
        let t = MockTransport::new();
        t.push_failure(Method::Post, "/auth/logout", TransportError::Timeout);

        let result = t.send(&ApiRequest::post("/auth/logout")).await;

        assert_eq!(result, Err(TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_clones_share_request_log() {
        let t = MockTransport::new();
        let handle = t.clone();
        t.push_json(Method::Get, "/auth/profile", 200, "{}");

        t.send(&ApiRequest::get("/auth/profile").header("Authorization", "Bearer abc"))
            .await
            .unwrap();

        let seen = handle.requests_to(Method::Get, "/auth/profile");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].header_value("authorization"), Some("Bearer abc"));
    }
}
