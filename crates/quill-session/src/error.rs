//! Error types for the session layer.

use quill_protocol::ProtocolError;
use quill_transport::TransportError;

/// Errors returned by session operations.
///
/// None of these leave the session half-populated: an operation either
/// installs a complete session, clears it completely, or leaves it alone.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server refused the request (bad credentials, duplicate email,
    /// invalid profile field). Carries the server's message verbatim so a
    /// form can show it.
    #[error("{0}")]
    Rejected(String),

    /// No response was received. Callers see a generic message; the
    /// transport detail is kept as the error source for logs.
    #[error("Network error")]
    Network(#[from] TransportError),

    /// There is no usable access token and a refresh could not produce
    /// one. The user has to sign in again.
    #[error("authentication required")]
    AuthenticationRequired,

    /// A body could not be encoded, or a successful response could not be
    /// decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
