/// Errors that can occur in the transport layer.
///
/// All of these mean "no HTTP response was received". A response with an
/// error status is not a transport error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The base URL or request path does not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Building or sending the request failed for another reason.
    #[error("request failed: {0}")]
    Request(String),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}
