//! Unified error type for the Quill client.

use quill_protocol::ProtocolError;
use quill_session::SessionError;
use quill_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quill` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    /// A transport-level error (bad base URL, connection, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (rejected credentials, no usable token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::InvalidUrl("not a url".into());
        let quill_err: QuillError = err.into();
        assert!(matches!(quill_err, QuillError::Transport(_)));
        assert!(quill_err.to_string().contains("not a url"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let quill_err: QuillError = err.into();
        assert!(matches!(quill_err, QuillError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error_keeps_server_message() {
        let err = SessionError::Rejected("Invalid credentials".into());
        let quill_err: QuillError = err.into();
        assert!(matches!(quill_err, QuillError::Session(_)));
        assert_eq!(quill_err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_config_error_display() {
        let err = QuillError::Config("QUILL_REQUEST_TIMEOUT_SECS: not a number".into());
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
