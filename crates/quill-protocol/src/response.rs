//! Interpreting API responses.
//!
//! The API signals failure two ways: a non-2xx status, or a 2xx status with
//! `success: false` in the envelope. [`read_envelope`] folds both into
//! [`ApiOutcome::Rejected`] so callers only branch once.

use quill_transport::ApiResponse;
use serde::de::DeserializeOwned;

use crate::{Codec, Envelope, ProtocolError};

/// What a response means for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// The request succeeded and carried `data`.
    Data(T),
    /// The server refused; carries its message.
    Rejected { status: u16, message: String },
}

/// Extracts a human-readable failure reason from any response.
///
/// Looks at `message`, then `error`, in a leniently parsed body. Bodies
/// that are not JSON objects fall back to a status-based message.
pub fn failure_message<C: Codec>(codec: &C, response: &ApiResponse) -> String {
    let body = codec.decode_lenient(&response.body);
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", response.status))
}

/// Decodes `{ success, data }` from a response.
///
/// # Errors
/// [`ProtocolError`] only when a 2xx response claims success but its body
/// is malformed or lacks `data`. Server refusals are not errors here;
/// they come back as [`ApiOutcome::Rejected`].
pub fn read_envelope<T, C>(
    codec: &C,
    response: &ApiResponse,
) -> Result<ApiOutcome<T>, ProtocolError>
where
    T: DeserializeOwned,
    C: Codec,
{
    if !response.is_success() {
        return Ok(ApiOutcome::Rejected {
            status: response.status,
            message: failure_message(codec, response),
        });
    }

    let envelope: Envelope<T> = codec.decode(&response.body)?;
    if !envelope.success {
        let message = envelope
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", response.status));
        return Ok(ApiOutcome::Rejected {
            status: response.status,
            message,
        });
    }

    envelope.into_data().map(ApiOutcome::Data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthPayload, JsonCodec, UserPayload};

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(status, body.as_bytes().to_vec())
    }

    #[test]
    fn test_read_envelope_success_returns_data() {
        let res = response(
            200,
            r#"{"success":true,"data":{"user":{"id":1,"username":"ada"},"accessToken":"t","expiresIn":900}}"#,
        );

        let outcome: ApiOutcome<AuthPayload> = read_envelope(&JsonCodec, &res).unwrap();

        match outcome {
            ApiOutcome::Data(payload) => assert_eq!(payload.access_token, "t"),
            other => panic!("expected data, got {other:?}"),
        }
    }

    #[test]
    fn test_read_envelope_error_status_is_rejected_with_message() {
        let res = response(401, r#"{"success":false,"message":"Invalid credentials"}"#);

        let outcome: ApiOutcome<AuthPayload> = read_envelope(&JsonCodec, &res).unwrap();

        assert_eq!(
            outcome,
            ApiOutcome::Rejected {
                status: 401,
                message: "Invalid credentials".into()
            }
        );
    }

    #[test]
    fn test_read_envelope_error_status_with_garbage_body_is_rejected() {
        let res = response(502, "<html>Bad Gateway</html>");

        let outcome: ApiOutcome<UserPayload> = read_envelope(&JsonCodec, &res).unwrap();

        assert_eq!(
            outcome,
            ApiOutcome::Rejected {
                status: 502,
                message: "request failed with status 502".into()
            }
        );
    }

    #[test]
    fn test_read_envelope_success_false_on_200_is_rejected() {
        let res = response(200, r#"{"success":false,"error":"Email already in use"}"#);

        let outcome: ApiOutcome<AuthPayload> = read_envelope(&JsonCodec, &res).unwrap();

        assert!(matches!(
            outcome,
            ApiOutcome::Rejected { ref message, .. } if message == "Email already in use"
        ));
    }

    #[test]
    fn test_read_envelope_malformed_success_body_is_error() {
        let res = response(200, "not json");

        let result: Result<ApiOutcome<AuthPayload>, _> = read_envelope(&JsonCodec, &res);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_read_envelope_success_without_data_is_error() {
        let res = response(200, r#"{"success":true}"#);

        let result: Result<ApiOutcome<AuthPayload>, _> = read_envelope(&JsonCodec, &res);

        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_failure_message_prefers_message_over_error() {
        let res = response(400, r#"{"message":"first","error":"second"}"#);
        assert_eq!(failure_message(&JsonCodec, &res), "first");
    }
}
