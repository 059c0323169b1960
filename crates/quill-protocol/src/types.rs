//! Wire types for the blog's auth API.
//!
//! Every type here travels as JSON between this client and the API. The
//! API speaks camelCase (`accessToken`, `expiresIn`), so most types carry
//! `#[serde(rename_all = "camelCase")]`.
//!
//! The server owns the user record. We decode the fields the session layer
//! needs (id, username, role) and keep everything else untouched in
//! `User::extra`, so a newer server can add fields without breaking us.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A user's identifier as the server sends it.
///
/// Some backends use numeric ids, others string ids (UUIDs, Mongo object
/// ids). `#[serde(untagged)]` accepts either form and serializes it back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// The role string the server assigns (`"user"`, `"admin"`, ...).
///
/// Kept as an open string newtype rather than a closed enum: the role set
/// is server policy and may grow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    pub const ADMIN: &'static str = "admin";

    pub fn is_admin(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self("user".to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Snapshot of the signed-in user's profile.
///
/// The session layer never edits this; it is replaced wholesale whenever
/// the server sends a new one (login, refresh, profile read/write).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Every other field the server sent, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The `{ success, data, message }` wrapper every API response uses.
///
/// All fields default so that partial bodies (e.g. `{ "success": true }`
/// from logout, or an error body with only `message`) still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,

    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The server's human-readable failure reason, `message` first.
    pub fn error_message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }

    /// Unwraps `data` from a successful envelope.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] when `success` is false or `data`
    /// is missing.
    pub fn into_data(self) -> Result<T, ProtocolError> {
        if !self.success {
            let reason = self
                .error_message()
                .unwrap_or("request was not successful")
                .to_string();
            return Err(ProtocolError::InvalidMessage(reason));
        }
        self.data
            .ok_or_else(|| ProtocolError::InvalidMessage("missing data".into()))
    }
}

/// `data` of a login, register or refresh response.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
    /// Token lifetime in seconds, as declared by the server.
    pub expires_in: u64,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// `data` of a profile read or update response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// How the user identifies themselves at sign-in.
///
/// Serialized as a single key, `{"email": ...}` or `{"username": ...}`,
/// which [`LoginRequest`] flattens next to the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identifier {
    Email(String),
    Username(String),
}

impl Identifier {
    /// Anything containing `@` is treated as an email address.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains('@') {
            Identifier::Email(raw.to_string())
        } else {
            Identifier::Username(raw.to_string())
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    #[serde(flatten)]
    pub identifier: Identifier,
    pub password: String,
}

impl LoginRequest {
    pub fn new(identifier: &str, password: impl Into<String>) -> Self {
        Self {
            identifier: Identifier::parse(identifier),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Body of a profile update. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
