//! # Quill
//!
//! Client-side auth session library for the Quill blog API.
//!
//! Quill keeps a user signed in against the API: it exchanges credentials
//! for a short-lived access token, refreshes that token through an
//! HTTP-only cookie before it expires, and retries a request once when the
//! server answers 401.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill::prelude::*;
//!
//! # async fn run() -> Result<(), QuillError> {
//! quill::init_tracing();
//! let client = QuillClient::from_env()?;
//! let session = client.session();
//!
//! if !session.bootstrap().await {
//!     session.login("ada", "hunter2").await?;
//! }
//! let response = session.authenticated_fetch(ApiRequest::get("/posts/mine")).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod telemetry;

pub use client::{QuillClient, QuillClientBuilder, Session};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::QuillError;
pub use telemetry::init_tracing;

pub use quill_protocol as protocol;
pub use quill_session as session;
pub use quill_transport as transport;

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::{ClientConfig, QuillClient, QuillError, init_tracing};
    pub use quill_protocol::{Identifier, ProfileUpdate, RegisterRequest, Role, User, UserId};
    pub use quill_session::{
        Access, GuardDecision, SessionConfig, SessionError, SessionEvent, SessionManager,
        SessionSnapshot, SignOutReason,
    };
    pub use quill_transport::{ApiRequest, ApiResponse, HttpTransport, Method};
}
