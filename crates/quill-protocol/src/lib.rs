//! Wire protocol for Quill.
//!
//! This crate defines what the client and the blog's auth API say to each
//! other:
//!
//! - **Types** ([`Envelope`], [`AuthPayload`], [`User`], request bodies):
//!   the JSON structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures are
//!   converted to/from bytes.
//! - **Responses** ([`read_envelope`], [`failure_message`]): turning a raw
//!   [`ApiResponse`](quill_transport::ApiResponse) into data or a refusal.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session (user + token)
//! ```

mod codec;
mod error;
mod response;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use response::{ApiOutcome, failure_message, read_envelope};
pub use types::{
    AuthPayload, Envelope, Identifier, LoginRequest, ProfileUpdate, RegisterRequest, Role, User,
    UserId, UserPayload,
};
