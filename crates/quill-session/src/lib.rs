//! Client-side auth session lifecycle for Quill.
//!
//! This crate keeps a signed-in user signed in:
//!
//! 1. **Sessions**: login, registration, logout and the one-time startup
//!    bootstrap ([`SessionManager`])
//! 2. **Tokens**: expiry tracking with a safety margin, silent refresh
//!    through the transport's credential channel, and coalescing so that
//!    concurrent callers share a single refresh
//! 3. **Authenticated requests**: attaching the bearer token and retrying
//!    once after a 401
//!
//! # How it fits in the stack
//!
//! ```text
//! App / UI (above)  ← subscribes to SessionEvents, asks guard() before routing
//!     ↕
//! Session Layer (this crate)  ← owns user + access token + expiry
//!     ↕
//! Protocol Layer  ← request/response shapes, envelope decoding
//!     ↕
//! Transport Layer (below)  ← HTTP, carries the refresh cookie
//! ```

mod error;
mod events;
mod guard;
mod manager;
mod session;

pub use error::SessionError;
pub use events::{SessionEvent, SignOutReason};
pub use guard::{Access, GuardDecision, evaluate};
pub use manager::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, REGISTER_PATH, SessionManager};
pub use session::{SessionConfig, SessionSnapshot, token_expiry};
