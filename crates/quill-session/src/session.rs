//! Session types: the data the client holds about the signed-in user.
//!
//! A "session" is the tuple `(user, access_token, token_expiry)`. It lives
//! only in memory. The long-lived refresh credential is NOT part of it;
//! that stays inside the transport.
//!
//! Only [`Session::install`] and [`Session::clear`] change the identity
//! fields, and both do so in one step, so a token without a user (or the
//! reverse) is never observable.

use std::time::Duration;

use quill_protocol::{AuthPayload, User};
use tokio::time::Instant;

/// Upper bound on the lifetime we accept from the server. Protects the
/// `Instant` arithmetic from absurd `expiresIn` values.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Subtracted from the server-declared token lifetime, so the client
    /// refreshes before the server starts rejecting the token.
    ///
    /// Default: 60 seconds.
    pub safety_margin: Duration,

    /// Where a UI should send the user after sign-out or when a guarded
    /// route needs authentication.
    ///
    /// Default: `/login`.
    pub sign_in_path: String,

    /// Profile endpoint, relative to the API base URL.
    ///
    /// Default: `/auth/profile`.
    pub profile_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            safety_margin: Duration::from_secs(60),
            sign_in_path: "/login".to_string(),
            profile_path: "/auth/profile".to_string(),
        }
    }
}

/// Computes when a freshly issued token must be treated as unusable:
/// `now + expires_in - safety_margin`, never earlier than `now`.
pub fn token_expiry(now: Instant, expires_in_secs: u64, safety_margin: Duration) -> Instant {
    let lifetime = Duration::from_secs(expires_in_secs).min(MAX_TOKEN_LIFETIME);
    now + lifetime.saturating_sub(safety_margin)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The manager's private session state.
///
/// `generation` counts installs and clears. Refresh coalescing compares it
/// before and after waiting: if it moved, someone else already changed the
/// session and the waiter must not refresh again.
#[derive(Debug, Default)]
pub(crate) struct Session {
    user: Option<User>,
    access_token: Option<String>,
    token_expiry: Option<Instant>,
    generation: u64,
}

impl Session {
    /// Installs a new session from a login/register/refresh response and
    /// returns the installed user.
    pub(crate) fn install(
        &mut self,
        payload: AuthPayload,
        safety_margin: Duration,
        now: Instant,
    ) -> &User {
        self.token_expiry = Some(token_expiry(now, payload.expires_in, safety_margin));
        self.access_token = Some(payload.access_token);
        self.generation += 1;
        self.user.insert(payload.user)
    }

    /// Drops the whole session. Returns whether there was anything to drop.
    pub(crate) fn clear(&mut self) -> bool {
        let had_session = self.user.is_some() || self.access_token.is_some();
        self.user = None;
        self.access_token = None;
        self.token_expiry = None;
        self.generation += 1;
        had_session
    }

    /// Swaps in a newer profile snapshot, keeping the token.
    ///
    /// Ignored when no session is held: a profile response that lands
    /// after a sign-out must not resurrect a half session.
    pub(crate) fn replace_user(&mut self, user: User) -> bool {
        if self.access_token.is_none() {
            return false;
        }
        self.user = Some(user);
        true
    }

    pub(crate) fn is_token_expired_at(&self, now: Instant) -> bool {
        match self.token_expiry {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    pub(crate) fn is_authenticated_at(&self, now: Instant) -> bool {
        self.user.is_some() && self.access_token.is_some() && !self.is_token_expired_at(now)
    }

    /// The held token, if there is one and it has not expired.
    pub(crate) fn valid_token_at(&self, now: Instant) -> Option<String> {
        if self.is_token_expired_at(now) {
            return None;
        }
        self.access_token.clone()
    }

    /// The held token whatever its expiry. Used to hand a just-installed
    /// token to callers that waited for it.
    pub(crate) fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub(crate) fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub(crate) fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub(crate) fn token_expiry(&self) -> Option<Instant> {
        self.token_expiry
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// A point-in-time, read-only view of the session for UI code.
///
/// Carries no access token. The token is only ever handed out by
/// `get_valid_token` / attached by `authenticated_fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token_expiry: Option<Instant>,
    pub authenticated: bool,
    pub loading: bool,
}
