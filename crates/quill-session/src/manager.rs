//! The session manager: owns the client's auth session.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Establishing sessions (login, register, startup bootstrap)
//! - Tracking token expiry and refreshing before the server rejects us
//! - Attaching the bearer token to API calls and recovering from a 401
//! - Tearing the session down (logout, failed refresh)
//!
//! # Concurrency note
//!
//! A `SessionManager` is meant to be shared as `Arc<SessionManager<_>>`
//! by every part of the app that talks to the API. Two locks are involved:
//!
//! - `state` (`std::sync::Mutex`) guards the session fields. It is only
//!   held for field reads/writes, never across an `.await`.
//! - `refresh_gate` (`tokio::sync::Mutex`) serializes refreshes. A caller
//!   that waited on the gate checks whether the session generation moved
//!   while it waited; if so another caller already refreshed and it reuses
//!   that result. A page firing ten authenticated requests with an expired
//!   token therefore costs one refresh round-trip, not ten.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use quill_protocol::{
    ApiOutcome, AuthPayload, Codec, JsonCodec, LoginRequest, ProfileUpdate, RegisterRequest,
    User, UserPayload, read_envelope,
};
use quill_transport::{ApiRequest, ApiResponse, HttpTransport};
use tokio::sync::{OnceCell, broadcast};
use tokio::time::Instant;

use crate::guard::{self, Access, GuardDecision};
use crate::session::Session;
use crate::{SessionConfig, SessionError, SessionEvent, SessionSnapshot, SignOutReason};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// How many unread events a slow subscriber may lag behind.
const EVENT_CAPACITY: usize = 32;

/// Owns the in-memory session and every operation that touches it.
///
/// ## Lifecycle
///
/// ```text
///            login() / register() / bootstrap()
/// [Empty] ─────────────────────────────────────→ [Active]
///    ↑                                              │ │
///    │           refresh ok (token rotated)         │ │
///    │                    ┌─────────────────────────┘ │
///    │                    ▼                           │
///    │                [Active]                        │
///    │                                                │
///    └──────── logout() / refresh failed ─────────────┘
/// ```
pub struct SessionManager<T: HttpTransport, C: Codec = JsonCodec> {
    transport: T,
    codec: C,
    config: SessionConfig,

    /// The session fields. Only `install`/`clear`/`replace_user` on
    /// [`Session`] mutate them, always under this lock.
    state: Mutex<Session>,

    /// Held for the duration of a refresh round-trip.
    refresh_gate: tokio::sync::Mutex<()>,

    /// True until the startup bootstrap has finished.
    loading: AtomicBool,
    bootstrap: OnceCell<()>,

    events: broadcast::Sender<SessionEvent>,
}

impl<T: HttpTransport> SessionManager<T, JsonCodec> {
    /// Creates a manager with an empty session that speaks JSON.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self::with_codec(transport, JsonCodec, config)
    }
}

impl<T: HttpTransport, C: Codec> SessionManager<T, C> {
    /// Creates a manager with an empty session and a custom codec.
    pub fn with_codec(transport: T, codec: C, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            codec,
            config,
            state: Mutex::new(Session::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            loading: AtomicBool::new(true),
            bootstrap: OnceCell::new(),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribes to session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // =====================================================================
    // Derived state
    // =====================================================================

    /// `true` if there is no expiry or it has been reached.
    pub fn is_token_expired(&self) -> bool {
        self.lock().is_token_expired_at(Instant::now())
    }

    /// User and token present and the token not yet expired.
    ///
    /// Recomputed on every call; the answer can flip from `true` to
    /// `false` purely through the passage of time.
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated_at(Instant::now())
    }

    /// `true` until [`bootstrap`](Self::bootstrap) has completed.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// The current profile snapshot, if a session is held.
    pub fn user(&self) -> Option<User> {
        self.lock().user().cloned()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now = Instant::now();
        let state = self.lock();
        SessionSnapshot {
            user: state.user().cloned(),
            token_expiry: state.token_expiry(),
            authenticated: state.is_authenticated_at(now),
            loading: self.is_loading(),
        }
    }

    /// Route guard decision for the current session.
    pub fn guard(&self, access: Access) -> GuardDecision {
        guard::evaluate(access, &self.snapshot(), &self.config.sign_in_path)
    }

    // =====================================================================
    // Establishing and ending sessions
    // =====================================================================

    /// Exchanges credentials for a session.
    ///
    /// `identifier` may be an email address or a username. On success the
    /// new session is installed and the user returned.
    ///
    /// # Errors
    /// - [`SessionError::Rejected`]: the server refused the credentials
    /// - [`SessionError::Network`]: the server could not be reached
    /// - [`SessionError::Protocol`]: the success response was malformed
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, SessionError> {
        let body = self.codec.encode(&LoginRequest::new(identifier, password))?;
        let request = ApiRequest::post(LOGIN_PATH).json_body(body);
        self.establish(&request, "sign-in").await
    }

    /// Creates an account and signs in as it. Same contract as
    /// [`login`](Self::login).
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, SessionError> {
        let body = self.codec.encode(registration)?;
        let request = ApiRequest::post(REGISTER_PATH).json_body(body);
        self.establish(&request, "registration").await
    }

    async fn establish(&self, request: &ApiRequest, action: &str) -> Result<User, SessionError> {
        match self.exchange(request).await {
            Ok(payload) => {
                let user = self
                    .lock()
                    .install(payload, self.config.safety_margin, Instant::now())
                    .clone();
                tracing::info!(user = %user.id, action, "session established");
                self.publish(SessionEvent::SignedIn { user: user.clone() });
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, action, "could not establish session");
                Err(e)
            }
        }
    }

    /// Sends a login/register/refresh request and unwraps the auth payload.
    async fn exchange(&self, request: &ApiRequest) -> Result<AuthPayload, SessionError> {
        let response = self.transport.send(request).await?;
        match read_envelope::<AuthPayload, _>(&self.codec, &response)? {
            ApiOutcome::Data(payload) => Ok(payload),
            ApiOutcome::Rejected { status, message } => {
                tracing::debug!(path = %request.path, status, "auth request rejected");
                Err(SessionError::Rejected(message))
            }
        }
    }

    /// Signs out.
    ///
    /// The server is told first so it can revoke the refresh credential,
    /// but that call is best effort: whatever happens to it, the local
    /// session is cleared before this returns.
    pub async fn logout(&self) {
        match self.transport.send(&ApiRequest::post(LOGOUT_PATH)).await {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                tracing::warn!(status = response.status, "logout rejected by server, clearing locally");
            }
            Err(e) => {
                tracing::warn!(error = %e, "logout request failed, clearing locally");
            }
        }

        self.lock().clear();
        tracing::info!("signed out");
        self.publish(SessionEvent::SignedOut {
            reason: SignOutReason::Logout,
            redirect_to: self.config.sign_in_path.clone(),
        });
    }

    /// Attempts once per manager to resurrect a session from the refresh
    /// credential, then marks loading as finished.
    ///
    /// Concurrent callers all wait for the same attempt. Later calls
    /// return immediately. Returns whether a session is now active.
    pub async fn bootstrap(&self) -> bool {
        self.bootstrap
            .get_or_init(|| async {
                let needs_refresh = {
                    let state = self.lock();
                    !state.has_token() || state.is_token_expired_at(Instant::now())
                };
                if needs_refresh {
                    self.refresh_access_token().await;
                }
                self.loading.store(false, Ordering::Release);

                let authenticated = self.is_authenticated();
                tracing::info!(authenticated, "session bootstrap complete");
                self.publish(SessionEvent::BootstrapComplete { authenticated });
            })
            .await;
        self.is_authenticated()
    }

    // =====================================================================
    // Tokens
    // =====================================================================

    /// Obtains a fresh access token using the refresh credential.
    ///
    /// On success the new session is installed and its token returned. On
    /// any failure the session is cleared and `None` returned; this never
    /// errors.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let seen = self.lock().generation();
        self.refresh_since(seen).await
    }

    /// Refreshes unless the session changed after generation `seen`.
    async fn refresh_since(&self, seen: u64) -> Option<String> {
        let _gate = self.refresh_gate.lock().await;

        let started = {
            let state = self.lock();
            if state.generation() != seen {
                // Whatever installed or cleared the session while we waited
                // is the result; a fresh token is handed over even if its
                // lifetime was within the safety margin.
                tracing::debug!("session changed while waiting, reusing result");
                return state.access_token().map(str::to_string);
            }
            state.generation()
        };

        let result = self.exchange(&ApiRequest::post(REFRESH_PATH)).await;

        let mut state = self.lock();
        if state.generation() != started {
            // A login or logout landed mid-refresh; it wins.
            return state.access_token().map(str::to_string);
        }
        match result {
            Ok(payload) => {
                let token = payload.access_token.clone();
                let user = state
                    .install(payload, self.config.safety_margin, Instant::now())
                    .clone();
                drop(state);

                tracing::info!("access token refreshed");
                self.publish(SessionEvent::Refreshed { user });
                Some(token)
            }
            Err(e) => {
                let had_session = state.clear();
                drop(state);

                tracing::warn!(error = %e, "token refresh failed, session cleared");
                if had_session {
                    self.publish(SessionEvent::SignedOut {
                        reason: SignOutReason::RefreshFailed,
                        redirect_to: self.config.sign_in_path.clone(),
                    });
                }
                None
            }
        }
    }

    /// Returns a token that is not known to be expired, refreshing only
    /// when there is none or it has expired.
    pub async fn get_valid_token(&self) -> Option<String> {
        self.valid_token().await.map(|(token, _)| token)
    }

    /// Like [`get_valid_token`](Self::get_valid_token), plus the session
    /// generation the token belongs to.
    async fn valid_token(&self) -> Option<(String, u64)> {
        let seen = {
            let state = self.lock();
            let now = Instant::now();
            if let Some(token) = state.valid_token_at(now) {
                return Some((token, state.generation()));
            }
            if state.has_token() {
                tracing::debug!("access token expired, refreshing");
            } else {
                tracing::debug!("no access token held, refreshing");
            }
            state.generation()
        };

        let token = self.refresh_since(seen).await?;
        let generation = self.lock().generation();
        Some((token, generation))
    }

    // =====================================================================
    // Authenticated requests
    // =====================================================================

    /// Sends `request` with the bearer token attached.
    ///
    /// If the server answers 401 (its view of expiry can run ahead of
    /// ours), the token is refreshed and the request replayed exactly
    /// once. Whatever the replay returns, including a second 401, is
    /// handed back as-is.
    ///
    /// # Errors
    /// - [`SessionError::AuthenticationRequired`]: no token could be
    ///   obtained, before or after the 401; no request was (re)sent
    /// - [`SessionError::Network`]: no response was received
    pub async fn authenticated_fetch(
        &self,
        mut request: ApiRequest,
    ) -> Result<ApiResponse, SessionError> {
        let (token, generation) = self
            .valid_token()
            .await
            .ok_or(SessionError::AuthenticationRequired)?;

        request.set_header("Authorization", format!("Bearer {token}"));
        let response = self.transport.send(&request).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::debug!(method = %request.method, path = %request.path, "unauthorized, refreshing and retrying once");
        let token = self
            .refresh_since(generation)
            .await
            .ok_or(SessionError::AuthenticationRequired)?;

        request.set_header("Authorization", format!("Bearer {token}"));
        let retried = self.transport.send(&request).await?;
        if retried.is_unauthorized() {
            tracing::warn!(method = %request.method, path = %request.path, "still unauthorized after refresh");
        }
        Ok(retried)
    }

    // =====================================================================
    // Profile
    // =====================================================================

    /// Reads the signed-in user's profile and updates the session snapshot.
    pub async fn fetch_profile(&self) -> Result<User, SessionError> {
        let request = ApiRequest::get(self.config.profile_path.clone());
        self.profile_request(request).await
    }

    /// Sends the changed profile fields and updates the session snapshot
    /// with the server's result.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        let body = self.codec.encode(update)?;
        let request = ApiRequest::put(self.config.profile_path.clone()).json_body(body);
        self.profile_request(request).await
    }

    async fn profile_request(&self, request: ApiRequest) -> Result<User, SessionError> {
        let response = self.authenticated_fetch(request).await?;
        match read_envelope::<UserPayload, _>(&self.codec, &response)? {
            ApiOutcome::Data(UserPayload { user }) => {
                if self.lock().replace_user(user.clone()) {
                    self.publish(SessionEvent::ProfileUpdated { user: user.clone() });
                }
                Ok(user)
            }
            ApiOutcome::Rejected { message, .. } => Err(SessionError::Rejected(message)),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
