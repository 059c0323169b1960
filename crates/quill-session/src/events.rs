//! Notifications about session changes.
//!
//! UI layers subscribe with
//! [`SessionManager::subscribe`](crate::SessionManager::subscribe) and react:
//! navigate to the sign-in page on `SignedOut`, re-render the header on
//! `SignedIn`, drop a splash screen on `BootstrapComplete`.

use quill_protocol::User;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The user asked to sign out.
    Logout,
    /// The refresh credential was rejected or unreachable.
    RefreshFailed,
}

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A login or registration installed a new session.
    SignedIn { user: User },

    /// The access token was rotated by a silent refresh.
    Refreshed { user: User },

    /// The profile snapshot was replaced by a profile read or update.
    ProfileUpdated { user: User },

    /// The session is gone. `redirect_to` is the configured sign-in path.
    SignedOut {
        reason: SignOutReason,
        redirect_to: String,
    },

    /// The one-time startup refresh attempt finished.
    BootstrapComplete { authenticated: bool },
}
