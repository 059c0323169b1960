//! Route guard decisions.
//!
//! Routing itself lives in the UI. This module only answers "may the
//! current session see this page?", as a pure function of a
//! [`SessionSnapshot`] so it can be tested without a manager.

use crate::SessionSnapshot;

/// What a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not (the post feed, post pages).
    Public,
    /// Any signed-in user (profile, writing posts).
    Authenticated,
    /// Signed-in users with the admin role (the back-office).
    Admin,
}

/// The guard's verdict for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Bootstrap is still running; render a placeholder, don't redirect.
    Pending,
    /// Not signed in; go to the given sign-in path.
    Redirect(String),
    /// Signed in, but the role is insufficient.
    Forbidden,
}

/// Decides whether a route requiring `access` may be shown.
pub fn evaluate(access: Access, session: &SessionSnapshot, sign_in_path: &str) -> GuardDecision {
    if access == Access::Public {
        return GuardDecision::Allow;
    }
    if session.loading {
        return GuardDecision::Pending;
    }
    if !session.authenticated {
        return GuardDecision::Redirect(sign_in_path.to_string());
    }
    match access {
        Access::Admin if !session.user.as_ref().is_some_and(|u| u.is_admin()) => {
            GuardDecision::Forbidden
        }
        _ => GuardDecision::Allow,
    }
}
