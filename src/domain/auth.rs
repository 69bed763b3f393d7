use crate::schemas::user::{User, UserId};
use std::fmt;

/// Why a request was not authenticated.
///
/// An expired session and a missing one deny access the same way; the reason is kept
/// so logs and metrics can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    NoSession,
    SessionExpired,
    InvalidToken,
    ProviderUnavailable,
}

impl UnauthenticatedReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::SessionExpired => "session_expired",
            Self::InvalidToken => "invalid_token",
            Self::ProviderUnavailable => "provider_unavailable",
        }
    }
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unauthenticated: {reason}")]
pub struct Unauthenticated {
    pub reason: UnauthenticatedReason,
}

/// A verified session as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub user: User,
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Active(Box<ActiveSession>),
    Denied(UnauthenticatedReason),
}

/// The caller's identity, resolved once per request and passed explicitly to every
/// handler that needs it. Immutable after resolution, so repeated reads within a
/// request always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    state: State,
}

impl AuthContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::denied(UnauthenticatedReason::NoSession)
    }

    #[must_use]
    pub const fn denied(reason: UnauthenticatedReason) -> Self {
        Self { state: State::Denied(reason) }
    }

    #[must_use]
    pub fn authenticated(session: ActiveSession) -> Self {
        Self { state: State::Active(Box::new(session)) }
    }

    /// The signed-in user, or `None` for anonymous, expired, or rejected callers.
    #[must_use]
    pub fn get_current_user_id(&self) -> Option<&UserId> {
        self.session().map(|s| &s.user.id)
    }

    /// The signed-in user. Protected content must not be produced when this fails.
    ///
    /// # Errors
    /// Returns [`Unauthenticated`] when no valid session exists.
    pub fn require_current_user_id(&self) -> Result<&UserId, Unauthenticated> {
        match &self.state {
            State::Active(session) => Ok(&session.user.id),
            State::Denied(reason) => Err(Unauthenticated { reason: *reason }),
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&ActiveSession> {
        match &self.state {
            State::Active(session) => Some(session.as_ref()),
            State::Denied(_) => None,
        }
    }

    #[must_use]
    pub const fn denial(&self) -> Option<UnauthenticatedReason> {
        match &self.state {
            State::Active(_) => None,
            State::Denied(reason) => Some(*reason),
        }
    }
}
