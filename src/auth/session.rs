//! Session data and the explicitly passed session context

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{UserProfile, UserRole};

use super::types::AuthUser;

/// Session data issued by the auth gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token sent as the bearer on data calls
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type (always `bearer` in practice)
    #[serde(default = "Session::default_token_type")]
    pub token_type: String,

    /// Lifetime of the access token in seconds
    pub expires_in: i64,

    /// Absolute expiry as a unix timestamp, when the gateway provides one
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in account
    pub user: AuthUser,
}

impl Session {
    fn default_token_type() -> String {
        "bearer".to_string()
    }

    /// Check whether the access token has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }
}

/// A signed-in session paired with its warehouse profile.
///
/// Service calls take this context as an explicit argument instead of
/// reading a process-wide holder, so every data access names the session it
/// acts for and capability checks are ordinary method calls on the value in
/// hand.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The gateway session
    pub session: Session,

    /// The profile row matching the session's account
    pub profile: UserProfile,
}

impl SessionContext {
    /// Pair a session with its profile
    pub fn new(session: Session, profile: UserProfile) -> Self {
        Self { session, profile }
    }

    /// The signed-in account ID
    pub fn user_id(&self) -> &str {
        &self.session.user.id
    }

    /// The bearer token for data calls
    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }

    /// Whether this session may administer employee accounts.
    ///
    /// The backend's row policies enforce this on every call regardless;
    /// checking here lets callers fail before issuing a doomed request.
    pub fn can_manage_employees(&self) -> bool {
        self.profile.role == UserRole::Owner
    }

    /// Fail with [`Error::Forbidden`] unless the session belongs to an owner
    pub fn require_owner(&self) -> Result<(), Error> {
        if self.can_manage_employees() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: UserRole) -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            name: "Test User".to_string(),
            role,
            email: None,
        }
    }

    fn session() -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: AuthUser {
                id: "user-1".to_string(),
                ..AuthUser::default()
            },
        }
    }

    #[test]
    fn owner_can_manage_employees() {
        let ctx = SessionContext::new(session(), profile(UserRole::Owner));
        assert!(ctx.can_manage_employees());
        assert!(ctx.require_owner().is_ok());
    }

    #[test]
    fn employee_cannot_manage_employees() {
        let ctx = SessionContext::new(session(), profile(UserRole::Employee));
        assert!(!ctx.can_manage_employees());
        assert!(matches!(ctx.require_owner(), Err(Error::Forbidden)));
    }

    #[test]
    fn session_without_expiry_never_expires() {
        assert!(!session().is_expired());
    }

    #[test]
    fn session_with_past_expiry_is_expired() {
        let mut session = session();
        session.expires_at = Some(0);
        assert!(session.is_expired());
    }
}
