//! Types for authentication and session handling

use serde::{Deserialize, Serialize};

/// Account data held by the auth gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthUser {
    /// The account ID (a UUID, kept opaque)
    pub id: String,

    /// The account's email address
    #[serde(default)]
    pub email: Option<String>,

    /// The account's phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Free-form metadata attached at sign-up (the profile name travels here)
    #[serde(default)]
    pub user_metadata: serde_json::Value,

    /// When the email address was confirmed, if it has been
    #[serde(default)]
    pub email_confirmed_at: Option<String>,

    /// The creation time
    #[serde(default)]
    pub created_at: Option<String>,

    /// The update time
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Result of a sign-up call.
///
/// When the project requires email confirmation the gateway creates the
/// account but returns no session; the user signs in after confirming.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    /// The created account
    pub user: AuthUser,

    /// The session, when the account was usable immediately
    pub session: Option<super::Session>,
}

/// Auth-state transition delivered to subscribed listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session was established (sign-in, or sign-up without confirmation)
    SignedIn,

    /// The session was discarded
    SignedOut,
}
