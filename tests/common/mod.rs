//! Shared fixtures for the integration tests
//!
//! Each test binary compiles its own copy, so not every helper is used
//! everywhere.
#![allow(dead_code)]

use godown::auth::{AuthUser, Session, SessionContext};
use godown::config::Config;
use godown::models::{UserProfile, UserRole};
use godown::Warehouse;

/// A client pointed at a mock server
pub fn warehouse(uri: &str) -> Warehouse {
    let config = Config::new(uri, "test-key").expect("valid test config");
    Warehouse::new(config).expect("client builds")
}

fn context(user_id: &str, token: &str, role: UserRole) -> SessionContext {
    let session = Session {
        access_token: token.to_string(),
        refresh_token: "refresh-token".to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: None,
        user: AuthUser {
            id: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id)),
            ..AuthUser::default()
        },
    };
    let profile = UserProfile {
        id: user_id.to_string(),
        name: format!("{} profile", user_id),
        role,
        email: None,
    };
    SessionContext::new(session, profile)
}

/// A signed-in owner session
pub fn owner_ctx() -> SessionContext {
    context("owner-1", "owner-token", UserRole::Owner)
}

/// A signed-in employee session
pub fn employee_ctx() -> SessionContext {
    context("employee-1", "employee-token", UserRole::Employee)
}
