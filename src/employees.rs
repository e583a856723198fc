//! Employee administration, owner-only
//!
//! Listing goes through the privileged `get_users_with_email` database
//! function, which joins profile rows with their auth emails under the
//! backend's owner policy. Account creation is a two-step flow with no
//! transaction around it: register the credential with the auth gateway,
//! then patch the profile row the backend's trigger created. The partial
//! outcome is reported as its own variant, never folded into a generic
//! failure.

use log::{info, warn};
use serde::Serialize;
use serde_json::json;

use crate::auth::SessionContext;
use crate::error::Error;
use crate::models::{UserProfile, UserRole};
use crate::Warehouse;

/// Input for a new employee account
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Outcome of the two-step account creation
#[derive(Debug)]
pub enum EmployeeCreation {
    /// Both steps succeeded; the account still needs email confirmation
    /// before it can sign in
    Created(UserProfile),

    /// The credential was registered but the profile patch failed: the
    /// account exists with the backend's default role and the given name
    /// unset. Retrying the patch for `user_id` completes the flow.
    RolePatchFailed { user_id: String, error: Error },
}

#[derive(Serialize)]
struct ProfilePatch<'a> {
    name: &'a str,
    role: UserRole,
}

/// Employee administration operations
pub struct Employees<'a> {
    client: &'a Warehouse,
}

impl<'a> Employees<'a> {
    pub(crate) fn new(client: &'a Warehouse) -> Self {
        Self { client }
    }

    /// List all accounts with their emails via the privileged function
    pub async fn list(&self, ctx: &SessionContext) -> Result<Vec<UserProfile>, Error> {
        ctx.require_owner()?;

        self.client
            .rpc("get_users_with_email", json!({}))
            .with_auth(ctx.access_token())
            .execute::<Vec<UserProfile>>()
            .await
    }

    /// Create an employee account.
    ///
    /// Registers the credential (which makes the gateway send a confirmation
    /// email) and then patches the profile row with the chosen name and
    /// role. See [`EmployeeCreation`] for the partial-failure outcome.
    pub async fn create(
        &self,
        ctx: &SessionContext,
        employee: &NewEmployee,
    ) -> Result<EmployeeCreation, Error> {
        ctx.require_owner()?;

        let signup = self
            .client
            .auth()
            .sign_up(
                &employee.email,
                &employee.password,
                Some(json!({ "name": employee.name })),
            )
            .await?;
        let user_id = signup.user.id;

        let patch = ProfilePatch {
            name: &employee.name,
            role: employee.role,
        };
        let mut update = self
            .client
            .from("users")
            .with_auth(ctx.access_token())
            .update(&patch);
        update.eq("id", &user_id);

        match update.execute_one::<UserProfile>().await {
            Ok(mut profile) => {
                profile.email = Some(employee.email.clone());
                info!("created employee account {} ({:?})", profile.id, profile.role);
                Ok(EmployeeCreation::Created(profile))
            }
            Err(error) => {
                warn!(
                    "account {} created but role patch failed: {}",
                    user_id, error
                );
                Ok(EmployeeCreation::RolePatchFailed { user_id, error })
            }
        }
    }
}
