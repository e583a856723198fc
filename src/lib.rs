//! Warehouse back-office client
//!
//! A thin typed client for a sack-freight warehouse's back office:
//! deliveries with derived financial state, partial payments, an expense
//! ledger, fixed reporting windows and dashboard rollups. Every data
//! operation is a passthrough call against a Supabase-style hosted backend
//! (auth gateway plus PostgREST data API); durability, uniqueness and
//! row-level authorization stay with the platform.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod deliveries;
pub mod employees;
pub mod error;
pub mod fetch;
pub mod models;
pub mod purchases;
pub mod refresh;
pub mod reports;
pub mod store;

use reqwest::Client;
use serde::Serialize;

use crate::auth::{Auth, SessionContext};
use crate::config::{ClientOptions, Config};
use crate::dashboard::Dashboard;
use crate::deliveries::Deliveries;
use crate::employees::Employees;
use crate::error::Error;
use crate::models::UserProfile;
use crate::purchases::Purchases;
use crate::reports::Reports;
use crate::store::{RpcBuilder, TableClient};

/// The main entry point for the warehouse client
pub struct Warehouse {
    /// The base URL for the backend project
    base_url: String,

    /// The public API key sent with every request
    anon_key: String,

    /// HTTP client shared by all services
    http_client: Client,

    /// Auth gateway client
    auth: Auth,
}

impl Warehouse {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```no_run
    /// use godown::{config::Config, Warehouse};
    ///
    /// let config = Config::new("https://your-project.supabase.co", "your-anon-key")?;
    /// let warehouse = Warehouse::new(config)?;
    /// # Ok::<(), godown::error::Error>(())
    /// ```
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_options(config, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn with_options(config: Config, options: ClientOptions) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let base_url = config.base_url();
        let auth = Auth::new(&base_url, &config.anon_key, http_client.clone());

        Ok(Self {
            base_url,
            anon_key: config.anon_key,
            http_client,
            auth,
        })
    }

    /// Create a new client from the environment (see [`config::ENV_URL`]
    /// and [`config::ENV_ANON_KEY`])
    pub fn from_env() -> Result<Self, Error> {
        Self::new(Config::from_env()?)
    }

    /// The auth gateway client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// A query client for a table or view
    pub fn from(&self, table: &str) -> TableClient {
        TableClient::new(
            &self.base_url,
            &self.anon_key,
            table,
            self.http_client.clone(),
        )
    }

    /// A builder for a stored-procedure call
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        store::rpc(
            &self.base_url,
            &self.anon_key,
            function,
            params,
            self.http_client.clone(),
        )
    }

    /// Delivery operations
    pub fn deliveries(&self) -> Deliveries<'_> {
        Deliveries::new(self)
    }

    /// Purchase ledger operations
    pub fn purchases(&self) -> Purchases<'_> {
        Purchases::new(self)
    }

    /// Report queries
    pub fn reports(&self) -> Reports<'_> {
        Reports::new(self)
    }

    /// Dashboard assembly
    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    /// Employee administration
    pub fn employees(&self) -> Employees<'_> {
        Employees::new(self)
    }

    /// Build the session context for the currently held session, if any.
    ///
    /// Fetches the caller's profile row and pairs it with the session; the
    /// email known to the auth gateway is merged into the profile. Returns
    /// `Ok(None)` when nobody is signed in.
    pub async fn bootstrap(&self) -> Result<Option<SessionContext>, Error> {
        let Some(session) = self.auth.get_session() else {
            return Ok(None);
        };

        let mut profile: UserProfile = self
            .from("users")
            .with_auth(&session.access_token)
            .select("*")
            .eq("id", &session.user.id)
            .execute_one()
            .await?
            .ok_or_else(|| {
                Error::database(format!("no profile row for user {}", session.user.id))
            })?;

        if profile.email.is_none() {
            profile.email = session.user.email.clone();
        }

        Ok(Some(SessionContext::new(session, profile)))
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::SessionContext;
    pub use crate::config::{ClientOptions, Config};
    pub use crate::error::Error;
    pub use crate::Warehouse;
}
