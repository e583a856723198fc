//! Authentication against the hosted auth gateway

mod session;
mod types;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::info;
use reqwest::Client;
use serde_json::json;

use crate::error::Error;
use crate::fetch::Fetch;

pub use session::{Session, SessionContext};
pub use types::{AuthEvent, AuthUser, SignUpResult};

/// Listener invoked on every auth-state change
pub type AuthCallback = Box<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

struct Listener {
    id: u64,
    callback: AuthCallback,
}

type ListenerList = Arc<Mutex<Vec<Listener>>>;

/// Client for the auth gateway
pub struct Auth {
    /// The base URL for the backend project
    url: String,

    /// The public API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<Mutex<Option<Session>>>,

    /// Subscribed auth-state listeners
    listeners: ListenerList,

    /// Source of listener ids
    next_listener_id: AtomicU64,
}

/// Handle returned by [`Auth::on_auth_state_change`]; dropping it keeps the
/// listener alive, calling [`AuthSubscription::unsubscribe`] removes it.
pub struct AuthSubscription {
    id: u64,
    listeners: ListenerList,
}

impl AuthSubscription {
    /// Stop delivering auth-state changes to this listener
    pub fn unsubscribe(self) {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.retain(|listener| listener.id != self.id);
    }
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Register a new account with email and password.
    ///
    /// `metadata` is attached as the account's user metadata; the warehouse
    /// passes the profile name this way so the backend's profile trigger can
    /// pick it up. Depending on project settings the gateway may require
    /// email confirmation, in which case no session is returned.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<SignUpResult, Error> {
        let url = self.auth_url("/signup");

        let mut body = json!({
            "email": email,
            "password": password,
        });
        if let Some(metadata) = metadata {
            body["data"] = metadata;
        }

        let response: serde_json::Value = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute()
            .await?;

        // With confirmation disabled the gateway answers with a full
        // session; otherwise it answers with the bare user record.
        if response.get("access_token").is_some() {
            let session: Session = serde_json::from_value(response)?;
            let user = session.user.clone();
            self.store_session(session.clone());
            self.notify(AuthEvent::SignedIn, Some(&session));
            info!("signed up {} with immediate session", user.id);
            Ok(SignUpResult {
                user,
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(response)?;
            info!("signed up {}, confirmation pending", user.id);
            Ok(SignUpResult {
                user,
                session: None,
            })
        }
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.auth_url("/token?grant_type=password");

        let body = json!({
            "email": email,
            "password": password,
        });

        let session: Session = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute()
            .await?;

        self.store_session(session.clone());
        self.notify(AuthEvent::SignedIn, Some(&session));
        info!("signed in {}", session.user.id);

        Ok(session)
    }

    /// Sign out the current session
    pub async fn sign_out(&self) -> Result<(), Error> {
        let token = {
            let session = self.session.lock().unwrap();
            match session.as_ref() {
                Some(session) => session.access_token.clone(),
                None => return Err(Error::MissingSession),
            }
        };

        let url = self.auth_url("/logout");
        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .execute_no_content()
            .await?;

        {
            let mut session = self.session.lock().unwrap();
            *session = None;
        }
        self.notify(AuthEvent::SignedOut, None);
        info!("signed out");

        Ok(())
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        let session = self.session.lock().unwrap();
        session.clone()
    }

    /// Replace the held session, e.g. when restoring a persisted one
    pub fn set_session(&self, session: Session) {
        self.store_session(session.clone());
        self.notify(AuthEvent::SignedIn, Some(&session));
    }

    /// Subscribe to auth-state changes.
    ///
    /// The callback runs synchronously after every successful sign-in,
    /// session restore and sign-out, with the new session (or `None` after
    /// sign-out).
    pub fn on_auth_state_change(
        &self,
        callback: impl Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    ) -> AuthSubscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let mut listeners = self.listeners.lock().unwrap();
        listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        AuthSubscription {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }

    fn store_session(&self, session: Session) {
        let mut current = self.session.lock().unwrap();
        *current = Some(session);
    }

    fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            (listener.callback)(event, session);
        }
    }
}
