//! Auth-session state for the running client.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` exists per client and is handed to every view that
//! needs identity (clone the handle; clones share state). It is the only
//! writer of the credential apart from the gateway's expiry handling, which
//! reaches it through the `UnauthorizedListener` hook.
//!
//! DESIGN
//! ======
//! `Session` is published through a `watch` channel so gates and views can
//! await changes. `is_authenticated` is derived from `user`, so the two can
//! never disagree. Results of network calls are applied only while the
//! credential generation they were issued under is still current; a logout
//! or newer login in between always wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::credential::Credential;
use crate::net::api::UserService;
use crate::net::error::ApiError;
use crate::net::gateway::{Gateway, UnauthorizedListener};
use crate::net::types::{Credentials, NewUser, User};

const LOGIN_FALLBACK: &str = "login failed";
const SIGNUP_FALLBACK: &str = "signup failed";

/// Snapshot of the authentication state.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    user: Option<User>,
    is_loading: bool,
}

impl Session {
    /// State at process start, before bootstrap has settled.
    #[must_use]
    pub fn starting() -> Self {
        Self { user: None, is_loading: true }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// Message returned by a failed session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SessionFailure {
    message: String,
}

impl SessionFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self::new(err.detail_or(fallback))
    }
}

struct SessionShared {
    state: watch::Sender<Session>,
    bootstrapped: AtomicBool,
}

impl SessionShared {
    fn set_user(&self, user: Option<User>) {
        self.state.send_modify(|session| session.user = user);
    }
}

/// Ends the loading phase when bootstrap settles or its future is dropped.
struct LoadingSettled<'a> {
    shared: &'a SessionShared,
}

impl Drop for LoadingSettled<'_> {
    fn drop(&mut self) {
        self.shared
            .state
            .send_if_modified(|session| std::mem::replace(&mut session.is_loading, false));
    }
}

impl UnauthorizedListener for SessionShared {
    fn on_unauthorized(&self) {
        self.set_user(None);
    }
}

#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<SessionShared>,
    gateway: Arc<Gateway>,
    users: UserService,
}

impl SessionStore {
    /// Create the store and register it for the gateway's expiry notifications.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let (state, _) = watch::channel(Session::starting());
        let shared = Arc::new(SessionShared { state, bootstrapped: AtomicBool::new(false) });
        gateway.on_unauthorized(shared.clone());
        let users = UserService::new(gateway.clone());
        Self { shared, gateway, users }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.state.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    /// Validate the stored credential once at start-up.
    ///
    /// Always ends with `is_loading == false`, also when the future is
    /// dropped before the identity fetch settles. Later calls are no-ops.
    pub async fn bootstrap(&self) {
        if self.shared.bootstrapped.swap(true, Ordering::SeqCst) {
            tracing::warn!("session bootstrap already ran; ignoring");
            return;
        }
        let _settled = LoadingSettled { shared: &self.shared };

        let slot = self.gateway.credentials();
        let (credential, issued) = slot.current();
        if credential.is_some() {
            match self.users.current_user().await {
                Ok(user) => {
                    let name = user.name.clone();
                    if slot.run_if_current(issued, || self.shared.set_user(Some(user))) {
                        tracing::info!(user = %name, "restored session");
                    }
                }
                Err(err) => {
                    tracing::info!(error = %err, "stored credential not accepted");
                    if slot.clear_if_current(issued) {
                        self.shared.set_user(None);
                    }
                }
            }
        } else {
            tracing::debug!("no stored credential");
        }
    }

    /// Authenticate, persist the token and load the identity.
    ///
    /// Both requests must succeed. A failed identity fetch leaves the
    /// credential cleared rather than a half-established session.
    ///
    /// # Errors
    ///
    /// Returns the backend message, or `"login failed"` when none was given.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SessionFailure> {
        let token = self
            .users
            .login(credentials)
            .await
            .map_err(|e| SessionFailure::from_api(&e, LOGIN_FALLBACK))?;
        let credential =
            Credential::new(token.access_token).ok_or_else(|| SessionFailure::new("login response carried no token"))?;

        let slot = self.gateway.credentials();
        let issued = slot.replace(&credential).map_err(|e| {
            tracing::warn!(error = %e, "could not persist credential");
            SessionFailure::new(LOGIN_FALLBACK)
        })?;

        match self.users.current_user().await {
            Ok(user) => {
                let name = user.name.clone();
                if slot.run_if_current(issued, || self.shared.set_user(Some(user))) {
                    tracing::info!(user = %name, "logged in");
                    Ok(())
                } else {
                    Err(SessionFailure::new("session changed during login"))
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity fetch failed after login");
                if slot.clear_if_current(issued) {
                    self.shared.set_user(None);
                }
                Err(SessionFailure::from_api(&err, LOGIN_FALLBACK))
            }
        }
    }

    /// Register an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns the backend message, or `"signup failed"` when none was given.
    pub async fn signup(&self, user: &NewUser) -> Result<(), SessionFailure> {
        self.users
            .signup(user)
            .await
            .map(|_| ())
            .map_err(|e| SessionFailure::from_api(&e, SIGNUP_FALLBACK))
    }

    /// Drop the credential and identity locally.
    pub fn logout(&self) {
        self.gateway.credentials().clear();
        self.shared.set_user(None);
        tracing::info!("logged out");
    }
}
