//! The single outbound path to the backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint call goes through `Gateway::send`. It reads the credential
//! slot, runs the `before_send` hook, and classifies the response with
//! `after_receive`. An `Unauthorized` verdict clears the credential, resets
//! every registered listener (the session store) and forces navigation to the
//! login entry point before the failure reaches the caller.
//!
//! TRADE-OFFS
//! ==========
//! The unauthorized effect only fires when the credential generation observed
//! at send time is still current. A 401 answering a token that has since been
//! replaced by a fresh login is returned to its caller but leaves the new
//! session alone.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, extract_detail};
use super::hooks::{self, ResponseVerdict};
use super::transport::{InboundResponse, Method, OutboundRequest, RequestBody, Transport};
use crate::state::credential::{Credential, CredentialSlot, Generation};

/// Forces the whole client back to its unauthenticated entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Notified synchronously when the gateway observes an expired credential.
pub trait UnauthorizedListener: Send + Sync {
    fn on_unauthorized(&self);
}

pub struct Gateway {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialSlot>,
    navigator: Arc<dyn Navigator>,
    listeners: Mutex<Vec<Arc<dyn UnauthorizedListener>>>,
}

impl Gateway {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialSlot>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            credentials,
            navigator,
            listeners: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialSlot> {
        &self.credentials
    }

    pub fn on_unauthorized(&self, listener: Arc<dyn UnauthorizedListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Send a request through both hooks.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` after the session was invalidated,
    /// `ApiError::Status` for any other non-2xx response and
    /// `ApiError::Network` when the backend is unreachable.
    pub async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, ApiError> {
        let (credential, issued) = self.credentials.current();
        self.dispatch(request, credential, issued).await
    }

    /// Send a request without the stored credential.
    ///
    /// Used for the login exchange: a 401 here answers the submitted
    /// username and password, never the stored token, so it cannot expire
    /// the current session.
    ///
    /// # Errors
    ///
    /// `ApiError::Status` for any non-2xx response (401 included) and
    /// `ApiError::Network` when the backend is unreachable.
    pub async fn send_anonymous(&self, request: OutboundRequest) -> Result<InboundResponse, ApiError> {
        let issued = self.credentials.generation();
        self.dispatch(request, None, issued).await
    }

    async fn dispatch(
        &self,
        request: OutboundRequest,
        credential: Option<Credential>,
        issued: Generation,
    ) -> Result<InboundResponse, ApiError> {
        let carried_credential = credential.is_some();
        let request = hooks::before_send(request, credential.as_ref());
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(method = method.as_str(), %path, authenticated = carried_credential, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::debug!(method = method.as_str(), %path, error = %e, "request did not reach backend");
            ApiError::Network(e.0)
        })?;

        if hooks::after_receive(response.status, carried_credential) == ResponseVerdict::Unauthorized {
            self.invalidate(issued, &path);
            return Err(ApiError::Unauthorized { detail: extract_detail(&response.body) });
        }
        if !response.is_success() {
            tracing::debug!(method = method.as_str(), %path, status = response.status, "request failed");
            return Err(ApiError::from_response(response.status, &response.body));
        }
        Ok(response)
    }

    fn invalidate(&self, issued: Generation, path: &str) {
        if !self.credentials.clear_if_current(issued) {
            tracing::debug!(%path, "ignoring 401 for a credential that was already replaced");
            return;
        }
        tracing::warn!(%path, "credential rejected; clearing session");
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_unauthorized();
        }
        self.navigator.redirect_to_login();
    }

    // =========================================================================
    // VERBS
    // =========================================================================

    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn get(&self, path: &str, query: Vec<(String, String)>) -> Result<InboundResponse, ApiError> {
        self.send(OutboundRequest::new(Method::Get, path).with_query(query))
            .await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<InboundResponse, ApiError> {
        self.send(OutboundRequest::new(Method::Post, path).with_body(body))
            .await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn put(&self, path: &str, body: RequestBody) -> Result<InboundResponse, ApiError> {
        self.send(OutboundRequest::new(Method::Put, path).with_body(body))
            .await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn delete(&self, path: &str) -> Result<InboundResponse, ApiError> {
        self.send(OutboundRequest::new(Method::Delete, path))
            .await
    }

    // =========================================================================
    // TYPED HELPERS
    // =========================================================================

    /// # Errors
    ///
    /// See [`Gateway::send`]; also `ApiError::Decode` for unexpected bodies.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.get(path, query).await?.json()
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also `ApiError::Decode` for unexpected bodies.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, json_body(body)?).await?.json()
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also `ApiError::Decode` for unexpected bodies.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.put(path, json_body(body)?).await?.json()
    }

    /// Form-encoded POST through [`Gateway::send_anonymous`].
    ///
    /// # Errors
    ///
    /// See [`Gateway::send_anonymous`]; also `ApiError::Decode` for unexpected bodies.
    pub async fn post_form_anonymous<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let request = OutboundRequest::new(Method::Post, path).with_body(RequestBody::Form(fields));
        self.send_anonymous(request).await?.json()
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

// =============================================================================
// TEST HELPERS
// =============================================================================
