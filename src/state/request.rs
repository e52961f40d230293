//! Generic `{data, loading, error}` wrapper around one async operation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every data-fetching view owns one `RequestState` per endpoint it shows and
//! drives the endpoint call through `execute`. Views read a `snapshot` to
//! render; the state never reinterprets the payload.
//!
//! DESIGN
//! ======
//! Overlapping executes are allowed. Each one bumps an outstanding counter and
//! `loading` stays true until all of them have settled; whichever settles
//! last writes last. `reset` bumps a generation so executes started before it
//! settle without writing anything.
//!
//! ERROR HANDLING
//! ==============
//! A failed execute keeps the previous `data` and stores a display message:
//! the backend detail when there is one, otherwise the error's own text,
//! otherwise [`UNKNOWN_ERROR`].

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::session::SessionFailure;
use crate::net::error::ApiError;

pub const UNKNOWN_ERROR: &str = "unknown error";

// =============================================================================
// FAILURE MESSAGES
// =============================================================================

/// An error that can be shown to the user through a request state.
pub trait FailureReport: fmt::Display {
    /// Backend-provided message, preferred over the error's own text.
    fn detail(&self) -> Option<&str> {
        None
    }
}

impl FailureReport for ApiError {
    fn detail(&self) -> Option<&str> {
        ApiError::detail(self)
    }
}

impl FailureReport for SessionFailure {}

impl FailureReport for String {}

/// Normalize an error to the message stored in `error`.
#[must_use]
pub fn failure_message<E: FailureReport + ?Sized>(err: &E) -> String {
    if let Some(detail) = err.detail().map(str::trim).filter(|d| !d.is_empty()) {
        return detail.to_owned();
    }
    let own = err.to_string();
    if own.trim().is_empty() {
        UNKNOWN_ERROR.to_owned()
    } else {
        own
    }
}

// =============================================================================
// REQUEST STATE
// =============================================================================

/// Point-in-time copy of a request state, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot<T> {
    pub data: T,
    pub loading: bool,
    pub error: String,
}

struct Inner<T> {
    data: T,
    error: String,
    outstanding: usize,
    generation: u64,
}

/// Shared handle; clones observe and drive the same state.
#[derive(Clone)]
pub struct RequestState<T> {
    initial: T,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Clone> RequestState<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let inner = Inner {
            data: initial.clone(),
            error: String::new(),
            outstanding: 0,
            generation: 0,
        };
        Self { initial, inner: Arc::new(Mutex::new(inner)) }
    }

    #[must_use]
    pub fn data(&self) -> T {
        self.lock().data.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.lock().outstanding > 0
    }

    /// Current error message; empty when there is none.
    #[must_use]
    pub fn error(&self) -> String {
        self.lock().error.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> RequestSnapshot<T> {
        let inner = self.lock();
        RequestSnapshot {
            data: inner.data.clone(),
            loading: inner.outstanding > 0,
            error: inner.error.clone(),
        }
    }

    /// Run `operation` and record its outcome.
    ///
    /// The result is returned to the caller even when a `reset` in the
    /// meantime kept it from being recorded.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure message when `operation` fails.
    pub async fn execute<F, Fut, E>(&self, operation: F) -> Result<T, String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: FailureReport,
    {
        let generation = {
            let mut inner = self.lock();
            inner.outstanding += 1;
            inner.error.clear();
            inner.generation
        };
        let _settle = Outstanding { inner: &self.inner, generation };

        let result = operation().await;

        let mut inner = self.lock();
        let current = inner.generation == generation;
        match result {
            Ok(data) => {
                if current {
                    inner.data = data.clone();
                    inner.error.clear();
                }
                Ok(data)
            }
            Err(err) => {
                let message = failure_message(&err);
                if current {
                    inner.error.clone_from(&message);
                } else {
                    tracing::debug!(error = %message, "discarding failure from before reset");
                }
                Err(message)
            }
        }
    }

    /// Back to the initial value with no error and not loading.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.data = self.initial.clone();
        inner.error.clear();
        inner.outstanding = 0;
        inner.generation += 1;
    }

    pub fn set_data(&self, data: T) {
        self.lock().data = data;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.lock().error = message.into();
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one outstanding slot when an execute settles or is dropped mid-flight.
struct Outstanding<'a, T> {
    inner: &'a Mutex<Inner<T>>,
    generation: u64,
}

impl<T> Drop for Outstanding<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.generation == self.generation {
            inner.outstanding = inner.outstanding.saturating_sub(1);
        }
    }
}
