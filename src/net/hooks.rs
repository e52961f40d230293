//! Gateway interception points.
//!
//! DESIGN
//! ======
//! Interception is two pure functions: `before_send` decorates a request with
//! the credential, `after_receive` classifies a response. Neither touches
//! storage; the gateway applies the side effects of an `Unauthorized`
//! verdict, which keeps both hooks testable without I/O.

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use super::error::UNAUTHORIZED;
use super::transport::OutboundRequest;
use crate::state::credential::Credential;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseVerdict {
    /// Hand the response to the caller unchanged.
    Pass,
    /// The credential the request carried was rejected.
    Unauthorized,
}

/// Attach `Authorization: Bearer <token>` when a credential is present.
#[must_use]
pub fn before_send(mut request: OutboundRequest, credential: Option<&Credential>) -> OutboundRequest {
    if let Some(credential) = credential {
        request
            .headers
            .push((AUTHORIZATION.to_owned(), credential.bearer()));
    }
    request
}

/// Classify a response status.
///
/// Only a 401 answering a request that carried a credential means the session
/// expired; an anonymous 401 (e.g. a rejected login) is an ordinary failure.
#[must_use]
pub fn after_receive(status: u16, carried_credential: bool) -> ResponseVerdict {
    if status == UNAUTHORIZED && carried_credential {
        ResponseVerdict::Unauthorized
    } else {
        ResponseVerdict::Pass
    }
}
