//! Access decision for protected views.
//!
//! The gate holds no state of its own; it reads the session and says what a
//! protected view should render.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use tokio::sync::watch;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Bootstrap has not settled yet; render a loading indicator.
    Pending,
    /// Render the login / signup entry point instead of the content.
    Unauthenticated,
    Authenticated,
}

impl GateDecision {
    #[must_use]
    pub fn allows_protected(self) -> bool {
        self == Self::Authenticated
    }
}

#[must_use]
pub fn decide(session: &Session) -> GateDecision {
    if session.is_loading() {
        GateDecision::Pending
    } else if session.is_authenticated() {
        GateDecision::Authenticated
    } else {
        GateDecision::Unauthenticated
    }
}

/// Wait for bootstrap to settle and return the resulting decision.
///
/// If the session store is dropped while still loading, the last observed
/// state is decided as-is.
pub async fn settle(rx: &mut watch::Receiver<Session>) -> GateDecision {
    let settled = rx
        .wait_for(|session| !session.is_loading())
        .await
        .map(|session| decide(&session));
    match settled {
        Ok(decision) => decision,
        Err(_) => decide(&rx.borrow()),
    }
}
