//! Session-aware client for the CryptoDash backend-for-frontend API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` is the only path to the network: one `Gateway` attaches the bearer
//! credential to every request and resets the session when the backend
//! rejects it. `state` holds the client-side containers built on top of it
//! (credential, session, gate, request and pagination state). `config` reads
//! the environment and `util` formats values for display.

pub mod config;
pub mod net;
pub mod state;
pub mod util;
