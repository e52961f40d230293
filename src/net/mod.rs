//! Networking modules for the BFF HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` is the only path to the network, `hooks` holds its two
//! interception points, `transport` is the socket seam, `api` groups the
//! endpoint calls and `types` defines the endpoint records.

pub mod api;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod transport;
pub mod types;
