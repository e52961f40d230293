//! Client-side state containers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `credential` owns the durable bearer token, `session` derives the signed-in
//! identity from it, and `gate` decides what protected views may render.
//! `request` and `pagination` are the per-view containers every
//! data-fetching view is built on.

pub mod credential;
pub mod gate;
pub mod pagination;
pub mod request;
pub mod session;
