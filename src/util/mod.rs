//! Presentation helpers shared by the command-line views.

pub mod format;
