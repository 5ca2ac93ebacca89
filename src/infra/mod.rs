//! Infrastructure layer for fixforge
//!
//! Contains low-level implementations and external integrations.

pub mod ast;
pub mod cancel;
pub mod file_filter;

pub use cancel::CancellationToken;
