//! fixforge - diagnostic-driven code fixes for C#
//!
//! Turns an analyzer diagnostic into ready-to-apply edits over immutable
//! syntax trees, possibly spanning several documents of a solution.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;
