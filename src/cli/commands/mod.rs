//! Command implementations for fixforge
//!
//! Each command is implemented in its own module.

pub mod config;
pub mod fixes;
pub mod rules;
