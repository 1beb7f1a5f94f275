//! Core application module
//!
//! This module contains:
//! - Command line entry point (app.rs)
//! - HTML report output (report.rs)

pub mod app;
pub mod report;
