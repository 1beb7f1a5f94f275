//! Capture session management module
//!
//! This module contains:
//! - Session state and the scan state machine (state.rs)
//! - Requests the session sends to other views (messages.rs)
//! - The awaited capture → normalize → submit → present flow (workflow.rs)

pub mod messages;
pub mod state;
pub mod workflow;
