//! allergyscan - scan ingredient labels and medication packaging with the
//! AllergyBuster OCR backend
//!
//! The capture-and-analyze workflow:
//! - [`capture`]: camera streams, file selection and JPEG normalization
//! - [`api`]: multipart submission to the OCR endpoint
//! - [`render`]: pure rendering of results and errors
//! - [`session`]: the capture session state machine and workflow driver

pub mod api;
pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod localize;
pub mod render;
pub mod session;
