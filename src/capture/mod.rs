//! Input acquisition and image normalization
//!
//! This module consolidates:
//! - Live camera streams (camera.rs)
//! - User-selected image files (file.rs)
//! - Raw pixel source type (image.rs)
//! - JPEG normalization for upload (normalize.rs)

pub mod camera;
pub mod file;
pub mod image;
pub mod normalize;
