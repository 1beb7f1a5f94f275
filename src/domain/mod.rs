//! Pure domain types with minimal dependencies
//!
//! Types here have no transport, camera or rendering dependencies so every
//! other module can share them.

pub mod analysis;
pub mod blob;

pub use analysis::*;
pub use blob::*;
