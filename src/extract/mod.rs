//! Link extraction from fetched subscription content.
//!
//! This module provides the per-variant link patterns and the Base64
//! decoder used to unwrap encoded subscription bodies.

pub mod decode;
pub mod patterns;

pub use patterns::Extractor;
