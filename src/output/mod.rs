//! Output file generation.

pub mod writer;

pub use writer::*;
