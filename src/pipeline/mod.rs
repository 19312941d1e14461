//! The fetch, decode, extract and dedup pipeline.

pub mod aggregator;

pub use aggregator::Aggregator;
