//! HTTP retrieval of remote subscription sources.

pub mod client;

pub use client::{is_valid_user_agent, FetchError, FetchOptions, Fetcher};
