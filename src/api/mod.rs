//! X/Twitter GraphQL API module.
//!
//! This module provides:
//! - HTTP client for the `TweetResultByRestId` GraphQL endpoint
//! - Session/guest token handling
//! - Response-shape normalization (legacy field hoisting)
//! - Cached lookups via an LRU response cache

pub mod auth;
pub mod cache;
pub mod client;
pub mod types;

pub use cache::ResolverCache;
pub use client::TwitterApi;
pub use types::RawApiMedia;
