//! Post identification from a user-interaction target.
//!
//! This module provides:
//! - [`ClickTarget`]: a snapshot of the clicked element's context
//! - [`PostReference`]: the identified post (id, author, permalink)
//! - [`locate_post`]: ordered fallback strategies, first valid result wins

pub mod reference;
pub mod strategies;
pub mod target;

pub use reference::{ExtractionMethod, PostReference};
pub use strategies::locate_post;
pub use target::ClickTarget;
