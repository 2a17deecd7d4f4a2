//! Command implementations for the brewlens CLI
//!
//! - **browse**: paged catalog listing with search and jump-to-letter
//! - **info**: detail view of a single formula or cask
//! - **serve**: the HTTP pass-through endpoint

pub mod browse;
pub mod info;
pub mod serve;

pub use browse::{BrowseOptions, browse};
pub use info::info;
pub use serve::serve;
