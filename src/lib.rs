//! Library interface for brewlens, a Homebrew catalog explorer.
//!
//! Data flows leaf-first: upstream JSON ([`api`]) is turned into uniform
//! records ([`normalize`]), cached per catalog ([`cache`]), filtered
//! ([`query`]) and paged ([`pagination`]). Detail views combine a record with
//! its [`provenance`] via [`detail`].

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod detail;
pub mod error;
pub mod normalize;
pub mod output;
pub mod pagination;
pub mod provenance;
pub mod query;
pub mod server;

// Re-export commonly used types
pub use api::{BrewApi, RawCask, RawFormula, RawPackage};
pub use cache::{CacheState, CatalogCache, CatalogSource, Clock, SystemClock};
pub use config::Config;
pub use error::{BrewError, Result};
pub use normalize::{NormalizedRecord, PackageKind, normalize};
pub use pagination::{FilePageStore, MemoryPageStore, Page, PageStore, Paginator, paginate};
pub use provenance::{ProvenanceStatus, classify};
pub use query::{IndexJump, filter, find_start_index};
