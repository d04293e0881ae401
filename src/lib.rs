//! # publist-enrich
//!
//! Normalizes publication metadata for static-site data files and renders a
//! Nature-style citation for every record.
//!
//! ## Architecture
//!
//! - [`models`]: Loosely-typed publication records and normalized authors
//! - [`cite`]: Author normalization, year resolution, citation rendering, ordering
//! - [`store`]: Reading, atomically writing and backing up the YAML collection
//! - [`pipeline`]: Enrich and fetch runs tying the pieces together
//! - [`sources`]: Upstream publication sources (OpenAlex) with a trait seam
//! - [`utils`]: HTTP client, retry with backoff, DOI extraction
//! - [`config`]: Layered configuration (defaults, TOML file, environment)

pub mod cite;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use cite::{AuthorPolicy, Clock, FixedClock, SystemClock};
pub use models::{NormalizedAuthor, Record};
pub use pipeline::{enrich_collection, enrich_record, EnrichOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
