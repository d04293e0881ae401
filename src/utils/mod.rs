//! Utility modules supporting the fetch pipeline.
//!
//! - [`extract_doi`]: Pull a DOI token out of a URL or free text
//! - [`HttpClient`]: Shared reqwest client with timeouts and user agent
//! - [`RetryConfig`] / [`with_retry`]: Exponential backoff for transient errors
//!
//! # DOI extraction
//!
//! ```rust
//! use publist_enrich::utils::extract_doi;
//!
//! assert_eq!(
//!     extract_doi("https://doi.org/10.1038/s41586-020-2012-7").as_deref(),
//!     Some("10.1038/s41586-020-2012-7")
//! );
//! ```

mod doi;
mod http;
mod retry;

pub use doi::{extract_doi, first_doi};
pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use retry::{with_retry, RetryConfig, TransientError};
