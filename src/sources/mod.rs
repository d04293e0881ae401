//! Upstream publication sources.
//!
//! A [`PublicationSource`] lists the publications of an author or an
//! institution. Listing is all-or-nothing (and retried by the caller for
//! transient failures), while each listed item is converted on its own: an
//! item that cannot be converted is logged and skipped so the rest of the
//! listing still comes through.
//!
//! # Implementing a New Source
//!
//! 1. Create a struct that implements `PublicationSource`
//! 2. Return the raw items from `list_publications`
//! 3. Map one raw item to an [`UpstreamPublication`] in `parse_item`

pub mod mock;
mod openalex;
mod publication;

pub use mock::MockSource;
pub use openalex::{OpenAlexSource, OPENALEX_API_BASE};
pub use publication::UpstreamPublication;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Record;
use crate::utils::{with_retry, RetryConfig};

/// Whose publications to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// An author identifier (e.g. OpenAlex `A5023888391`)
    Author(String),
    /// An institution identifier (e.g. OpenAlex `I136199984`)
    Institution(String),
}

impl QueryScope {
    /// The bare identifier
    pub fn id(&self) -> &str {
        match self {
            QueryScope::Author(id) | QueryScope::Institution(id) => id,
        }
    }
}

/// A publication listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationQuery {
    pub scope: QueryScope,
    pub max_results: usize,
}

impl PublicationQuery {
    pub fn new(scope: QueryScope, max_results: usize) -> Self {
        Self { scope, max_results }
    }
}

/// The interface every upstream publication source implements.
#[async_trait]
pub trait PublicationSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "openalex")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// List raw publication items for the query
    async fn list_publications(&self, query: &PublicationQuery) -> Result<Vec<Value>, SourceError>;

    /// Interpret one raw item
    fn parse_item(&self, item: &Value) -> Result<UpstreamPublication, SourceError>;

    /// Validate an identifier before querying
    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        if id.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty identifier".to_string()));
        }
        Ok(())
    }
}

/// Records fetched from a source, plus how many items were skipped
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// List a source's publications and convert them to records.
///
/// The listing is retried per `retry`; items that fail to convert are
/// skipped with a warning.
pub async fn fetch_records(
    source: &dyn PublicationSource,
    query: &PublicationQuery,
    retry: RetryConfig,
) -> Result<FetchReport, SourceError> {
    source.validate_id(query.scope.id())?;

    let items = with_retry(retry, || source.list_publications(query)).await?;
    tracing::info!("{} returned {} items for {}", source.name(), items.len(), query.scope.id());

    let mut report = FetchReport::default();
    for (index, item) in items.iter().enumerate() {
        match source.parse_item(item) {
            Ok(publication) => report.records.push(publication.into_record()),
            Err(e) => {
                tracing::warn!("Skipping item {} from {}: {}", index, source.id(), e);
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded (with optional retry-after seconds)
    #[error("Rate limit exceeded")]
    RateLimit(Option<u64>),

    /// Nothing found for the identifier
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
