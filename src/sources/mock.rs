//! Mock source for testing purposes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use crate::sources::{PublicationQuery, PublicationSource, SourceError, UpstreamPublication};

/// A mock source that serves canned items.
///
/// Items are parsed as serialized [`UpstreamPublication`]s.
#[derive(Debug, Default)]
pub struct MockSource {
    items: Mutex<Vec<Value>>,
    failure: Mutex<Option<SourceError>>,
}

impl MockSource {
    /// Create a new mock source with no items.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the items to return.
    pub fn set_items(&self, items: Vec<Value>) {
        if let Ok(mut guard) = self.items.lock() {
            *guard = items;
        }
    }

    /// Make the next listing fail with `error`.
    pub fn fail_with(&self, error: SourceError) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = Some(error);
        }
    }
}

#[async_trait]
impl PublicationSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn list_publications(&self, query: &PublicationQuery) -> Result<Vec<Value>, SourceError> {
        if let Some(error) = self.failure.lock().ok().and_then(|mut f| f.take()) {
            return Err(error);
        }
        let items = self.items.lock().map(|i| i.clone()).unwrap_or_default();
        Ok(items.into_iter().take(query.max_results).collect())
    }

    fn parse_item(&self, item: &Value) -> Result<UpstreamPublication, SourceError> {
        Ok(serde_json::from_value(item.clone())?)
    }
}
