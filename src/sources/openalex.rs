//! OpenAlex publication source.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::sources::{
    PublicationQuery, PublicationSource, QueryScope, SourceError, UpstreamPublication,
};
use crate::utils::HttpClient;

/// Public OpenAlex API endpoint
pub const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// OpenAlex allows at most 200 results per page
const MAX_PER_PAGE: usize = 200;

/// OpenAlex works listing by author or institution.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    client: HttpClient,
    api_base: String,
    email: Option<String>,
    per_page: usize,
}

impl OpenAlexSource {
    /// Create a source against the public API
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            api_base: OPENALEX_API_BASE.to_string(),
            email: None,
            per_page: 100,
        }
    }

    /// Use a different API base URL (mirrors, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Identify with an email for the polite pool
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email.filter(|e| !e.trim().is_empty());
        self
    }

    /// Page size, clamped to what the API accepts
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Strip an `https://openalex.org/` prefix from an identifier
    fn short_id(id: &str) -> &str {
        let id = id.trim();
        id.rsplit_once('/').map(|(_, tail)| tail).unwrap_or(id)
    }

    fn filter(scope: &QueryScope) -> String {
        match scope {
            QueryScope::Author(id) => format!("authorships.author.id:{}", Self::short_id(id)),
            QueryScope::Institution(id) => {
                format!("authorships.institutions.id:{}", Self::short_id(id))
            }
        }
    }

    fn page_url(&self, scope: &QueryScope, page: usize, per_page: usize) -> String {
        let mut url = format!(
            "{}/works?filter={}&sort=publication_year:desc&per-page={}&page={}",
            self.api_base,
            urlencoding::encode(&Self::filter(scope)),
            per_page,
            page
        );
        if let Some(ref email) = self.email {
            url = format!("{}&mailto={}", url, urlencoding::encode(email));
        }
        url
    }

    async fn fetch_page(&self, url: &str) -> Result<WorksResponse, SourceError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query OpenAlex: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(SourceError::RateLimit(retry_after));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse OpenAlex JSON: {}", e)))
    }
}

#[async_trait]
impl PublicationSource for OpenAlexSource {
    fn id(&self) -> &str {
        "openalex"
    }

    fn name(&self) -> &str {
        "OpenAlex"
    }

    async fn list_publications(&self, query: &PublicationQuery) -> Result<Vec<Value>, SourceError> {
        let mut items = Vec::new();
        let mut page = 1;
        // The API offsets by (page - 1) * per-page, so the page size stays fixed
        let per_page = self.per_page.min(query.max_results).max(1);

        while items.len() < query.max_results {
            let data = self
                .fetch_page(&self.page_url(&query.scope, page, per_page))
                .await?;

            let received = data.results.len();
            items.extend(data.results);

            if received < per_page || items.len() >= data.meta.count {
                break;
            }
            page += 1;
        }

        items.truncate(query.max_results);
        Ok(items)
    }

    fn parse_item(&self, item: &Value) -> Result<UpstreamPublication, SourceError> {
        let work: OAWork = serde_json::from_value(item.clone())?;

        let title = work
            .title
            .or(work.display_name)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                SourceError::Parse(format!(
                    "work {} has no title",
                    work.id.as_deref().unwrap_or("?")
                ))
            })?;

        let authors = work
            .authorships
            .iter()
            .filter_map(|a| a.author.display_name.clone())
            .collect();

        let location = work.primary_location.unwrap_or_default();
        let venue = location.source.and_then(|s| s.display_name);

        let biblio = work.biblio.unwrap_or_default();
        let pages = match (biblio.first_page, biblio.last_page) {
            (Some(first), Some(last)) if first != last => Some(format!("{}-{}", first, last)),
            (Some(first), _) => Some(first),
            _ => None,
        };

        let urls = [
            work.doi,
            work.ids.and_then(|ids| ids.doi),
            location.landing_page_url,
            work.id,
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(UpstreamPublication {
            title: Some(title),
            authors,
            venue,
            year: work.publication_year,
            volume: biblio.volume,
            issue: biblio.issue,
            pages,
            urls,
        })
    }

    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        let short = Self::short_id(id);
        let (prefix, digits) = short.split_at(short.chars().next().map_or(0, char::len_utf8));
        let valid = matches!(prefix, "A" | "a" | "I" | "i")
            && !digits.is_empty()
            && digits.chars().all(|c| c.is_ascii_digit());

        if valid {
            Ok(())
        } else {
            Err(SourceError::InvalidRequest(format!(
                "not an OpenAlex author or institution id: {}",
                id
            )))
        }
    }
}

// ===== OpenAlex API Types =====

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<Value>,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct OAWork {
    id: Option<String>,
    doi: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    ids: Option<OAIds>,
    primary_location: Option<OALocation>,
    #[serde(default)]
    authorships: Vec<OAAuthorship>,
    biblio: Option<OABiblio>,
}

#[derive(Debug, Deserialize)]
struct OAIds {
    doi: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OALocation {
    landing_page_url: Option<String>,
    source: Option<OASource>,
}

#[derive(Debug, Deserialize)]
struct OASource {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAAuthorship {
    author: OAAuthor,
}

#[derive(Debug, Deserialize)]
struct OAAuthor {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OABiblio {
    volume: Option<String>,
    issue: Option<String>,
    first_page: Option<String>,
    last_page: Option<String>,
}
