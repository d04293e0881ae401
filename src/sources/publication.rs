//! Source-neutral shape of a fetched publication.

use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::utils::first_doi;

/// A publication as reported by an upstream source.
///
/// `urls` holds every candidate link the source offered; the DOI is pulled
/// out of them by pattern when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamPublication {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub urls: Vec<String>,
}

impl UpstreamPublication {
    /// The DOI found in the candidate URLs, if any
    pub fn doi(&self) -> Option<String> {
        first_doi(self.urls.iter().map(String::as_str))
    }

    /// The first candidate URL that is not a DOI resolver link
    pub fn landing_url(&self) -> Option<&str> {
        self.urls
            .iter()
            .map(String::as_str)
            .find(|u| u.starts_with("http") && !u.contains("doi.org/"))
            .or_else(|| self.urls.first().map(String::as_str))
    }

    /// Convert to a site record.
    ///
    /// Field order: title, authors, journal, volume, issue, pages, year,
    /// doi, url. Empty fields are left out.
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        let doi = self.doi();
        let url = self.landing_url().map(str::to_string);

        set_text(&mut record, "title", self.title);
        let authors: Vec<String> = self
            .authors
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if !authors.is_empty() {
            record.set("authors", authors);
        }
        set_text(&mut record, "journal", self.venue);
        set_text(&mut record, "volume", self.volume);
        set_text(&mut record, "issue", self.issue);
        set_text(&mut record, "pages", self.pages);
        if let Some(year) = self.year {
            record.set("year", year);
        }
        set_text(&mut record, "doi", doi);
        set_text(&mut record, "url", url);
        record
    }
}

fn set_text(record: &mut Record, key: &str, value: Option<String>) {
    if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        record.set(key, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_record_extracts_doi() {
        let publication = UpstreamPublication {
            title: Some("Complement in mucosal immunity".into()),
            authors: vec!["Jigar V. Desai".into(), " ".into()],
            venue: Some("mSphere".into()),
            year: Some(2021),
            volume: Some("6".into()),
            pages: Some("e00123-21".into()),
            urls: vec![
                "https://doi.org/10.1128/mSphere.00123-21".into(),
                "https://journals.asm.org/doi/10.1128/mSphere.00123-21".into(),
            ],
            ..Default::default()
        };

        let record = publication.into_record();
        assert_eq!(record.doi(), Some("10.1128/mSphere.00123-21".to_string()));
        assert_eq!(
            record.url(),
            Some("https://journals.asm.org/doi/10.1128/mSphere.00123-21".to_string())
        );
        assert_eq!(record.issue(), None);
        assert_eq!(record.text("year"), Some("2021".to_string()));

        let keys: Vec<&str> = record
            .fields()
            .keys()
            .filter_map(serde_yaml::Value::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["title", "authors", "journal", "volume", "pages", "year", "doi", "url"]
        );
    }

    #[test]
    fn test_into_record_without_urls() {
        let record = UpstreamPublication {
            title: Some("Untitled".into()),
            ..Default::default()
        }
        .into_record();
        assert_eq!(record.doi(), None);
        assert_eq!(record.url(), None);
        assert!(!record.contains_key("authors"));
    }
}
