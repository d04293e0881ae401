//! Nature-style citation assembly.
//!
//! `Authors. Title. Journal Volume(Issue), Pages (Year). doi:DOI`
//!
//! Every clause is optional except the year; a clause whose inputs are all
//! empty is left out together with its punctuation.

use serde::Serialize;

use super::authors::{format_authors, normalize_author_value, AuthorPolicy};
use super::year::{resolve_year, Clock};
use crate::models::{NormalizedAuthor, Record};

/// Everything that contributes to a citation, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationFields {
    pub authors: Vec<NormalizedAuthor>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub year: i32,
    pub doi: Option<String>,
    pub url: Option<String>,
}

impl CitationFields {
    /// Gather citation inputs from a record, resolving its year.
    pub fn from_record(record: &Record, clock: &dyn Clock) -> Self {
        Self {
            authors: normalize_author_value(record.authors()),
            title: record.title(),
            journal: record.journal(),
            volume: record.volume(),
            issue: record.issue(),
            pages: record.pages(),
            year: resolve_year(record, clock),
            doi: record.doi(),
            url: record.url(),
        }
    }
}

/// Render the citation for a record
pub fn build_citation(record: &Record, policy: &AuthorPolicy, clock: &dyn Clock) -> String {
    synthesize(&CitationFields::from_record(record, clock), policy)
}

/// Assemble a citation from prepared fields.
pub fn synthesize(fields: &CitationFields, policy: &AuthorPolicy) -> String {
    let mut pieces: Vec<String> = Vec::new();

    let authors = format_authors(&fields.authors, policy);
    if !authors.is_empty() {
        pieces.push(format!("{}.", authors));
    }

    if let Some(title) = non_empty(&fields.title) {
        pieces.push(format!("{}.", title));
    }

    let venue = venue_clause(fields);
    if venue.is_empty() {
        pieces.push(format!("({}).", fields.year));
    } else {
        pieces.push(format!("{} ({}).", venue, fields.year));
    }

    if let Some(doi) = non_empty(&fields.doi) {
        pieces.push(format!("doi:{}", doi));
    } else if let Some(url) = non_empty(&fields.url) {
        pieces.push(url.to_string());
    }

    collapse_spaces(&pieces.join(" "))
}

/// `Journal Volume(Issue), Pages` with whatever parts exist
fn venue_clause(fields: &CitationFields) -> String {
    let volume_issue = match (non_empty(&fields.volume), non_empty(&fields.issue)) {
        (Some(v), Some(i)) => Some(format!("{}({})", v, i)),
        (Some(v), None) => Some(v.to_string()),
        _ => None,
    };

    let mut venue = non_empty(&fields.journal).unwrap_or_default().to_string();
    if let Some(vi) = &volume_issue {
        venue = format!("{} {}", venue, vi);
    }
    if let Some(pages) = non_empty(&fields.pages) {
        venue = if volume_issue.is_some() {
            format!("{}, {}", venue, pages)
        } else {
            format!("{} {}", venue, pages)
        };
    }
    venue.trim().to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cite::year::FixedClock;

    fn fields() -> CitationFields {
        CitationFields {
            year: 2021,
            ..Default::default()
        }
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_venue_without_title_or_authors() {
        let f = CitationFields {
            journal: some("Nature"),
            volume: some("580"),
            issue: some("2"),
            pages: some("12-20"),
            doi: some("10.1/x"),
            ..fields()
        };
        assert_eq!(
            synthesize(&f, &AuthorPolicy::nature()),
            "Nature 580(2), 12-20 (2021). doi:10.1/x"
        );
    }

    #[test]
    fn test_full_citation() {
        let f = CitationFields {
            authors: vec![
                NormalizedAuthor::new("Desai", "Jigar V."),
                NormalizedAuthor::new("Lionakis", "Michail S."),
            ],
            title: some("Fungal infections"),
            journal: some("Science"),
            volume: some("371"),
            pages: some("1-9"),
            url: some("https://example.org/p"),
            ..fields()
        };
        assert_eq!(
            synthesize(&f, &AuthorPolicy::nature()),
            "Desai J.V. & Lionakis M.S.. Fungal infections. Science 371, 1-9 (2021). https://example.org/p"
        );
    }

    #[test]
    fn test_issue_without_volume_is_dropped() {
        let f = CitationFields {
            journal: some("Cell"),
            issue: some("4"),
            ..fields()
        };
        assert_eq!(synthesize(&f, &AuthorPolicy::nature()), "Cell (2021).");
    }

    #[test]
    fn test_pages_without_volume() {
        let f = CitationFields {
            journal: some("Cell"),
            pages: some("e12"),
            ..fields()
        };
        assert_eq!(synthesize(&f, &AuthorPolicy::nature()), "Cell e12 (2021).");
    }

    #[test]
    fn test_volume_without_journal() {
        let f = CitationFields {
            title: some("T"),
            volume: some("9"),
            issue: some("1"),
            ..fields()
        };
        assert_eq!(synthesize(&f, &AuthorPolicy::nature()), "T. 9(1) (2021).");
    }

    #[test]
    fn test_year_only() {
        assert_eq!(synthesize(&fields(), &AuthorPolicy::nature()), "(2021).");
    }

    #[test]
    fn test_doi_preferred_over_url() {
        let f = CitationFields {
            doi: some("10.5/y"),
            url: some("https://example.org"),
            ..fields()
        };
        assert_eq!(synthesize(&f, &AuthorPolicy::nature()), "(2021). doi:10.5/y");
    }

    #[test]
    fn test_no_double_spaces() {
        let f = CitationFields {
            title: some("Spaced  out   title"),
            journal: some("  J  "),
            volume: some(" 1 "),
            doi: some("  "),
            url: some("u"),
            ..fields()
        };
        let out = synthesize(&f, &AuthorPolicy::nature());
        assert!(!out.contains("  "), "{}", out);
        assert_eq!(out, "Spaced out title. J 1 (2021). u");
    }

    #[test]
    fn test_build_citation_from_record() {
        let rec: Record = serde_yaml::from_str(
            "title: Complement in fungal disease\nauthors: 'Desai, Jigar V.; Lionakis, Michail S.'\n\
             journal: JACI\nvolume: 147\nissue: 3\npages: 1-10\npublished: '2021-03-01'\ndoi: 10.1016/j.jaci.2021.01.001\n",
        )
        .unwrap();
        let clock = FixedClock::from_ymd(2030, 1, 1).unwrap();
        assert_eq!(
            build_citation(&rec, &AuthorPolicy::nature(), &clock),
            "Desai J.V. & Lionakis M.S.. Complement in fungal disease. JACI 147(3), 1-10 (2021). doi:10.1016/j.jaci.2021.01.001"
        );
    }
}
