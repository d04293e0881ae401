//! DOI extraction from free text and URLs.
//!
//! This is pattern matching only; nothing is resolved or validated.

use std::sync::OnceLock;

use regex::Regex;

fn doi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:a-z0-9]+").expect("DOI pattern is valid")
    })
}

/// Find the first DOI-looking token in `text`.
///
/// Trailing sentence punctuation picked up by the pattern is dropped.
pub fn extract_doi(text: &str) -> Option<String> {
    let decoded = urlencoding::decode(text)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| text.to_string());

    doi_re()
        .find(&decoded)
        .map(|m| trim_trailing(m.as_str()).to_string())
}

/// Drop trailing sentence punctuation and closing parens without a partner
fn trim_trailing(mut doi: &str) -> &str {
    loop {
        let trimmed = doi.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
        let trimmed = match trimmed.strip_suffix(')') {
            Some(rest) if rest.matches('(').count() < rest.matches(')').count() + 1 => rest,
            _ => trimmed,
        };
        if trimmed.len() == doi.len() {
            return doi;
        }
        doi = trimmed;
    }
}

/// First DOI found among candidate strings, in order
pub fn first_doi<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find_map(extract_doi)
}
