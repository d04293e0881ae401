//! Author list normalization and Nature-style rendering.
//!
//! # Delimited strings
//!
//! A single string is split on `;` or the word `and`. When neither occurs
//! the string is split on commas instead, and an even number of pieces
//! greater than two is read as alternating family/given pairs:
//!
//! ```text
//! "Desai, Jigar P., Doe, Jane Q."  ->  Desai J.P., Doe J.Q.
//! ```
//!
//! This is a heuristic. A list of an even number of single-token names
//! (`"Curie, Bohr, Dirac, Pauli"`) is paired up the same way. Use `;` or a
//! list to avoid the ambiguity.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::names::{initials, parse_author_name};
use crate::models::{scalar_text, AuthorInput, NormalizedAuthor, FAMILY_KEYS, GIVEN_KEYS};

/// Marker appended to truncated author lists
pub const ET_AL: &str = "et al.";

const UNKNOWN_AUTHOR: &str = "Unknown";

/// Truncation rule for long author lists.
///
/// Lists longer than `threshold` are cut to the first `display_cap` names
/// followed by "et al.".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPolicy {
    pub threshold: usize,
    pub display_cap: usize,
}

impl AuthorPolicy {
    /// Create a policy. The cap is clamped into `1..=threshold`.
    pub fn new(threshold: usize, display_cap: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            threshold,
            display_cap: display_cap.clamp(1, threshold),
        }
    }

    /// Up to six names, then the first six and "et al."
    pub fn nature() -> Self {
        Self::new(6, 6)
    }

    /// Up to ten names, then the first six and "et al."
    pub fn extended() -> Self {
        Self::new(10, 6)
    }
}

impl Default for AuthorPolicy {
    fn default() -> Self {
        Self::nature()
    }
}

/// Normalize any supported `authors` shape into ordered canonical authors.
pub fn normalize_authors(input: &AuthorInput) -> Vec<NormalizedAuthor> {
    match input {
        AuthorInput::Structured(entries) => entries.iter().map(from_structured).collect(),
        AuthorInput::Names(names) => from_names(names),
        AuthorInput::Delimited(s) => from_delimited(s),
        AuthorInput::Absent => Vec::new(),
    }
}

/// Shorthand for classifying and normalizing a raw `authors` value
pub fn normalize_author_value(value: Option<&Value>) -> Vec<NormalizedAuthor> {
    normalize_authors(&AuthorInput::from_value(value))
}

fn from_structured(entry: &Mapping) -> NormalizedAuthor {
    let lookup = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| entry.get(*k).and_then(scalar_text))
            .unwrap_or_default()
    };
    NormalizedAuthor::new(lookup(FAMILY_KEYS), lookup(GIVEN_KEYS))
}

fn from_names<S: AsRef<str>>(names: &[S]) -> Vec<NormalizedAuthor> {
    names
        .iter()
        .map(|n| parse_author_name(n.as_ref()))
        .collect()
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r";|\band\b").expect("separator pattern is valid"))
}

fn from_delimited(raw: &str) -> Vec<NormalizedAuthor> {
    let pieces: Vec<&str> = separator_re().split(raw).collect();

    let pieces = if pieces.len() == 1 {
        let commas: Vec<&str> = raw.split(',').collect();
        if commas.len() > 2 && commas.len() % 2 == 0 {
            let pairs: Vec<String> = commas
                .chunks(2)
                .map(|pair| pair.join(", ").trim().to_string())
                .filter(|pair| pair.chars().any(|c| c != ',' && !c.is_whitespace()))
                .collect();
            return from_names(&pairs);
        }
        commas
    } else {
        pieces
    };

    let names: Vec<&str> = pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    from_names(&names)
}

/// Render one author as `"Family F.M."`.
pub fn format_author(author: &NormalizedAuthor) -> String {
    let family = author.family.trim();
    let gi = initials(&author.given);

    if !family.is_empty() && !gi.is_empty() {
        format!("{} {}", family, gi)
    } else if !family.is_empty() {
        family.to_string()
    } else {
        let given = author.given.trim();
        if given.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            given.to_string()
        }
    }
}

/// Render an author list Nature-style.
///
/// `"A X., B Y. & C Z."`, or `"A X., B Y., et al."` once the list is longer
/// than the policy threshold.
pub fn format_authors(authors: &[NormalizedAuthor], policy: &AuthorPolicy) -> String {
    let truncated = authors.len() > policy.threshold;
    let shown = if truncated {
        &authors[..policy.display_cap.min(authors.len())]
    } else {
        authors
    };

    let formatted: Vec<String> = shown.iter().map(format_author).collect();

    match formatted.as_slice() {
        [] => String::new(),
        names if truncated => format!("{}, {}", names.join(", "), ET_AL),
        [only] => only.clone(),
        [init @ .., last] => format!("{} & {}", init.join(", "), last),
    }
}
