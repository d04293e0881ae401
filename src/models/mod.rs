//! Core data models for publication records and authors.

mod author;
mod record;

pub use author::{AuthorInput, NormalizedAuthor, FAMILY_KEYS, GIVEN_KEYS};
pub use record::{
    scalar_text, Record, DOI_KEYS, ISSUE_KEYS, JOURNAL_KEYS, PAGES_KEYS, TITLE_KEYS, URL_KEYS,
    VOLUME_KEYS,
};
