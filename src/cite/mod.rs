//! Author normalization, year resolution and Nature-style citations.
//!
//! Everything in this module is a total function: malformed input degrades
//! to an empty author list, an empty clause or the current year, never to
//! an error, so one odd record cannot stop a batch.
//!
//! ```rust
//! use publist_enrich::cite::{build_citation, AuthorPolicy, FixedClock};
//! use publist_enrich::models::Record;
//!
//! let record = Record::new()
//!     .with("authors", "Desai, Jigar P.; Doe, Jane Q.")
//!     .with("title", "Complement and fungi")
//!     .with("journal", "Nature")
//!     .with("volume", 580)
//!     .with("year", 2021);
//! let clock = FixedClock::from_ymd(2024, 1, 1).unwrap();
//!
//! assert_eq!(
//!     build_citation(&record, &AuthorPolicy::nature(), &clock),
//!     "Desai J.P. & Doe J.Q.. Complement and fungi. Nature 580 (2021)."
//! );
//! ```

pub mod authors;
pub mod names;
pub mod nature;
pub mod order;
pub mod year;

pub use authors::{
    format_author, format_authors, normalize_author_value, normalize_authors, AuthorPolicy, ET_AL,
};
pub use names::{initials, parse_author_name};
pub use nature::{build_citation, synthesize, CitationFields};
pub use order::{sort_key, sort_records};
pub use year::{resolve_year, Clock, FixedClock, SystemClock};
