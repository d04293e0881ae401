//! Single-name parsing and initials.

use crate::models::NormalizedAuthor;

/// Parse one free-form author name.
///
/// `"Last, First Middle"` splits on the first comma. Without a comma the
/// last whitespace token is the family name and everything before it the
/// given name. Never fails; empty input gives an empty author.
pub fn parse_author_name(name: &str) -> NormalizedAuthor {
    let name = name.trim();

    if let Some((family, given)) = name.split_once(',') {
        return NormalizedAuthor::new(family.trim(), given.trim());
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.split_last() {
        None => NormalizedAuthor::default(),
        Some((family, given)) => NormalizedAuthor::new(*family, given.join(" ")),
    }
}

/// Dense dotted initials for a given-name string.
///
/// `"Jigar P."` becomes `"J.P."` and `"Jean-Pierre"` becomes `"J.-P."`.
/// Hyphen chunks without any letter are dropped.
pub fn initials(given: &str) -> String {
    let given = given.trim().replace('\u{2013}', "-");

    given
        .split_whitespace()
        .map(|part| {
            part.split('-')
                .filter_map(chunk_initial)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect()
}

fn chunk_initial(chunk: &str) -> Option<String> {
    chunk
        .chars()
        .find(|c| c.is_alphabetic())
        .map(|c| format!("{}.", c.to_uppercase()))
}
