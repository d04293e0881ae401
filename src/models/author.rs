//! Author models: the polymorphic input shape and the canonical form.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Keys that may hold an author's family name, in lookup order
pub const FAMILY_KEYS: &[&str] = &["family", "last", "surname"];
/// Keys that may hold an author's given name(s), in lookup order
pub const GIVEN_KEYS: &[&str] = &["given", "first", "forename"];

/// An author reduced to family and given names.
///
/// `given` may be empty. `family` is only empty when the source offered
/// nothing usable for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAuthor {
    pub family: String,
    pub given: String,
}

impl NormalizedAuthor {
    pub fn new(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            given: given.into(),
        }
    }
}

/// The shapes an `authors` field shows up in.
///
/// The shape is decided once, from the value as a whole; a sequence is
/// classified by its first element.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorInput {
    /// `[{family: Desai, given: Jigar P.}, ...]`
    Structured(Vec<Mapping>),
    /// `["Jigar P. Desai", "Doe, Jane Q."]`
    Names(Vec<String>),
    /// `"Desai, Jigar P.; Doe, Jane Q."`
    Delimited(String),
    /// Missing, null, empty or unrecognized
    Absent,
}

impl AuthorInput {
    /// Classify a raw `authors` value.
    ///
    /// Elements of a sequence that don't share the first element's shape are
    /// dropped.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return AuthorInput::Absent;
        };
        match value {
            Value::String(s) => AuthorInput::Delimited(s.clone()),
            Value::Sequence(items) => match items.first() {
                Some(Value::Mapping(_)) => AuthorInput::Structured(
                    items
                        .iter()
                        .filter_map(|v| v.as_mapping().cloned())
                        .collect(),
                ),
                Some(Value::String(_)) => AuthorInput::Names(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                ),
                _ => AuthorInput::Absent,
            },
            Value::Tagged(tagged) => Self::from_value(Some(&tagged.value)),
            _ => AuthorInput::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_classify_structured() {
        let v = value("- {family: Desai, given: Jigar}\n- Doe\n");
        match AuthorInput::from_value(Some(&v)) {
            AuthorInput::Structured(entries) => assert_eq!(entries.len(), 1),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_classify_names_and_string() {
        let v = value("[Jigar Desai, Jane Doe]");
        assert_eq!(
            AuthorInput::from_value(Some(&v)),
            AuthorInput::Names(vec!["Jigar Desai".into(), "Jane Doe".into()])
        );
        let v = value("'Desai, J.; Doe, J.'");
        assert_eq!(
            AuthorInput::from_value(Some(&v)),
            AuthorInput::Delimited("Desai, J.; Doe, J.".into())
        );
    }

    #[test]
    fn test_classify_absent() {
        assert_eq!(AuthorInput::from_value(None), AuthorInput::Absent);
        assert_eq!(AuthorInput::from_value(Some(&Value::Null)), AuthorInput::Absent);
        assert_eq!(AuthorInput::from_value(Some(&value("[]"))), AuthorInput::Absent);
        assert_eq!(AuthorInput::from_value(Some(&value("42"))), AuthorInput::Absent);
    }
}
