//! Reading and writing the record collection.
//!
//! A collection is a YAML sequence of mappings. Writes go through a
//! temporary file in the destination directory that is renamed over the
//! destination, so a failed run never leaves a half-written file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::cite::Clock;
use crate::models::Record;

/// Errors from loading or writing a collection
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Input YAML not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Expected a YAML list of publications in {0}")]
    NotASequence(PathBuf),

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load a collection.
///
/// An empty document is an empty collection. Entries that are not mappings
/// load as empty records.
pub fn load_collection(path: &Path) -> Result<Vec<Record>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    parse_collection(&content).map_err(|e| match e {
        CollectionShape::Invalid(source) => StoreError::Parse {
            path: path.to_path_buf(),
            source,
        },
        CollectionShape::NotASequence => StoreError::NotASequence(path.to_path_buf()),
    })
}

#[derive(Debug)]
enum CollectionShape {
    Invalid(serde_yaml::Error),
    NotASequence,
}

fn parse_collection(content: &str) -> Result<Vec<Record>, CollectionShape> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_yaml::from_str(content).map_err(CollectionShape::Invalid)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(items.iter().map(Record::from_value).collect()),
        _ => Err(CollectionShape::NotASequence),
    }
}

/// Serialize records to YAML, keeping field order and unicode as-is
pub fn render_collection(records: &[Record]) -> Result<String, StoreError> {
    Ok(serde_yaml::to_string(records)?)
}

/// Write a collection atomically, creating parent directories as needed
pub fn write_collection(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let content = render_collection(records)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(io_error(&parent))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(io_error(&parent))?;
    tmp.write_all(content.as_bytes()).map_err(io_error(path))?;
    tmp.flush().map_err(io_error(path))?;
    tmp.persist(path).map_err(|e| StoreError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Backup path for `path` at the clock's current time:
/// `<path>.<YYYYmmdd-HHMMSS>.bak`
pub fn backup_path(path: &Path, clock: &dyn Clock) -> PathBuf {
    let stamp = clock.now().format("%Y%m%d-%H%M%S");
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.bak", stamp));
    PathBuf::from(name)
}

/// Copy the current content of `path` to a timestamped backup.
///
/// Returns `Ok(None)` when there is nothing to back up.
pub fn write_backup(path: &Path, clock: &dyn Clock) -> Result<Option<PathBuf>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = backup_path(path, clock);
    std::fs::copy(path, &backup).map_err(io_error(&backup))?;
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cite::FixedClock;
    use tempfile::tempdir;

    #[test]
    fn test_parse_collection_shapes() {
        assert!(parse_collection("").unwrap().is_empty());
        assert!(parse_collection("~\n").unwrap().is_empty());
        assert_eq!(parse_collection("- title: A\n- 3\n").unwrap().len(), 2);
        assert!(matches!(
            parse_collection("title: A\n"),
            Err(CollectionShape::NotASequence)
        ));
        assert!(matches!(
            parse_collection("- [unclosed\n"),
            Err(CollectionShape::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_collection(&dir.path().join("nope.yml")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_write_then_load_preserves_order_and_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("pubs.yml");
        let records = vec![Record::new()
            .with("title", "Rôle du complément")
            .with("authors", "Müller, Jörg")
            .with("year", 2020)];

        write_collection(&path, &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Rôle du complément"));
        assert!(content.find("title").unwrap() < content.find("authors").unwrap());
        assert!(content.find("authors").unwrap() < content.find("year").unwrap());

        assert_eq!(load_collection(&path).unwrap(), records);
    }

    #[test]
    fn test_failed_write_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("pubs.yml");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.yml"), "- title: old\n").unwrap();

        let records = vec![Record::new().with("title", "new")];
        let err = write_collection(&path, &records).unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }), "{:?}", err);

        assert_eq!(
            std::fs::read_to_string(path.join("keep.yml")).unwrap(),
            "- title: old\n"
        );
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("pubs.yml")]);
    }

    #[test]
    fn test_backup_copies_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pubs.yml");
        let clock = FixedClock::from_ymd(2024, 2, 29).unwrap();

        assert_eq!(write_backup(&path, &clock).unwrap(), None);

        std::fs::write(&path, "- title: old\n").unwrap();
        let backup = write_backup(&path, &clock).unwrap().unwrap();
        assert_eq!(
            backup.file_name().unwrap().to_str().unwrap(),
            "pubs.yml.20240229-000000.bak"
        );
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "- title: old\n");
    }
}
