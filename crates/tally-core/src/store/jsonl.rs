use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{check_owner, TransactionFilter, TransactionStore};
use crate::error::StoreError;
use crate::models::TransactionRecord;

/// Append-only JSON-lines file, one record per line.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionStore for JsonLinesStore {
    fn insert_batch(&self, owner_id: &str, records: &[TransactionRecord]) -> Result<usize, StoreError> {
        check_owner(owner_id, records)?;
        if records.is_empty() {
            return Ok(0);
        }

        // Serialize everything before touching the file so a bad record
        // leaves it unchanged.
        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buffer.as_bytes())?;

        debug!("Appended {} records to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn query(&self, filter: &TransactionFilter) -> Result<Vec<TransactionRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str::<TransactionRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable line {} of {}: {}", idx + 1, self.path.display(), e);
                    None
                }
            });

        Ok(filter.apply(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Direction};
    use crate::store::tests::record;

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("nested").join("tx.jsonl"));

        store
            .insert_batch("u1", &[record("u1", "Zomato", 250, Direction::Debit)])
            .unwrap();
        store
            .insert_batch("u1", &[record("u1", "Salary", 50000, Direction::Credit)])
            .unwrap();

        let all = store.query(&TransactionFilter::recent("u1")).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first.
        assert_eq!(all[0].description(), "Salary");

        let food = store
            .query(&TransactionFilter::recent("u1").with_category(Category::Food))
            .unwrap();
        assert_eq!(food.len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("none.jsonl"));
        assert!(store.query(&TransactionFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_owner_mismatch_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("tx.jsonl"));
        let batch = vec![record("u1", "a", 1, Direction::Debit), record("u2", "b", 2, Direction::Debit)];

        assert!(store.insert_batch("u1", &batch).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.jsonl");
        let store = JsonLinesStore::new(&path);
        store.insert_batch("u1", &[record("u1", "Uber", 90, Direction::Debit)]).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(store.query(&TransactionFilter::default()).unwrap().len(), 1);
    }
}
