use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{check_owner, TransactionFilter, TransactionStore};
use crate::error::StoreError;
use crate::models::TransactionRecord;

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TransactionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TransactionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransactionStore for MemoryStore {
    fn insert_batch(&self, owner_id: &str, records: &[TransactionRecord]) -> Result<usize, StoreError> {
        check_owner(owner_id, records)?;
        self.lock().extend_from_slice(records);
        debug!("Stored {} records in memory for {}", records.len(), owner_id);
        Ok(records.len())
    }

    fn query(&self, filter: &TransactionFilter) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(filter.apply(self.lock().iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use crate::store::tests::record;

    #[test]
    fn test_insert_and_query() {
        let store = MemoryStore::new();
        let batch = vec![record("u1", "Swiggy", 100, Direction::Debit), record("u1", "Ola", 80, Direction::Debit)];

        assert_eq!(store.insert_batch("u1", &batch).unwrap(), 2);
        store.insert_batch("u2", &[record("u2", "Netflix", 649, Direction::Debit)]).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.query(&TransactionFilter::recent("u1")).unwrap().len(), 2);
    }

    #[test]
    fn test_mismatched_batch_writes_nothing() {
        let store = MemoryStore::new();
        let batch = vec![record("u1", "a", 1, Direction::Debit), record("u9", "b", 2, Direction::Debit)];

        assert!(store.insert_batch("u1", &batch).is_err());
        assert!(store.is_empty());
    }
}
