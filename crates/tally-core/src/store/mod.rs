//! Storage sinks for accepted transactions.

mod jsonl;
mod memory;

pub use jsonl::JsonLinesStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{Category, Direction, TransactionRecord};

/// Append-only transaction storage.
///
/// A batch is all records from one upload; implementations write all of it
/// or none of it.
pub trait TransactionStore: Send + Sync {
    /// Persist a batch owned by `owner_id`, returning how many were written.
    fn insert_batch(&self, owner_id: &str, records: &[TransactionRecord]) -> Result<usize, StoreError>;

    /// Records matching `filter`, newest first.
    fn query(&self, filter: &TransactionFilter) -> Result<Vec<TransactionRecord>, StoreError>;
}

/// Selection for [`TransactionStore::query`].
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub owner_id: Option<String>,
    pub category: Option<Category>,
    pub direction: Option<Direction>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Page size of the recent-transactions listing.
    pub const DEFAULT_LIMIT: usize = 20;

    /// The newest [`Self::DEFAULT_LIMIT`] records of one owner.
    pub fn recent(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            limit: Some(Self::DEFAULT_LIMIT),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.owner_id.as_deref().is_none_or(|o| o == record.owner_id())
            && self.category.as_ref().is_none_or(|c| c == record.category())
            && self.direction.is_none_or(|d| d == record.direction())
    }

    /// Filter, sort newest first and truncate. Records created at the same
    /// instant keep their insertion order.
    pub fn apply(&self, records: impl IntoIterator<Item = TransactionRecord>) -> Vec<TransactionRecord> {
        let mut selected: Vec<TransactionRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Every record in a batch must belong to the batch owner.
pub(crate) fn check_owner(owner_id: &str, records: &[TransactionRecord]) -> Result<(), StoreError> {
    match records.iter().find(|r| r.owner_id() != owner_id) {
        Some(stray) => Err(StoreError::OwnerMismatch {
            expected: owner_id.to_string(),
            found: stray.owner_id().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal::Decimal;

    pub(crate) fn record(owner: &str, description: &str, amount: i64, direction: Direction) -> TransactionRecord {
        let category = crate::rules::classify(description);
        TransactionRecord::new(owner, "2026-01-01", description, Decimal::from(amount), category, direction).unwrap()
    }

    #[test]
    fn test_filter_matches() {
        let swiggy = record("u1", "Swiggy", 100, Direction::Debit);
        let salary = record("u1", "Salary", 5000, Direction::Credit);

        let filter = TransactionFilter::recent("u1").with_category(Category::Food);
        assert!(filter.matches(&swiggy));
        assert!(!filter.matches(&salary));

        let credits = TransactionFilter::default().with_direction(Direction::Credit);
        assert!(credits.matches(&salary));
        assert!(!TransactionFilter::recent("u2").matches(&salary));
    }

    #[test]
    fn test_apply_limits() {
        let records: Vec<_> = (1..=30).map(|i| record("u1", "Uber", i, Direction::Debit)).collect();
        let page = TransactionFilter::recent("u1").apply(records);
        assert_eq!(page.len(), TransactionFilter::DEFAULT_LIMIT);
    }

    #[test]
    fn test_check_owner() {
        let batch = vec![record("u1", "a", 1, Direction::Debit), record("u2", "b", 2, Direction::Debit)];
        assert!(matches!(
            check_owner("u1", &batch),
            Err(StoreError::OwnerMismatch { found, .. }) if found == "u2"
        ));
        assert!(check_owner("u1", &batch[..1]).is_ok());
    }
}
