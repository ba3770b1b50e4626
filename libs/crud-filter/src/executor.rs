//! Data-access contract consumed by the CRUD layer.
//!
//! The compiler never executes queries. Executors take a [`QueryPlan`] and
//! run it against a concrete store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plan::QueryPlan;

/// A stored record as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of records matching the plan across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Empty page for the plan's pagination.
    #[must_use]
    pub fn empty(plan: &QueryPlan) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: plan.page,
            page_size: plan.page_size,
        }
    }

    /// Number of pages needed for `total` records.
    #[must_use]
    pub fn last_page(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Convert every item, keeping the pagination data.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Runs plans and single-record operations for named resources.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page of records matching `plan`, plus the total count.
    async fn fetch_page(&self, resource: &str, plan: &QueryPlan) -> Result<Page<Row>, Self::Error>;

    /// Fetch the record whose primary key equals `id`.
    async fn fetch_one(&self, resource: &str, id: &str) -> Result<Option<Row>, Self::Error>;

    /// Insert a record and return it as stored.
    async fn insert(&self, resource: &str, values: Row) -> Result<Row, Self::Error>;

    /// Update the record whose primary key equals `id`. `None` if it does not exist.
    async fn update(&self, resource: &str, id: &str, values: Row)
    -> Result<Option<Row>, Self::Error>;

    /// Delete the record whose primary key equals `id`. `true` if a row was removed.
    async fn delete(&self, resource: &str, id: &str) -> Result<bool, Self::Error>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn last_page_rounds_up() {
        let page: Page<u8> = Page {
            items: Vec::new(),
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.last_page(), 3);
    }

    #[test]
    fn empty_result_has_one_page() {
        let plan = QueryPlan {
            predicates: Vec::new(),
            sort: None,
            page_size: 20,
            page: 1,
        };
        let page: Page<Row> = Page::empty(&plan);
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.map(|r| r.len()).items.len(), 0);
    }
}
