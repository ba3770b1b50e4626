use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;

/// Sort direction understood by the executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// Parse a lower-cased `order` value. `None` for anything else.
    #[must_use]
    pub fn parse(order: &str) -> Option<Self> {
        match order {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Resolved ordering.
///
/// `order` is the client value lower-cased and otherwise unvalidated;
/// executors decide how to treat values other than `asc`/`desc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub order: String,
}

impl SortSpec {
    /// The direction, if `order` is `asc` or `desc`.
    #[must_use]
    pub fn direction(&self) -> Option<SortDir> {
        SortDir::parse(&self.order)
    }
}

/// Compiled, data-layer agnostic description of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Conditions, all `ANDed`, in filter insertion order.
    pub predicates: Vec<Predicate>,
    /// Ordering. `None` leaves the data layer's default order.
    pub sort: Option<SortSpec>,
    /// Rows per page (never zero).
    pub page_size: u64,
    /// 1-based page number.
    pub page: u64,
}

impl QueryPlan {
    /// Number of rows to skip for the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
