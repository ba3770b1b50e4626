use serde::{Deserialize, Serialize};

use crate::schema::columns;

/// Defaults applied while compiling list requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Page size used when `limit` is absent or invalid.
    pub default_page_size: u64,
    /// Upper bound for `limit`. Larger values are clamped. `None` disables the cap.
    pub max_page_size: Option<u64>,
    /// Sort column used when `sort` is absent or not a column.
    pub default_sort: String,
    /// Order used when `order` is absent.
    pub default_order: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: Some(1000),
            default_sort: columns::CREATED_AT.to_owned(),
            default_order: "desc".to_owned(),
        }
    }
}

impl FilterConfig {
    /// Resolve a requested page size against the defaults and the cap.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        let size = requested
            .filter(|n| *n > 0)
            .unwrap_or(self.default_page_size)
            .max(1);
        match self.max_page_size {
            Some(max) => size.min(max.max(1)),
            None => size,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn page_size_resolution() {
        let cfg = FilterConfig::default();
        assert_eq!(cfg.page_size(None), 20);
        assert_eq!(cfg.page_size(Some(0)), 20);
        assert_eq!(cfg.page_size(Some(75)), 75);
        assert_eq!(cfg.page_size(Some(50_000)), 1000);
    }

    #[test]
    fn uncapped_page_size() {
        let cfg = FilterConfig {
            max_page_size: None,
            ..FilterConfig::default()
        };
        assert_eq!(cfg.page_size(Some(50_000)), 50_000);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: FilterConfig = serde_json::from_str(r#"{"default_page_size": 50}"#).unwrap();
        assert_eq!(cfg.default_page_size, 50);
        assert_eq!(cfg.default_sort, "created_at");
    }

    #[test]
    fn unknown_fields_rejected() {
        let res: Result<FilterConfig, _> = serde_json::from_str(r#"{"page_sz": 50}"#);
        assert!(res.is_err());
    }
}
