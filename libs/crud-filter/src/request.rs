//! Wire shape of a list request and helpers to edit its filter.
//!
//! Field names (`filter`, `sort`, `order`, `limit`, `page`) are the public
//! contract with existing clients.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::FilterError;

/// The `filter` parameter as received.
///
/// Query strings carry it JSON-encoded; JSON bodies may carry an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFilter {
    Encoded(String),
    Decoded(Map<String, Value>),
    Other(Value),
}

/// Normalized list request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RawFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<u64>,
}

/// Accept integers and numeric strings. Anything else reads as absent.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl ListRequest {
    /// Request with a filter object and defaults for everything else.
    #[must_use]
    pub fn with_filter(filter: Value) -> Self {
        Self {
            filter: Some(match filter {
                Value::Object(map) => RawFilter::Decoded(map),
                Value::String(s) => RawFilter::Encoded(s),
                other => RawFilter::Other(other),
            }),
            ..Self::default()
        }
    }

    /// Decode the filter into a field-key mapping.
    ///
    /// A missing filter, an empty string, `null` and `[]` all decode to an
    /// empty mapping.
    ///
    /// # Errors
    ///
    /// - [`FilterError::MalformedFilter`] if an encoded filter is not valid JSON
    /// - [`FilterError::FilterNotAnObject`] if it decodes to a non-object
    pub fn parsed_filter(&self) -> Result<Map<String, Value>, FilterError> {
        match &self.filter {
            None => Ok(Map::new()),
            Some(RawFilter::Encoded(s)) if s.trim().is_empty() => Ok(Map::new()),
            Some(RawFilter::Encoded(s)) => object_or_empty(serde_json::from_str(s)?),
            Some(RawFilter::Decoded(map)) => Ok(map.clone()),
            Some(RawFilter::Other(v)) => object_or_empty(v.clone()),
        }
    }

    /// Look up a filter entry by key, falling back to a dotted path into
    /// nested objects (`"owner.name"`).
    ///
    /// # Errors
    ///
    /// Same as [`ListRequest::parsed_filter`].
    pub fn filter_value(&self, path: &str) -> Result<Option<Value>, FilterError> {
        let filters = self.parsed_filter()?;
        if let Some(v) = filters.get(path) {
            return Ok(Some(v.clone()));
        }

        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Ok(None);
        };
        let mut current = filters.get(first);
        for segment in segments {
            current = current.and_then(|v| v.get(segment));
        }
        Ok(current.cloned())
    }

    /// Set a filter entry, replacing any previous value under `key`.
    ///
    /// The filter is re-encoded as a JSON string; other request fields are kept.
    ///
    /// # Errors
    ///
    /// Same as [`ListRequest::parsed_filter`].
    pub fn add_filter(&mut self, key: impl Into<String>, value: Value) -> Result<(), FilterError> {
        let mut filters = self.parsed_filter()?;
        filters.insert(key.into(), value);
        self.filter = Some(RawFilter::Encoded(serde_json::to_string(&filters)?));
        Ok(())
    }

    /// Remove a filter entry and return its previous value.
    ///
    /// # Errors
    ///
    /// Same as [`ListRequest::parsed_filter`].
    pub fn remove_filter(&mut self, key: &str) -> Result<Option<Value>, FilterError> {
        let filters = self.parsed_filter()?;
        let removed = filters.get(key).cloned();
        if removed.is_some() {
            let kept: Map<String, Value> = filters.into_iter().filter(|(k, _)| k != key).collect();
            self.filter = Some(RawFilter::Encoded(serde_json::to_string(&kept)?));
        }
        Ok(removed)
    }
}

fn object_or_empty(value: Value) -> Result<Map<String, Value>, FilterError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        _ => Err(FilterError::FilterNotAnObject),
    }
}
