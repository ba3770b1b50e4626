//! The filter language: field keys mapped to terms.

use serde_json::{Map, Value};

/// Reserved key holding the free-text search string.
pub const SEARCH_KEY: &str = "search";

/// One interpreted filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// A bare scalar: `"status": "active,pending"`.
    Literal(String),
    /// `{"operator": "<op>", "value": "<v>"}`. `op` defaults to `=`.
    Operator { op: String, value: String },
    /// `{"function": "<fn>", "value": "<v>"}`.
    Function { name: String, value: String },
    /// Any shape the language does not define (null, arrays, other objects).
    Unsupported,
}

impl FilterTerm {
    /// Interpret a raw JSON value.
    #[must_use]
    pub fn from_json(raw: &Value) -> Self {
        if let Some(s) = scalar_text(raw) {
            return Self::Literal(s);
        }
        let Value::Object(obj) = raw else {
            return Self::Unsupported;
        };

        let value = obj.get("value").and_then(scalar_text).unwrap_or_default();

        if let Some(function) = obj.get("function") {
            return match scalar_text(function) {
                Some(name) => Self::Function { name, value },
                None => Self::Unsupported,
            };
        }

        if obj.contains_key("operator") || obj.contains_key("value") {
            let op = obj
                .get("operator")
                .and_then(scalar_text)
                .unwrap_or_else(|| "=".to_owned());
            return Self::Operator { op, value };
        }

        Self::Unsupported
    }
}

/// Text of a JSON scalar. Numbers keep their decimal spelling.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Ordered mapping from field key to [`FilterTerm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    entries: Vec<(String, FilterTerm)>,
}

impl FilterExpression {
    /// Interpret every entry of a decoded filter object, keeping its order.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(k, v)| (k.clone(), FilterTerm::from_json(v)))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(field key, term)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterTerm)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t))
    }

    /// The term stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterTerm> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    /// The free-text search string, if one was given as a literal.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        match self.get(SEARCH_KEY) {
            Some(FilterTerm::Literal(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Split a field key at its last `.` into `(relation path, column)`.
#[must_use]
pub fn split_relation_key(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once('.')
}

/// Split a comma separated operand verbatim. Items are not trimmed.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_owned).collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn expr(v: &Value) -> FilterExpression {
        FilterExpression::from_map(v.as_object().unwrap())
    }

    #[test]
    fn scalars_become_literals() {
        let e = expr(&json!({"name": "acme", "age": 42, "vip": true}));
        assert_eq!(e.get("name"), Some(&FilterTerm::Literal("acme".to_owned())));
        assert_eq!(e.get("age"), Some(&FilterTerm::Literal("42".to_owned())));
        assert_eq!(e.get("vip"), Some(&FilterTerm::Literal("true".to_owned())));
    }

    #[test]
    fn function_objects() {
        let e = expr(&json!({"time_in": {"function": "month", "value": "04"}}));
        assert_eq!(
            e.get("time_in"),
            Some(&FilterTerm::Function {
                name: "month".to_owned(),
                value: "04".to_owned()
            })
        );
    }

    #[test]
    fn operator_defaults_to_equality() {
        let e = expr(&json!({"schedules.schedule_id": {"value": "01gy9d4r"}}));
        assert_eq!(
            e.get("schedules.schedule_id"),
            Some(&FilterTerm::Operator {
                op: "=".to_owned(),
                value: "01gy9d4r".to_owned()
            })
        );
    }

    #[test]
    fn unsupported_shapes() {
        let e = expr(&json!({"a": null, "b": [1, 2], "c": {"foo": "bar"}}));
        assert!(e.iter().all(|(_, t)| *t == FilterTerm::Unsupported));
    }

    #[test]
    fn insertion_order_is_kept() {
        let e = expr(&json!({"zeta": "1", "alpha": "2", "mid": "3"}));
        let keys: Vec<&str> = e.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn relation_key_splits_at_last_dot() {
        assert_eq!(
            split_relation_key("orders.items.sku"),
            Some(("orders.items", "sku"))
        );
        assert_eq!(split_relation_key("sku"), None);
    }

    #[test]
    fn list_split_is_verbatim() {
        assert_eq!(split_list("a, b,,c"), ["a", " b", "", "c"]);
    }

    #[test]
    fn search_requires_literal() {
        assert_eq!(expr(&json!({"search": "acme"})).search(), Some("acme"));
        assert_eq!(
            expr(&json!({"search": {"function": "in", "value": "x"}})).search(),
            None
        );
    }
}
