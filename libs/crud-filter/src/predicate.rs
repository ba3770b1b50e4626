//! Query predicates produced by the filter compiler.
//!
//! Predicates are data-layer agnostic: they name columns and carry operands
//! as strings. Translating them to SQL is the job of the executor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl CompareOp {
    /// Parse a client-supplied operator (`=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`,
    /// `like`, `not like`). Case-insensitive for the word forms.
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "like" => Some(Self::Like),
            "not like" => Some(Self::NotLike),
            _ => None,
        }
    }

    /// SQL spelling of the operator.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Date/time component extracted from a column before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePart {
    Date,
    Time,
    Day,
    Month,
    Year,
}

impl DatePart {
    /// Parse a filter `function` name.
    #[must_use]
    pub fn from_function(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "day" => Some(Self::Day),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// A single query condition.
///
/// All predicates in a [`QueryPlan`](crate::QueryPlan) are `ANDed`.
/// [`Predicate::AnyOf`] groups alternatives that are `ORed` together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `column <op> value`
    Compare {
        column: String,
        op: CompareOp,
        value: String,
    },
    /// `column IN (values)`
    In { column: String, values: Vec<String> },
    /// `column BETWEEN low AND high` (inclusive)
    Between {
        column: String,
        low: String,
        high: String,
    },
    /// `<part>(column) <op> value`
    DatePart {
        column: String,
        part: DatePart,
        op: CompareOp,
        value: String,
    },
    /// Case-insensitive pattern match, `pattern` already contains wildcards.
    Like { column: String, pattern: String },
    /// Disjunction of the inner predicates.
    AnyOf { predicates: Vec<Predicate> },
    /// Records having at least one related entity (reached through
    /// `relation`) that matches `predicate`.
    Related {
        relation: String,
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// `column = value`
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column <op> value`
    #[must_use]
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<String>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `column IN (values)`
    #[must_use]
    pub fn r#in<V: Into<String>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Substring match: `column LIKE %needle%`.
    #[must_use]
    pub fn contains(column: impl Into<String>, needle: &str) -> Self {
        Self::Like {
            column: column.into(),
            pattern: format!("%{needle}%"),
        }
    }

    /// Scope `predicate` to a relation.
    #[must_use]
    pub fn related(relation: impl Into<String>, predicate: Self) -> Self {
        Self::Related {
            relation: relation.into(),
            predicate: Box::new(predicate),
        }
    }

    /// The column the predicate targets. `None` for groups.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Compare { column, .. }
            | Self::In { column, .. }
            | Self::Between { column, .. }
            | Self::DatePart { column, .. }
            | Self::Like { column, .. } => Some(column),
            Self::AnyOf { .. } => None,
            Self::Related { predicate, .. } => predicate.column(),
        }
    }
}
