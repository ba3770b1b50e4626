//! Resource descriptors and the filter capability.
//!
//! A [`ResourceSchema`] is the static description of a queryable entity: its
//! columns, its primary key and the columns eligible for free-text search.
//! A [`ResourceType`] pairs a resource name with an *optional* schema; the
//! schema is the filter capability. Resources registered without one are
//! rejected by the compiler before any predicate is built.

use std::collections::HashSet;

/// Well-known column names the compiler treats specially.
pub mod columns {
    /// Timestamp column used as the default sort key and for
    /// `created_date_from` / `created_date_to` filters.
    pub const CREATED_AT: &str = "created_at";

    /// Status column filtered by comma-separated membership.
    pub const STATUS: &str = "status";
}

/// Immutable descriptor of a queryable entity.
///
/// Designed to be declared as a `const`:
///
/// ```
/// use crud_filter::ResourceSchema;
///
/// const CUSTOMER: ResourceSchema = ResourceSchema {
///     columns: &["id", "name", "email", "status", "created_at"],
///     primary_key: "id",
///     searchable: &["name", "email"],
/// };
/// assert!(CUSTOMER.has_column("email"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Column names in table order. Must be unique.
    pub columns: &'static [&'static str],
    /// Primary-key column targeted by the `id` filter key.
    pub primary_key: &'static str,
    /// Columns matched by the reserved `search` key. Empty disables search.
    pub searchable: &'static [&'static str],
}

impl ResourceSchema {
    /// Whether `column` is one of the schema's columns.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    /// Whether free-text search is enabled for this resource.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        !self.searchable.is_empty()
    }

    /// Check the structural invariants of the descriptor.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateColumn`] if a column is listed twice
    /// - [`SchemaError::UnknownSearchColumn`] if a searchable column is not a column
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in self.columns {
            if !seen.insert(*column) {
                return Err(SchemaError::DuplicateColumn {
                    column: (*column).to_owned(),
                });
            }
        }

        if let Some(missing) = self.searchable.iter().find(|c| !seen.contains(*c)) {
            return Err(SchemaError::UnknownSearchColumn {
                column: (*missing).to_owned(),
            });
        }

        Ok(())
    }
}

/// Structural problems in a [`ResourceSchema`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("column '{column}' is declared more than once")]
    DuplicateColumn { column: String },

    #[error("searchable column '{column}' is not a column of the resource")]
    UnknownSearchColumn { column: String },
}

/// Explicit filter capability for an entity type.
///
/// Implemented by entity types that can be listed through the filter
/// compiler. Resolved once, when the type is registered.
pub trait Filterable {
    /// Resource name used in routes and permissions (e.g. `"customers"`).
    const RESOURCE: &'static str;

    /// Static schema of the resource.
    const SCHEMA: ResourceSchema;
}

/// A named resource and its (optional) filter capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    /// Resource name (e.g. `"customers"`).
    pub name: &'static str,
    /// Filter capability. `None` means the resource cannot be listed with filters.
    pub schema: Option<ResourceSchema>,
}

impl ResourceType {
    /// Descriptor for a type implementing [`Filterable`].
    #[must_use]
    pub const fn filterable<T: Filterable>() -> Self {
        Self {
            name: T::RESOURCE,
            schema: Some(T::SCHEMA),
        }
    }

    /// Descriptor for a resource without the filter capability.
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self { name, schema: None }
    }
}

/// Supplies resource descriptors by name.
///
/// The compiler asks the provider once per compile and never caches the answer.
pub trait SchemaProvider: Send + Sync {
    /// Look up a resource by name. `None` if the resource is not registered.
    fn resource(&self, name: &str) -> Option<ResourceType>;
}
