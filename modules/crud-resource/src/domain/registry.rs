//! Registration of CRUD resources.
//!
//! The filter capability of each resource is decided here, once: types
//! implementing [`Filterable`] are registered with their schema, everything
//! else is registered as plain.

use std::collections::HashMap;

use crud_filter::{Filterable, ResourceType, SchemaProvider};

use super::error::RegistryError;

/// Resources known to the CRUD layer.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<&'static str, ResourceType>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.resources.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Registered resource names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl SchemaProvider for ResourceRegistry {
    fn resource(&self, name: &str) -> Option<ResourceType> {
        self.resources.get(name).copied()
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistryBuilder {
    entries: Vec<ResourceType>,
}

impl ResourceRegistryBuilder {
    /// Register a type with the filter capability.
    #[must_use]
    pub fn filterable<T: Filterable>(mut self) -> Self {
        self.entries.push(ResourceType::filterable::<T>());
        self
    }

    /// Register a resource that supports CRUD but not filtered listing.
    #[must_use]
    pub fn plain(mut self, name: &'static str) -> Self {
        self.entries.push(ResourceType::plain(name));
        self
    }

    /// Validate schemas and build the registry.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Duplicate`] if a name is registered twice
    /// - [`RegistryError::InvalidSchema`] if a schema fails validation
    pub fn build(self) -> Result<ResourceRegistry, RegistryError> {
        let mut resources = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            if let Some(schema) = &entry.schema {
                schema
                    .validate()
                    .map_err(|source| RegistryError::InvalidSchema {
                        resource: entry.name.to_owned(),
                        source,
                    })?;
            }
            if resources.insert(entry.name, entry).is_some() {
                return Err(RegistryError::Duplicate {
                    resource: entry.name.to_owned(),
                });
            }
        }
        tracing::debug!(count = resources.len(), "resource registry built");
        Ok(ResourceRegistry { resources })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crud_filter::{ResourceSchema, SchemaError};

    struct Customer;

    impl Filterable for Customer {
        const RESOURCE: &'static str = "customers";
        const SCHEMA: ResourceSchema = ResourceSchema {
            columns: &["id", "name", "created_at"],
            primary_key: "id",
            searchable: &["name"],
        };
    }

    struct Broken;

    impl Filterable for Broken {
        const RESOURCE: &'static str = "broken";
        const SCHEMA: ResourceSchema = ResourceSchema {
            columns: &["id"],
            primary_key: "id",
            searchable: &["name"],
        };
    }

    #[test]
    fn capability_is_resolved_at_registration() {
        let registry = ResourceRegistry::builder()
            .filterable::<Customer>()
            .plain("device_tokens")
            .build()
            .unwrap();

        assert!(registry.resource("customers").unwrap().schema.is_some());
        assert!(registry.resource("device_tokens").unwrap().schema.is_none());
        assert!(registry.resource("orders").is_none());
        assert_eq!(registry.names(), vec!["customers", "device_tokens"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ResourceRegistry::builder()
            .filterable::<Customer>()
            .plain("customers")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                resource: "customers".to_owned()
            }
        );
    }

    #[test]
    fn invalid_schema_is_rejected() {
        let err = ResourceRegistry::builder()
            .filterable::<Broken>()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidSchema {
                source: SchemaError::UnknownSearchColumn { .. },
                ..
            }
        ));
    }
}
