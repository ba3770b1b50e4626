use std::sync::Arc;

use crud_filter::{FilterCompiler, ListRequest, Page, QueryExecutor, ResourceType, Row};
use http::Method;
use tracing::instrument;

use super::error::DomainError;
use super::permission::{PermissionChecker, required_permission};
use super::registry::ResourceRegistry;
use crate::config::CrudConfig;

/// Generic CRUD operations over the resources of a [`ResourceRegistry`].
///
/// Listing compiles the request with a [`FilterCompiler`] and hands the plan
/// to the executor. Single-record operations pass straight through.
pub struct CrudService<X: QueryExecutor> {
    registry: Arc<ResourceRegistry>,
    compiler: FilterCompiler,
    executor: Arc<X>,
    config: CrudConfig,
}

impl<X: QueryExecutor> CrudService<X> {
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>, executor: Arc<X>, config: CrudConfig) -> Self {
        let compiler = FilterCompiler::new(registry.clone(), config.filter.clone());
        Self {
            registry,
            compiler,
            executor,
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Check that the caller may perform `method` on `path`.
    ///
    /// # Errors
    ///
    /// [`DomainError::Forbidden`] if the checker denies the permission.
    pub async fn authorize(
        &self,
        checker: &dyn PermissionChecker,
        method: &Method,
        path: &str,
    ) -> Result<(), DomainError> {
        if !self.config.enforce_permissions {
            return Ok(());
        }
        let Some(permission) = required_permission(method, path) else {
            return Ok(());
        };
        if checker.has_permission(&permission).await {
            Ok(())
        } else {
            tracing::debug!(permission = %permission, "permission denied");
            Err(DomainError::Forbidden {
                permission: permission.to_string(),
            })
        }
    }

    /// One page of `resource`, filtered, sorted and paginated by `request`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for an undecodable filter
    /// - [`DomainError::Configuration`] if the resource is not filterable
    /// - [`DomainError::UnknownResource`] / [`DomainError::Database`]
    #[instrument(skip(self, request))]
    pub async fn list(&self, resource: &str, request: &ListRequest) -> Result<Page<Row>, DomainError> {
        let plan = self.compiler.compile(resource, request)?;
        tracing::debug!(
            predicates = plan.predicates.len(),
            page = plan.page,
            page_size = plan.page_size,
            "list plan compiled"
        );
        self.executor
            .fetch_page(resource, &plan)
            .await
            .map_err(DomainError::database)
    }

    /// # Errors
    ///
    /// [`DomainError::NotFound`] if no record has the id.
    #[instrument(skip(self))]
    pub async fn get(&self, resource: &str, id: &str) -> Result<Row, DomainError> {
        self.resource(resource)?;
        self.executor
            .fetch_one(resource, id)
            .await
            .map_err(DomainError::database)?
            .ok_or_else(|| DomainError::not_found(resource, id))
    }

    /// Create a record. Keys that are not columns of the resource are dropped.
    ///
    /// # Errors
    ///
    /// [`DomainError::Validation`] if nothing is left to store.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, resource: &str, payload: Row) -> Result<Row, DomainError> {
        let payload = self.known_columns(resource, payload)?;
        if payload.is_empty() {
            return Err(DomainError::validation("body", "no known columns in payload"));
        }
        let row = self
            .executor
            .insert(resource, payload)
            .await
            .map_err(DomainError::database)?;
        tracing::info!("record created");
        Ok(row)
    }

    /// Update a record. Keys that are not columns of the resource are dropped.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] if no record has the id.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, resource: &str, id: &str, payload: Row) -> Result<Row, DomainError> {
        let payload = self.known_columns(resource, payload)?;
        self.executor
            .update(resource, id, payload)
            .await
            .map_err(DomainError::database)?
            .ok_or_else(|| DomainError::not_found(resource, id))
    }

    /// # Errors
    ///
    /// [`DomainError::NotFound`] if no record has the id.
    #[instrument(skip(self))]
    pub async fn delete(&self, resource: &str, id: &str) -> Result<(), DomainError> {
        self.resource(resource)?;
        let removed = self
            .executor
            .delete(resource, id)
            .await
            .map_err(DomainError::database)?;
        if removed {
            tracing::info!("record deleted");
            Ok(())
        } else {
            Err(DomainError::not_found(resource, id))
        }
    }

    fn resource(&self, name: &str) -> Result<&ResourceType, DomainError> {
        self.registry
            .get(name)
            .ok_or_else(|| DomainError::UnknownResource {
                resource: name.to_owned(),
            })
    }

    fn known_columns(&self, resource: &str, mut payload: Row) -> Result<Row, DomainError> {
        if let Some(schema) = self.resource(resource)?.schema {
            payload.retain(|key, _| {
                let known = schema.has_column(key);
                if !known {
                    tracing::debug!(column = %key, "unknown payload key dropped");
                }
                known
            });
        }
        Ok(payload)
    }
}
