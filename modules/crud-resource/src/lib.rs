#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Generic CRUD service.
//!
//! Resources are registered once in a [`ResourceRegistry`], which decides
//! their filter capability. [`CrudService`] lists them through the
//! `crud_filter` compiler and forwards single-record operations to a
//! [`QueryExecutor`](crud_filter::QueryExecutor), usually
//! [`SeaQueryExecutor`](crud_filter_db::SeaQueryExecutor).

pub mod config;
pub mod domain;

pub use config::CrudConfig;
pub use domain::error::{DomainError, RegistryError};
pub use domain::permission::{
    CrudAction, Permission, PermissionChecker, required_permission, resolve_resource_name,
};
pub use domain::registry::{ResourceRegistry, ResourceRegistryBuilder};
pub use domain::service::CrudService;

/// [`CrudService`] backed by a `SeaORM` connection.
pub type SqlCrudService = CrudService<crud_filter_db::SeaQueryExecutor>;
