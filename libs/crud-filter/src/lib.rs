#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! CRUD list filtering.
//!
//! This crate turns the list parameters of a generic CRUD endpoint
//! (`filter`, `sort`, `order`, `limit`, `page`) into a [`QueryPlan`]:
//!
//! - [`FilterCompiler`] - compiles a [`ListRequest`] for a named resource
//! - [`ResourceSchema`], [`ResourceType`], [`Filterable`] - resource descriptors
//!   and the explicit filter capability
//! - [`SchemaProvider`] - lookup of resource descriptors
//! - [`QueryExecutor`] - contract for the data layer that runs plans
//!
//! ## Usage
//!
//! ```ignore
//! use crud_filter::{FilterCompiler, FilterConfig, ListRequest};
//!
//! let compiler = FilterCompiler::new(registry, FilterConfig::default());
//! let plan = compiler.compile("customers", &request)?;
//! let page = executor.fetch_page("customers", &plan).await?;
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod plan;
pub mod predicate;
pub mod request;
pub mod schema;
pub mod term;

pub use compiler::{FilterCompiler, compile_plan};
pub use config::FilterConfig;
pub use error::FilterError;
pub use executor::{Page, QueryExecutor, Row};
pub use plan::{QueryPlan, SortDir, SortSpec};
pub use predicate::{CompareOp, DatePart, Predicate};
pub use request::{ListRequest, RawFilter};
pub use schema::{Filterable, ResourceSchema, ResourceType, SchemaError, SchemaProvider};
pub use term::{FilterExpression, FilterTerm};
