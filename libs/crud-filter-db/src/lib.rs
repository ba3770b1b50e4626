#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `SeaORM` execution of compiled list plans.
//!
//! [`SeaQueryExecutor`] implements [`crud_filter::QueryExecutor`] for tables
//! described by a [`TableBinding`]. Predicates become `sea_query` conditions
//! (see [`condition`]), relation predicates become correlated `EXISTS`
//! subqueries over a [`RelationLink`].
//!
//! Backends are selected with the `sqlite`, `pg` and `mysql` features.

pub mod binding;
pub mod condition;
pub mod error;
pub mod executor;
pub mod statement;

pub use binding::{RelationLink, TableBinding};
pub use condition::build_plan_condition;
pub use error::DbFilterError;
pub use executor::SeaQueryExecutor;
