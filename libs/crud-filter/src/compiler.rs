//! Filter compiler.
//!
//! Compiles a [`ListRequest`] against a [`ResourceSchema`] into a
//! [`QueryPlan`]. The compiler is pure: it performs no I/O and keeps no state
//! between calls.
//!
//! ## Resolution order (per filter key, in insertion order)
//!
//! | key / term | Result |
//! |------------|--------|
//! | `relation.column` + literal | related `column = value` |
//! | `relation.column` + `{"operator": "in"}` | related `column IN (split value)` |
//! | `relation.column` + `{"operator": op}` | related `column <op> value` (`op` defaults to `=`) |
//! | `{"function": date\|time\|day\|month\|year}` | component of `key` `=` value |
//! | `{"function": "in"}` | `key IN (split value)` |
//! | `{"function": "between"}` | `key BETWEEN a AND b` when exactly two bounds |
//! | `id` | primary key `IN (split value)` |
//! | `created_date_from` / `created_date_to` | `date(created_at) >=` / `<=` value, if the column exists |
//! | `status` | `status IN (split value)`, if the column exists |
//! | any column | `key = value` |
//! | anything else | ignored |
//!
//! The reserved `search` key goes through the table like any other key, so a
//! `search` column also gets an equality match. It then adds a substring match
//! over the searchable columns (an OR group when there are several).
//!
//! Sorting uses the requested column when the schema has it, else
//! `FilterConfig::default_sort`. A schema without either gets no sort.

use std::sync::Arc;

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::plan::{QueryPlan, SortSpec};
use crate::predicate::{CompareOp, DatePart, Predicate};
use crate::request::ListRequest;
use crate::schema::{ResourceSchema, ResourceType, SchemaProvider, columns};
use crate::term::{FilterExpression, FilterTerm, split_list, split_relation_key};

/// Filter keys with dedicated semantics.
pub mod keys {
    pub const ID: &str = "id";
    pub const CREATED_DATE_FROM: &str = "created_date_from";
    pub const CREATED_DATE_TO: &str = "created_date_to";
    pub const STATUS: &str = "status";
    pub const SEARCH: &str = crate::term::SEARCH_KEY;
}

/// Compiles list requests for the resources known to a [`SchemaProvider`].
///
/// Constructed once and shared; every call is independent.
#[derive(Clone)]
pub struct FilterCompiler {
    provider: Arc<dyn SchemaProvider>,
    config: FilterConfig,
}

impl FilterCompiler {
    #[must_use]
    pub fn new(provider: Arc<dyn SchemaProvider>, config: FilterConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Compile a request for the named resource.
    ///
    /// # Errors
    ///
    /// - [`FilterError::UnknownResource`] if the provider has no such resource
    /// - [`FilterError::Schema`] if the resource lacks the filter capability
    /// - [`FilterError::MalformedFilter`] / [`FilterError::FilterNotAnObject`]
    ///   if the filter cannot be decoded
    #[tracing::instrument(skip(self, request))]
    pub fn compile(&self, resource: &str, request: &ListRequest) -> Result<QueryPlan, FilterError> {
        let resource_type =
            self.provider
                .resource(resource)
                .ok_or_else(|| FilterError::UnknownResource {
                    resource: resource.to_owned(),
                })?;
        self.compile_resource(&resource_type, request)
    }

    /// Compile a request for an already resolved resource type.
    ///
    /// # Errors
    ///
    /// Same as [`FilterCompiler::compile`], minus `UnknownResource`.
    pub fn compile_resource(
        &self,
        resource: &ResourceType,
        request: &ListRequest,
    ) -> Result<QueryPlan, FilterError> {
        let Some(schema) = resource.schema else {
            tracing::error!(
                resource = resource.name,
                "resource is not filterable, check its registration"
            );
            return Err(FilterError::Schema {
                resource: resource.name.to_owned(),
            });
        };
        compile_plan(&schema, request, &self.config)
    }
}

/// Compile `request` against `schema`.
///
/// # Errors
///
/// [`FilterError::MalformedFilter`] / [`FilterError::FilterNotAnObject`] if
/// the filter cannot be decoded.
pub fn compile_plan(
    schema: &ResourceSchema,
    request: &ListRequest,
    config: &FilterConfig,
) -> Result<QueryPlan, FilterError> {
    let filters = request.parsed_filter()?;
    let expression = FilterExpression::from_map(&filters);

    let mut predicates = Vec::with_capacity(expression.len() + 1);
    for (key, term) in expression.iter() {
        match resolve_term(schema, key, term) {
            Some(p) => predicates.push(p),
            None => tracing::debug!(field = key, "filter key ignored"),
        }
    }

    if let Some(p) = search_predicate(schema, &expression) {
        predicates.push(p);
    }

    let plan = QueryPlan {
        predicates,
        sort: resolve_sort(schema, request, config),
        page_size: config.page_size(request.limit),
        page: request.page.filter(|p| *p > 0).unwrap_or(1),
    };
    tracing::trace!(predicates = plan.predicates.len(), "compiled list request");
    Ok(plan)
}

fn resolve_term(schema: &ResourceSchema, key: &str, term: &FilterTerm) -> Option<Predicate> {
    if let Some((relation, column)) = split_relation_key(key) {
        return relation_predicate(column, term).map(|p| Predicate::related(relation, p));
    }

    match term {
        FilterTerm::Function { name, value } => function_predicate(key, name, value),
        FilterTerm::Literal(value) => literal_predicate(schema, key, value),
        FilterTerm::Operator { .. } | FilterTerm::Unsupported => None,
    }
}

fn relation_predicate(column: &str, term: &FilterTerm) -> Option<Predicate> {
    match term {
        FilterTerm::Literal(value) => Some(Predicate::eq(column, value.as_str())),
        FilterTerm::Operator { op, value } if op == "in" => {
            Some(Predicate::r#in(column, split_list(value)))
        }
        FilterTerm::Operator { op, value } => {
            let Some(op) = CompareOp::parse(op) else {
                tracing::debug!(column, operator = %op, "unsupported relation operator");
                return None;
            };
            Some(Predicate::compare(column, op, value.as_str()))
        }
        // No operator given: compare with the default `=`.
        FilterTerm::Function { value, .. } => Some(Predicate::eq(column, value.as_str())),
        FilterTerm::Unsupported => None,
    }
}

fn function_predicate(column: &str, name: &str, value: &str) -> Option<Predicate> {
    if let Some(part) = DatePart::from_function(name) {
        return Some(Predicate::DatePart {
            column: column.to_owned(),
            part,
            op: CompareOp::Eq,
            value: value.to_owned(),
        });
    }

    match name {
        "in" => Some(Predicate::r#in(column, split_list(value))),
        "between" => {
            let bounds = split_list(value);
            if let [low, high] = bounds.as_slice() {
                Some(Predicate::Between {
                    column: column.to_owned(),
                    low: low.clone(),
                    high: high.clone(),
                })
            } else {
                tracing::debug!(column, bounds = bounds.len(), "between needs two bounds");
                None
            }
        }
        _ => None,
    }
}

fn literal_predicate(schema: &ResourceSchema, key: &str, value: &str) -> Option<Predicate> {
    match key {
        keys::ID => Some(Predicate::r#in(schema.primary_key, split_list(value))),
        keys::CREATED_DATE_FROM => created_date(schema, CompareOp::Ge, value),
        keys::CREATED_DATE_TO => created_date(schema, CompareOp::Le, value),
        keys::STATUS if schema.has_column(columns::STATUS) => {
            Some(Predicate::r#in(columns::STATUS, split_list(value)))
        }
        keys::STATUS => None,
        column if schema.has_column(column) => Some(Predicate::eq(column, value)),
        _ => None,
    }
}

fn created_date(schema: &ResourceSchema, op: CompareOp, value: &str) -> Option<Predicate> {
    schema
        .has_column(columns::CREATED_AT)
        .then(|| Predicate::DatePart {
            column: columns::CREATED_AT.to_owned(),
            part: DatePart::Date,
            op,
            value: value.to_owned(),
        })
}

fn search_predicate(schema: &ResourceSchema, expression: &FilterExpression) -> Option<Predicate> {
    let needle = expression.search().filter(|s| !s.is_empty())?;
    match schema.searchable {
        [] => None,
        [column] => Some(Predicate::contains(*column, needle)),
        many => Some(Predicate::AnyOf {
            predicates: many
                .iter()
                .map(|column| Predicate::contains(*column, needle))
                .collect(),
        }),
    }
}

/// Requested column if known, else the configured default. `None` when the
/// default is not a column of the schema either.
fn resolve_sort(
    schema: &ResourceSchema,
    request: &ListRequest,
    config: &FilterConfig,
) -> Option<SortSpec> {
    let column = request
        .sort
        .as_deref()
        .filter(|s| schema.has_column(s))
        .or_else(|| {
            schema
                .has_column(&config.default_sort)
                .then_some(config.default_sort.as_str())
        });
    let Some(column) = column else {
        tracing::debug!(default_sort = %config.default_sort, "default sort column not in schema");
        return None;
    };
    let order = request
        .order
        .as_deref()
        .unwrap_or(config.default_order.as_str())
        .to_lowercase();
    Some(SortSpec {
        column: column.to_owned(),
        order,
    })
}
