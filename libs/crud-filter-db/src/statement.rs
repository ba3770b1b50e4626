//! Statements for executing plans and single-record operations.

use crud_filter::{QueryPlan, Row, SortDir};
use sea_orm::DbBackend;
use sea_orm::sea_query::{
    Alias, Asterisk, DeleteStatement, Expr, InsertStatement, Order, Query, SelectStatement,
    SimpleExpr, UpdateStatement,
};
use serde_json::Value;

use crate::binding::TableBinding;
use crate::condition::{build_plan_condition, column};
use crate::error::DbFilterError;

/// Alias of the count column in [`build_count`].
pub const COUNT_ALIAS: &str = "num_items";

/// `SELECT * ... WHERE <plan> ORDER BY <sort> LIMIT/OFFSET <page>`.
#[must_use]
pub fn build_select(backend: DbBackend, binding: &TableBinding, plan: &QueryPlan) -> SelectStatement {
    let mut select = Query::select();
    select
        .column((Alias::new(binding.table), Asterisk))
        .from(Alias::new(binding.table));
    apply_plan_condition(&mut select, backend, binding, plan);

    if let Some(sort) = &plan.sort {
        let order = match sort.direction() {
            Some(SortDir::Asc) => Order::Asc,
            Some(SortDir::Desc) => Order::Desc,
            None => {
                tracing::warn!(order = %sort.order, "unknown sort order, using desc");
                Order::Desc
            }
        };
        select.order_by((Alias::new(binding.table), Alias::new(&sort.column)), order);
    }

    select.limit(plan.page_size).offset(plan.offset());
    select
}

/// `SELECT COUNT(*) AS num_items ... WHERE <plan>`.
#[must_use]
pub fn build_count(backend: DbBackend, binding: &TableBinding, plan: &QueryPlan) -> SelectStatement {
    let mut count = Query::select();
    count
        .expr_as(Expr::cust("COUNT(*)"), Alias::new(COUNT_ALIAS))
        .from(Alias::new(binding.table));
    apply_plan_condition(&mut count, backend, binding, plan);
    count
}

/// Add the plan's `WHERE` clause. Plans without conditions leave none.
fn apply_plan_condition(
    select: &mut SelectStatement,
    backend: DbBackend,
    binding: &TableBinding,
    plan: &QueryPlan,
) {
    let cond = build_plan_condition(backend, binding, plan);
    if !cond.is_empty() {
        select.cond_where(cond);
    }
}

/// `SELECT * ... WHERE <pk> = id`.
#[must_use]
pub fn build_find_by_id(binding: &TableBinding, id: &str) -> SelectStatement {
    Query::select()
        .column((Alias::new(binding.table), Asterisk))
        .from(Alias::new(binding.table))
        .and_where(primary_key_eq(binding, id))
        .limit(1)
        .to_owned()
}

/// `INSERT INTO ... (<known columns>) VALUES (...)`.
///
/// Keys that are not columns of the resource are dropped.
///
/// # Errors
///
/// [`DbFilterError::EmptyPayload`] if no key names a column.
pub fn build_insert(
    backend: DbBackend,
    binding: &TableBinding,
    values: &Row,
) -> Result<InsertStatement, DbFilterError> {
    let (columns, exprs): (Vec<Alias>, Vec<SimpleExpr>) = known_values(binding, values)
        .map(|(c, v)| (Alias::new(c), v))
        .unzip();
    if columns.is_empty() {
        return Err(DbFilterError::EmptyPayload {
            table: binding.table.to_owned(),
        });
    }

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(binding.table))
        .columns(columns)
        .values(exprs)
        .map_err(|e| DbFilterError::Statement(e.to_string()))?;
    if supports_returning(backend) {
        insert.returning_all();
    }
    Ok(insert)
}

/// `UPDATE ... SET <known columns> WHERE <pk> = id`.
///
/// Returns `None` when no key names a column.
#[must_use]
pub fn build_update(
    backend: DbBackend,
    binding: &TableBinding,
    id: &str,
    values: &Row,
) -> Option<UpdateStatement> {
    let sets: Vec<(Alias, SimpleExpr)> = known_values(binding, values)
        .filter(|(c, _)| *c != binding.schema.primary_key)
        .map(|(c, v)| (Alias::new(c), v))
        .collect();
    if sets.is_empty() {
        return None;
    }

    let mut update = Query::update();
    update
        .table(Alias::new(binding.table))
        .values(sets)
        .and_where(primary_key_eq(binding, id));
    if supports_returning(backend) {
        update.returning_all();
    }
    Some(update)
}

/// `DELETE FROM ... WHERE <pk> = id`.
#[must_use]
pub fn build_delete(binding: &TableBinding, id: &str) -> DeleteStatement {
    Query::delete()
        .from_table(Alias::new(binding.table))
        .and_where(primary_key_eq(binding, id))
        .to_owned()
}

/// Whether `INSERT/UPDATE ... RETURNING` is available.
#[must_use]
pub fn supports_returning(backend: DbBackend) -> bool {
    matches!(backend, DbBackend::Postgres | DbBackend::Sqlite)
}

fn primary_key_eq(binding: &TableBinding, id: &str) -> SimpleExpr {
    column(binding.table, binding.schema.primary_key).eq(id)
}

fn known_values<'a>(
    binding: &'a TableBinding,
    values: &'a Row,
) -> impl Iterator<Item = (&'a str, SimpleExpr)> + 'a {
    values.iter().filter_map(move |(key, value)| {
        if binding.schema.has_column(key) {
            Some((key.as_str(), json_to_expr(value)))
        } else {
            tracing::debug!(table = binding.table, column = %key, "unknown column dropped");
            None
        }
    })
}

/// Bind a JSON value. Arrays and objects are stored as their JSON text.
fn json_to_expr(value: &Value) -> SimpleExpr {
    match value {
        Value::Null => Expr::value(Option::<String>::None),
        Value::Bool(b) => Expr::value(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Expr::value(i)
            } else if let Some(u) = n.as_u64() {
                Expr::value(u)
            } else {
                Expr::value(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => Expr::value(s.clone()),
        Value::Array(_) | Value::Object(_) => Expr::value(value.to_string()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crud_filter::{Predicate, ResourceSchema, SortSpec};
    use sea_orm::sea_query::SqliteQueryBuilder;
    use serde_json::json;

    const TAGS: TableBinding = TableBinding::new(
        "tags",
        ResourceSchema {
            columns: &["id", "label", "created_at"],
            primary_key: "id",
            searchable: &["label"],
        },
    );

    fn plan(order: &str) -> QueryPlan {
        QueryPlan {
            predicates: vec![Predicate::contains("label", "ru")],
            sort: Some(SortSpec {
                column: "created_at".to_owned(),
                order: order.to_owned(),
            }),
            page_size: 10,
            page: 3,
        }
    }

    #[test]
    fn select_has_order_and_page_window() {
        let sql = build_select(DbBackend::Sqlite, &TAGS, &plan("asc")).to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"ORDER BY "tags"."created_at" ASC"#), "{sql}");
        assert!(sql.contains("LIMIT 10"), "{sql}");
        assert!(sql.contains("OFFSET 20"), "{sql}");
    }

    #[test]
    fn empty_plan_selects_every_row() {
        let empty = QueryPlan {
            predicates: Vec::new(),
            sort: None,
            page_size: 20,
            page: 1,
        };
        let select = build_select(DbBackend::Sqlite, &TAGS, &empty).to_string(SqliteQueryBuilder);
        assert!(!select.contains("WHERE"), "{select}");
        assert!(!select.contains("ORDER BY"), "{select}");
        let count = build_count(DbBackend::Sqlite, &TAGS, &empty).to_string(SqliteQueryBuilder);
        assert!(!count.contains("WHERE"), "{count}");
    }

    #[test]
    fn unknown_order_falls_back_to_desc() {
        let sql =
            build_select(DbBackend::Sqlite, &TAGS, &plan("sideways")).to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""tags"."created_at" DESC"#), "{sql}");
    }

    #[test]
    fn count_keeps_condition_without_window() {
        let sql = build_count(DbBackend::Sqlite, &TAGS, &plan("asc")).to_string(SqliteQueryBuilder);
        assert!(sql.contains("COUNT(*)"), "{sql}");
        assert!(sql.contains("LIKE '%ru%'"), "{sql}");
        assert!(!sql.contains("LIMIT"), "{sql}");
    }

    #[test]
    fn insert_drops_unknown_columns() {
        let row = json!({"label": "rust", "bogus": 1}).as_object().cloned().unwrap();
        let sql = build_insert(DbBackend::Sqlite, &TAGS, &row)
            .unwrap()
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"INSERT INTO "tags" ("label")"#), "{sql}");
        assert!(sql.contains("RETURNING"), "{sql}");
        assert!(!sql.contains("bogus"), "{sql}");
    }

    #[test]
    fn insert_without_columns_is_rejected() {
        let row = json!({"bogus": 1}).as_object().cloned().unwrap();
        assert!(matches!(
            build_insert(DbBackend::Sqlite, &TAGS, &row),
            Err(DbFilterError::EmptyPayload { .. })
        ));
    }

    #[test]
    fn update_never_sets_primary_key() {
        let row = json!({"id": "9", "label": "go"}).as_object().cloned().unwrap();
        let sql = build_update(DbBackend::MySql, &TAGS, "1", &row)
            .unwrap()
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"SET "label" = 'go'"#), "{sql}");
        assert!(!sql.contains("RETURNING"), "{sql}");

        let only_pk = json!({"id": "9"}).as_object().cloned().unwrap();
        assert!(build_update(DbBackend::Sqlite, &TAGS, "1", &only_pk).is_none());
    }
}
