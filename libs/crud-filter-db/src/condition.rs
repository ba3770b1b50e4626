//! Translation of compiled predicates into `SeaORM` conditions.
//!
//! # Semantics
//!
//! - Plan predicates are AND-ed
//! - `AnyOf` groups are OR-ed and nested as one condition
//! - `Like` is case-insensitive: both sides are lower-cased
//! - `Related` becomes a correlated `EXISTS` over the linked table
//! - Relations without a registered [`RelationLink`](crate::RelationLink) are
//!   skipped, like unknown filter keys
//!
//! Date components use backend specific SQL since none of the backends agree
//! on a portable spelling.

use crud_filter::{CompareOp, DatePart, Predicate, QueryPlan};
use sea_orm::DbBackend;
use sea_orm::sea_query::{Alias, Condition, Expr, Func, Query, SimpleExpr};

use crate::binding::TableBinding;

/// `table.column` as an expression.
pub(crate) fn column(table: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// Build the `WHERE` condition for a plan against a table binding.
#[must_use]
pub fn build_plan_condition(backend: DbBackend, binding: &TableBinding, plan: &QueryPlan) -> Condition {
    let mut cond = Condition::all();
    for predicate in &plan.predicates {
        if let Some(expr) = predicate_condition(backend, binding, binding.table, predicate) {
            cond = cond.add(expr);
        }
    }
    cond
}

fn predicate_condition(
    backend: DbBackend,
    binding: &TableBinding,
    table: &str,
    predicate: &Predicate,
) -> Option<Condition> {
    let expr = match predicate {
        Predicate::Compare { column: c, op, value } => compare(column(table, c), *op, value.clone()),
        Predicate::In { column: c, values } => column(table, c).is_in(values.iter().cloned()),
        Predicate::Between { column: c, low, high } => {
            column(table, c).between(low.clone(), high.clone())
        }
        Predicate::DatePart {
            column: c,
            part,
            op,
            value,
        } => date_part(backend, *part, *op, column(table, c).into(), value),
        Predicate::Like { column: c, pattern } => {
            Expr::expr(Func::lower(column(table, c))).like(pattern.to_lowercase())
        }
        Predicate::AnyOf { predicates } => {
            let mut any = Condition::any();
            for p in predicates {
                if let Some(inner) = predicate_condition(backend, binding, table, p) {
                    any = any.add(inner);
                }
            }
            return Some(any);
        }
        Predicate::Related {
            relation,
            predicate,
        } => {
            let Some(link) = binding.relation(relation) else {
                tracing::warn!(
                    table = binding.table,
                    relation = %relation,
                    "no relation link registered, filter skipped"
                );
                return None;
            };
            let inner = predicate_condition(backend, binding, link.table, predicate)?;
            let subquery = Query::select()
                .expr(Expr::val(1))
                .from(Alias::new(link.table))
                .and_where(
                    column(link.table, link.foreign_key)
                        .equals((Alias::new(binding.table), Alias::new(link.local_key))),
                )
                .cond_where(inner)
                .to_owned();
            Expr::exists(subquery)
        }
    };
    Some(Condition::all().add(expr))
}

fn compare(lhs: Expr, op: CompareOp, value: String) -> SimpleExpr {
    match op {
        CompareOp::Eq => lhs.eq(value),
        CompareOp::Ne => lhs.ne(value),
        CompareOp::Lt => lhs.lt(value),
        CompareOp::Le => lhs.lte(value),
        CompareOp::Gt => lhs.gt(value),
        CompareOp::Ge => lhs.gte(value),
        CompareOp::Like => lhs.like(value),
        CompareOp::NotLike => lhs.not_like(value),
    }
}

/// `<part>(col) <op> <part>(value)` spelled for the backend.
fn date_part(
    backend: DbBackend,
    part: DatePart,
    op: CompareOp,
    col: SimpleExpr,
    value: &str,
) -> SimpleExpr {
    let template = date_part_template(backend, part);
    let sql = format!("{} {} {}", template.0, op.as_sql(), template.1);
    Expr::cust_with_exprs(sql, [col, Expr::value(value.to_owned())])
}

/// Column side and value side of a date component comparison, written with
/// the placeholder syntax of each backend (`?` or `$n`).
fn date_part_template(backend: DbBackend, part: DatePart) -> (&'static str, &'static str) {
    match (backend, part) {
        (DbBackend::Sqlite, DatePart::Date) => ("date(?)", "date(?)"),
        (DbBackend::Sqlite, DatePart::Time) => ("time(?)", "time(?)"),
        (DbBackend::Sqlite, DatePart::Day) => {
            ("CAST(strftime('%d', ?) AS INTEGER)", "CAST(? AS INTEGER)")
        }
        (DbBackend::Sqlite, DatePart::Month) => {
            ("CAST(strftime('%m', ?) AS INTEGER)", "CAST(? AS INTEGER)")
        }
        (DbBackend::Sqlite, DatePart::Year) => {
            ("CAST(strftime('%Y', ?) AS INTEGER)", "CAST(? AS INTEGER)")
        }
        (DbBackend::Postgres, DatePart::Date) => ("CAST($1 AS DATE)", "CAST($2 AS DATE)"),
        (DbBackend::Postgres, DatePart::Time) => ("CAST($1 AS TIME)", "CAST($2 AS TIME)"),
        (DbBackend::Postgres, DatePart::Day) => ("EXTRACT(DAY FROM $1)", "CAST($2 AS INTEGER)"),
        (DbBackend::Postgres, DatePart::Month) => {
            ("EXTRACT(MONTH FROM $1)", "CAST($2 AS INTEGER)")
        }
        (DbBackend::Postgres, DatePart::Year) => ("EXTRACT(YEAR FROM $1)", "CAST($2 AS INTEGER)"),
        (DbBackend::MySql, DatePart::Date) => ("DATE(?)", "DATE(?)"),
        (DbBackend::MySql, DatePart::Time) => ("TIME(?)", "TIME(?)"),
        (DbBackend::MySql, DatePart::Day) => ("DAY(?)", "CAST(? AS SIGNED)"),
        (DbBackend::MySql, DatePart::Month) => ("MONTH(?)", "CAST(? AS SIGNED)"),
        (DbBackend::MySql, DatePart::Year) => ("YEAR(?)", "CAST(? AS SIGNED)"),
    }
}
