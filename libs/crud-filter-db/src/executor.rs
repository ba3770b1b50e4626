use std::collections::HashMap;

use async_trait::async_trait;
use crud_filter::{Page, QueryExecutor, QueryPlan, Row};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use serde_json::Value;

use crate::binding::TableBinding;
use crate::error::DbFilterError;
use crate::statement::{
    COUNT_ALIAS, build_count, build_delete, build_find_by_id, build_insert, build_select,
    build_update, supports_returning,
};

/// [`QueryExecutor`] over a `SeaORM` connection.
///
/// Resources are mapped to tables with [`with_table`](Self::with_table).
/// Records come back as JSON objects keyed by column name.
pub struct SeaQueryExecutor {
    db: DatabaseConnection,
    tables: HashMap<String, TableBinding>,
}

impl SeaQueryExecutor {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tables: HashMap::new(),
        }
    }

    /// Bind a resource name to a table.
    #[must_use]
    pub fn with_table(mut self, resource: impl Into<String>, binding: TableBinding) -> Self {
        self.tables.insert(resource.into(), binding);
        self
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    fn binding(&self, resource: &str) -> Result<&TableBinding, DbFilterError> {
        self.tables
            .get(resource)
            .ok_or_else(|| DbFilterError::UnknownTable {
                resource: resource.to_owned(),
            })
    }

    async fn fetch_row(&self, stmt: Statement) -> Result<Option<Row>, DbFilterError> {
        let value = Value::find_by_statement(stmt).one(&self.db).await?;
        Ok(value.and_then(into_row))
    }

    async fn find_by_id(&self, binding: &TableBinding, id: &str) -> Result<Option<Row>, DbFilterError> {
        let stmt = self.backend().build(&build_find_by_id(binding, id));
        self.fetch_row(stmt).await
    }
}

#[async_trait]
impl QueryExecutor for SeaQueryExecutor {
    type Error = DbFilterError;

    #[tracing::instrument(skip(self, plan), fields(page = plan.page, page_size = plan.page_size))]
    async fn fetch_page(&self, resource: &str, plan: &QueryPlan) -> Result<Page<Row>, Self::Error> {
        let binding = self.binding(resource)?;
        let backend = self.backend();

        let rows = Value::find_by_statement(backend.build(&build_select(backend, binding, plan)))
            .all(&self.db)
            .await?;
        let items: Vec<Row> = rows.into_iter().filter_map(into_row).collect();

        let total = match self
            .db
            .query_one(backend.build(&build_count(backend, binding, plan)))
            .await?
        {
            Some(row) => u64::try_from(row.try_get::<i64>("", COUNT_ALIAS)?).unwrap_or_default(),
            None => 0,
        };

        tracing::debug!(items = items.len(), total, "page fetched");
        Ok(Page {
            items,
            total,
            page: plan.page,
            page_size: plan.page_size,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_one(&self, resource: &str, id: &str) -> Result<Option<Row>, Self::Error> {
        let binding = self.binding(resource)?;
        self.find_by_id(binding, id).await
    }

    #[tracing::instrument(skip(self, values))]
    async fn insert(&self, resource: &str, values: Row) -> Result<Row, Self::Error> {
        let binding = self.binding(resource)?;
        let backend = self.backend();
        let stmt = backend.build(&build_insert(backend, binding, &values)?);

        if supports_returning(backend) {
            return self
                .fetch_row(stmt)
                .await?
                .ok_or_else(|| DbFilterError::Statement("insert returned no row".to_owned()));
        }

        let result = self.db.execute(stmt).await?;
        let id = match values.get(binding.schema.primary_key) {
            Some(Value::String(s)) => s.clone(),
            Some(v) if !v.is_null() => v.to_string(),
            _ => result.last_insert_id().to_string(),
        };
        self.find_by_id(binding, &id)
            .await?
            .ok_or_else(|| DbFilterError::Statement(format!("inserted row '{id}' not found")))
    }

    #[tracing::instrument(skip(self, values))]
    async fn update(&self, resource: &str, id: &str, values: Row) -> Result<Option<Row>, Self::Error> {
        let binding = self.binding(resource)?;
        let backend = self.backend();
        let Some(update) = build_update(backend, binding, id, &values) else {
            tracing::debug!("nothing to update");
            return self.find_by_id(binding, id).await;
        };

        let stmt = backend.build(&update);
        if supports_returning(backend) {
            return self.fetch_row(stmt).await;
        }
        self.db.execute(stmt).await?;
        self.find_by_id(binding, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, resource: &str, id: &str) -> Result<bool, Self::Error> {
        let binding = self.binding(resource)?;
        let stmt = self.backend().build(&build_delete(binding, id));
        let result = self.db.execute(stmt).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn into_row(value: Value) -> Option<Row> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
