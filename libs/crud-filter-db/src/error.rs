use thiserror::Error;

/// Errors from [`SeaQueryExecutor`](crate::SeaQueryExecutor).
#[derive(Debug, Error)]
pub enum DbFilterError {
    /// No table is bound to the resource name.
    #[error("no table bound for resource '{resource}'")]
    UnknownTable { resource: String },

    /// An insert payload names none of the table's columns.
    #[error("payload for '{table}' has no known columns")]
    EmptyPayload { table: String },

    /// The statement could not be built.
    #[error("invalid statement: {0}")]
    Statement(String),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}
