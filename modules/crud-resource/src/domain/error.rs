use crud_filter::{FilterError, SchemaError};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("unknown resource '{resource}'")]
    UnknownResource { resource: String },

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Access forbidden: missing permission '{permission}'")]
    Forbidden { permission: String },

    /// Server-side setup problem, e.g. listing a resource without the filter capability.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[source] BoxError),
}

impl DomainError {
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Box::new(e))
    }

    /// Whether the caller can fix the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::Database(_))
    }
}

impl From<FilterError> for DomainError {
    fn from(e: FilterError) -> Self {
        match e {
            FilterError::MalformedFilter(_) | FilterError::FilterNotAnObject => {
                Self::validation("filter", e.to_string())
            }
            FilterError::UnknownResource { resource } => Self::UnknownResource { resource },
            FilterError::Schema { .. } => {
                tracing::error!(error = %e, "resource is not filterable");
                Self::Configuration(e.to_string())
            }
        }
    }
}

/// Errors raised while building a [`ResourceRegistry`](super::registry::ResourceRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("resource '{resource}' is registered twice")]
    Duplicate { resource: String },

    #[error("resource '{resource}' has an invalid schema: {source}")]
    InvalidSchema {
        resource: String,
        #[source]
        source: SchemaError,
    },
}
