//! Errors raised while compiling a list request.

use thiserror::Error;

/// Errors from the filter compiler.
///
/// Unknown filter keys, unsupported functions and out-of-range sort columns
/// are not errors: they are ignored or defaulted.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The resource is registered without the filter capability.
    #[error("resource '{resource}' does not support filtering and search")]
    Schema { resource: String },

    /// The schema provider does not know the resource.
    #[error("unknown resource '{resource}'")]
    UnknownResource { resource: String },

    /// The `filter` parameter is not valid JSON.
    #[error("malformed filter: {0}")]
    MalformedFilter(#[from] serde_json::Error),

    /// The `filter` parameter decoded to something other than an object.
    #[error("filter must be a JSON object")]
    FilterNotAnObject,
}

impl FilterError {
    /// Whether the error was caused by the request rather than by
    /// server-side configuration.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedFilter(_) | Self::FilterNotAnObject)
    }
}
