//! Permission names for CRUD routes.
//!
//! Every request to `api/<resource>/...` requires `<resource>.<action>`,
//! where the action follows from the HTTP method:
//!
//! | Method          | Action   |
//! |-----------------|----------|
//! | `POST`          | `create` |
//! | `GET`           | `read`   |
//! | `PUT`, `PATCH`  | `update` |
//! | `DELETE`        | `delete` |
//!
//! Other methods require nothing.

use std::fmt;

use async_trait::async_trait;
use http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudAction {
    /// Action checked for an HTTP method. `None` for methods that are not checked.
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match method.as_str() {
            "POST" => Some(Self::Create),
            "GET" => Some(Self::Read),
            "PUT" | "PATCH" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission such as `customers.read`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: String,
    pub action: CrudAction,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.action)
    }
}

/// Resource name of a request path: the second segment of
/// `api/<resource>/...`. A leading `/` is ignored.
///
/// ```
/// use crud_resource::resolve_resource_name;
///
/// assert_eq!(resolve_resource_name("/api/customers/42"), Some("customers"));
/// assert_eq!(resolve_resource_name("api"), None);
/// ```
#[must_use]
pub fn resolve_resource_name(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .nth(1)
        .filter(|s| !s.is_empty())
}

/// Permission needed for `method` on `path`. `None` if the method is not checked.
///
/// A path without a resource segment yields an empty resource name, which
/// no checker is expected to grant.
#[must_use]
pub fn required_permission(method: &Method, path: &str) -> Option<Permission> {
    let action = CrudAction::from_method(method)?;
    Some(Permission {
        resource: resolve_resource_name(path).unwrap_or_default().to_owned(),
        action,
    })
}

/// Answers whether the current caller holds a permission.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn has_permission(&self, permission: &Permission) -> bool;
}
