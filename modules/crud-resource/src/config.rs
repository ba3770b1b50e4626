//! Configuration for the CRUD resource service.

use std::path::Path;

use anyhow::Context;
use crud_filter::FilterConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment prefix for overrides, e.g. `CRUD__FILTER__DEFAULT_PAGE_SIZE=50`.
pub const ENV_PREFIX: &str = "CRUD__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrudConfig {
    /// Defaults for list requests.
    pub filter: FilterConfig,
    /// Check `<resource>.<action>` permissions in [`CrudService::authorize`](crate::CrudService::authorize).
    pub enforce_permissions: bool,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            enforce_permissions: true,
        }
    }
}

impl CrudConfig {
    /// Defaults, then the YAML file at `path` (if present), then `CRUD__*` variables.
    #[must_use]
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or contains unknown keys.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config: Self = Self::figment(path)
            .extract()
            .with_context(|| format!("failed to load CRUD config from {}", path.display()))?;
        tracing::info!(
            default_page_size = config.filter.default_page_size,
            max_page_size = ?config.filter.max_page_size,
            enforce_permissions = config.enforce_permissions,
            "CRUD config loaded"
        );
        Ok(config)
    }
}
