//! Binder configuration.
//!
//! [`BinderConfig`] names the markup attributes a binder looks for and
//! decides how [`Binder::destroy`](crate::Binder::destroy) tears listeners
//! down. The defaults match the `data-mcp-*` annotation scheme:
//!
//! ```html
//! <div data-mcp-source="title">
//!   <h1 data-mcp-target="=title"></h1>
//! </div>
//! ```
//!
//! Configurations can be built in code or deserialized, e.g. from the
//! `[binder]` table of an application settings file:
//!
//! ```
//! use horizon_bind::{BinderConfig, Teardown};
//!
//! let config: BinderConfig = serde_json::from_str(r#"{"teardown": "global"}"#).unwrap();
//! assert_eq!(config.teardown, Teardown::Global);
//! assert_eq!(config.target_attribute, "data-mcp-target");
//! ```

use serde::{Deserialize, Serialize};

/// Default annotation namespace.
pub const DEFAULT_NAMESPACE: &str = "mcp";

/// How a binder removes its listeners when destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Teardown {
    /// Remove only the listeners this binder registered.
    #[default]
    Scoped,
    /// Remove every change listener on the model, including listeners that
    /// belong to other binders or application code.
    Global,
}

/// Attribute names and teardown policy for a binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Attribute whose value names the property an element is a source for.
    pub source_attribute: String,
    /// Presence-only attribute that makes the context element itself a source.
    pub source_marker: String,
    /// Attribute holding a target directive (`<operator><property>`).
    pub target_attribute: String,
    /// Listener teardown policy.
    pub teardown: Teardown,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }
}

impl BinderConfig {
    /// Create a configuration with the default `data-mcp-*` attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration using `data-<namespace>-source` and
    /// `data-<namespace>-target`.
    pub fn with_namespace(namespace: &str) -> Self {
        let source = format!("data-{namespace}-source");
        Self {
            source_marker: source.clone(),
            source_attribute: source,
            target_attribute: format!("data-{namespace}-target"),
            teardown: Teardown::default(),
        }
    }

    /// Set the source attribute name.
    pub fn source_attribute(mut self, name: impl Into<String>) -> Self {
        self.source_attribute = name.into();
        self
    }

    /// Set the source marker attribute name.
    pub fn source_marker(mut self, name: impl Into<String>) -> Self {
        self.source_marker = name.into();
        self
    }

    /// Set the target attribute name.
    pub fn target_attribute(mut self, name: impl Into<String>) -> Self {
        self.target_attribute = name.into();
        self
    }

    /// Set the teardown policy.
    pub fn teardown(mut self, teardown: Teardown) -> Self {
        self.teardown = teardown;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attributes() {
        let config = BinderConfig::default();
        assert_eq!(config.source_attribute, "data-mcp-source");
        assert_eq!(config.source_marker, "data-mcp-source");
        assert_eq!(config.target_attribute, "data-mcp-target");
        assert_eq!(config.teardown, Teardown::Scoped);
    }

    #[test]
    fn test_namespace_and_builder() {
        let config = BinderConfig::with_namespace("app")
            .source_marker("data-app-bound")
            .teardown(Teardown::Global);

        assert_eq!(config.source_attribute, "data-app-source");
        assert_eq!(config.source_marker, "data-app-bound");
        assert_eq!(config.target_attribute, "data-app-target");
        assert_eq!(config.teardown, Teardown::Global);
    }

    #[test]
    fn test_deserialize_from_toml_table() {
        #[derive(Deserialize)]
        struct Settings {
            binder: BinderConfig,
        }

        let settings: Settings = toml::from_str(
            r#"
            [binder]
            target_attribute = "data-view-target"
            teardown = "scoped"
            "#,
        )
        .unwrap();

        assert_eq!(settings.binder.target_attribute, "data-view-target");
        assert_eq!(settings.binder.source_attribute, "data-mcp-source");
    }

    #[test]
    fn test_unknown_teardown_rejected() {
        assert!(serde_json::from_str::<BinderConfig>(r#"{"teardown": "eventually"}"#).is_err());
    }
}
