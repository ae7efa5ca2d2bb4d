//! Configuration types for Tessera serialization runs.
//!
//! All types implement [`serde::Deserialize`] and default every field, so a
//! configuration file only needs to name the settings it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`SerializerConfig`] - Template depth and diagnostic switches of a pass.
//! - [`OutputConfig`] - What the rendered TOML output contains.
//!
//! # Example
//!
//! ```
//! # use tessera::config::AppConfig;
//! let config: AppConfig = toml::from_str("[serializer]\nmax_template_depth = 4").unwrap();
//! assert_eq!(config.serializer().max_template_depth, 4);
//! assert!(config.output().include_diagnostics);
//! ```

use serde::Deserialize;

use tessera_serializer::{SerializeConfig, config::DEFAULT_MAX_TEMPLATE_DEPTH};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Serializer section.
    #[serde(default)]
    serializer: SerializerConfig,

    /// Output section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(serializer: SerializerConfig, output: OutputConfig) -> Self {
        Self { serializer, output }
    }

    /// Returns the serializer configuration.
    pub fn serializer(&self) -> &SerializerConfig {
        &self.serializer
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Settings of one serialization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Deepest chain of nested template instantiations that is expanded.
    pub max_template_depth: usize,

    /// Warn when a single nested attribute has several candidates of the
    /// same concrete type.
    pub warn_on_ambiguous_nested: bool,

    /// Warn about template instances whose alias does not resolve.
    pub report_dangling_templates: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_template_depth: DEFAULT_MAX_TEMPLATE_DEPTH,
            warn_on_ambiguous_nested: true,
            report_dangling_templates: true,
        }
    }
}

impl From<&SerializerConfig> for SerializeConfig {
    fn from(config: &SerializerConfig) -> Self {
        SerializeConfig::new(
            config.max_template_depth,
            config.warn_on_ambiguous_nested,
            config.report_dangling_templates,
        )
    }
}

/// Settings of the rendered record output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append a `[[diagnostics]]` entry per diagnostic of the pass.
    pub include_diagnostics: bool,

    /// Emit templates that produced neither a record nor overrides.
    pub include_empty_templates: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_diagnostics: true,
            include_empty_templates: false,
        }
    }
}
