//! Options controlling a serialization pass.

/// Default bound on template instantiation depth.
pub const DEFAULT_MAX_TEMPLATE_DEPTH: usize = 32;

/// Options for one serialization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeConfig {
    /// Deepest template nesting the override resolver expands.
    pub max_template_depth: usize,
    /// Emit a warning when a single-valued nested attribute has several
    /// candidates of the same concrete type.
    pub warn_on_ambiguous_nested: bool,
    /// Emit a warning for template aliases that resolve to no document.
    pub report_dangling_templates: bool,
}

impl SerializeConfig {
    pub fn new(
        max_template_depth: usize,
        warn_on_ambiguous_nested: bool,
        report_dangling_templates: bool,
    ) -> Self {
        Self {
            max_template_depth,
            warn_on_ambiguous_nested,
            report_dangling_templates,
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            max_template_depth: DEFAULT_MAX_TEMPLATE_DEPTH,
            warn_on_ambiguous_nested: true,
            report_dangling_templates: true,
        }
    }
}
