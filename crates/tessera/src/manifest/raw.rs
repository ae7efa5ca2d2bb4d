//! Deserialized shape of a project manifest.

use indexmap::IndexMap;
use serde::Deserialize;
use toml::Spanned;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawManifest {
    #[serde(default)]
    pub types: Vec<RawType>,
    #[serde(default)]
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawType {
    pub name: Spanned<String>,
    pub base: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub generic: bool,
    #[serde(default = "default_true")]
    pub serializable: bool,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    #[serde(default)]
    pub composites: Vec<RawComposite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawAttribute {
    pub name: String,
    pub kind: Spanned<String>,
    /// Enum type, type-reference base, asset type or nested type, by kind.
    pub target: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    pub default: Option<Spanned<toml::Value>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub root: Option<String>,
}

/// A legacy composite: `parts` joined with `separator` feed `target`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawComposite {
    pub target: String,
    pub parts: Vec<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawDocument {
    pub key: Spanned<String>,
    /// Template alias to document key.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
    #[serde(default)]
    pub objects: Vec<RawObject>,
    #[serde(default)]
    pub templates: Vec<RawTemplate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawElement {
    pub id: Spanned<u64>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: Option<String>,
    pub parent: Option<u64>,
    #[serde(default)]
    pub attributes: IndexMap<String, toml::Value>,
}

/// Either a concrete nested object (`type` set) or a field group (`group`
/// set).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawObject {
    pub id: Spanned<u64>,
    pub parent: u64,
    pub group: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawTemplate {
    pub id: Spanned<u64>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub alias: String,
    pub name: Option<String>,
    pub parent: Option<u64>,
    #[serde(default)]
    pub attributes: IndexMap<String, toml::Value>,
    #[serde(default)]
    pub overrides: Vec<RawOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawOverride {
    pub element: String,
    pub attribute: String,
    pub value: toml::Value,
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    " ".to_string()
}
