//! Raw attribute bags read by attribute descriptors.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::asset::{AssetId, ElementAsset};

/// The raw attribute strings a record is serialized from.
///
/// A bag is either backed by an asset, in which case the record inherits the
/// asset's id, or detached (built ad hoc), in which case the serializer mints
/// a fresh id.
#[derive(Debug, Clone)]
pub struct AttributeBag<'a> {
    asset_id: Option<AssetId>,
    attributes: Cow<'a, IndexMap<String, String>>,
}

impl<'a> AttributeBag<'a> {
    /// Borrow the attributes of `asset`.
    pub fn from_asset(asset: &'a ElementAsset) -> Self {
        Self {
            asset_id: Some(asset.id()),
            attributes: Cow::Borrowed(asset.attributes()),
        }
    }

    /// The attributes of `asset` with `overrides` applied on top.
    ///
    /// Overridden attributes keep their original position; attributes the
    /// asset does not declare are appended in override order.
    pub fn with_overrides<'o>(
        asset: &'a ElementAsset,
        overrides: impl IntoIterator<Item = (&'o str, &'o str)>,
    ) -> Self {
        let mut attributes = asset.attributes().clone();
        for (name, value) in overrides {
            attributes.insert(name.to_string(), value.to_string());
        }
        Self {
            asset_id: Some(asset.id()),
            attributes: Cow::Owned(attributes),
        }
    }

    /// A bag that is not backed by any asset.
    pub fn detached(attributes: IndexMap<String, String>) -> Self {
        Self {
            asset_id: None,
            attributes: Cow::Owned(attributes),
        }
    }

    pub fn asset_id(&self) -> Option<AssetId> {
        self.asset_id
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Id;

    #[test]
    fn test_with_overrides_replaces_in_place() {
        let asset = ElementAsset::new(AssetId::new(4), Id::new("ui.Label"))
            .with_attribute("text", "base")
            .with_attribute("tooltip", "tip");

        let bag = AttributeBag::with_overrides(&asset, [("text", "over"), ("enabled", "false")]);

        let names: Vec<_> = bag.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["text", "tooltip", "enabled"]);
        assert_eq!(bag.get("text"), Some("over"));
        assert_eq!(bag.asset_id(), Some(AssetId::new(4)));
        assert_eq!(asset.attribute("text"), Some("base"));
    }

    #[test]
    fn test_detached_has_no_id() {
        let bag = AttributeBag::detached(IndexMap::new());
        assert_eq!(bag.asset_id(), None);
        assert!(!bag.contains("text"));
    }
}
