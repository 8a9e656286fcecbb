//! Catalog snapshots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::uuids::TypedUuid;

/// Product identifier.
pub type ProductUuid = TypedUuid<ProductSnapshot>;

/// The client's copy of one catalog product, as served by the products
/// endpoint.
///
/// Carts and orders never hold one of these by reference; they copy the
/// fields they need at the moment they need them, which is what makes cart
/// prices snapshots rather than live lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Catalog identity.
    pub uuid: ProductUuid,

    /// Display title.
    pub title: String,

    /// Current unit price in minor units.
    pub price: i64,

    /// Units currently available.
    pub inventory: u32,

    /// Gallery image URLs; the first one is the thumbnail.
    pub images: SmallVec<[String; 4]>,

    /// Catalog category, when the product has one.
    pub category: Option<String>,

    /// Seller-provided attributes.
    pub attributes: AttributeMap,
}

impl ProductSnapshot {
    /// Whether the product can be added to a cart at all.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.inventory > 0
    }

    /// The thumbnail image, when the gallery is not empty.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Seller-provided product attributes.
///
/// A handful of keys are recognized and get typed accessors; everything else
/// passes through untouched, so sellers can attach attributes the storefront
/// has never heard of and still get them back intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: BTreeMap<String, String>,
}

impl AttributeMap {
    /// Recognized key: manufacturer brand.
    pub const BRAND: &'static str = "brand";

    /// Recognized key: model name or number.
    pub const MODEL: &'static str = "model";

    /// Recognized key: color.
    pub const COLOR: &'static str = "color";

    /// Recognized key: material.
    pub const MATERIAL: &'static str = "material";

    /// Recognized key: shipping weight.
    pub const WEIGHT: &'static str = "weight";

    /// Recognized key: warranty period.
    pub const WARRANTY: &'static str = "warranty";

    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, recognized or not.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up an attribute by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Manufacturer brand, when present.
    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.get(Self::BRAND)
    }

    /// Model name or number, when present.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.get(Self::MODEL)
    }

    /// Color, when present.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.get(Self::COLOR)
    }

    /// Material, when present.
    #[must_use]
    pub fn material(&self) -> Option<&str> {
        self.get(Self::MATERIAL)
    }

    /// Shipping weight, when present.
    #[must_use]
    pub fn weight(&self) -> Option<&str> {
        self.get(Self::WEIGHT)
    }

    /// Warranty period, when present.
    #[must_use]
    pub fn warranty(&self) -> Option<&str> {
        self.get(Self::WARRANTY)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the product has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
