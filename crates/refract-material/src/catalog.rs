//! Glass catalogs.

use std::collections::BTreeMap;

use crate::glass::Glass;

/// A supplier's set of glasses, keyed by upper-case product name.
///
/// Catalogs are populated programmatically; reading AGF files is left to
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct GlassCatalog {
    name: String,
    glasses: BTreeMap<String, Glass>,
}

impl GlassCatalog {
    /// Empty catalog for supplier `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            glasses: BTreeMap::new(),
        }
    }

    /// Supplier name, upper case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add or replace a glass.
    pub fn insert(&mut self, glass: Glass) {
        self.glasses.insert(glass.name().to_string(), glass);
    }

    /// Builder form of [`GlassCatalog::insert`].
    pub fn with_glass(mut self, glass: Glass) -> Self {
        self.insert(glass);
        self
    }

    /// Glass by product name (case insensitive).
    pub fn glass(&self, product: &str) -> Option<&Glass> {
        self.glasses.get(&product.to_ascii_uppercase())
    }

    /// Number of glasses.
    pub fn len(&self) -> usize {
        self.glasses.len()
    }

    /// True if the catalog holds no glass.
    pub fn is_empty(&self) -> bool {
        self.glasses.is_empty()
    }

    /// Product names in sorted order.
    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.glasses.keys().map(String::as_str)
    }
}
