//! Material lookup and interning.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::buchdahl::BuchdahlGlass;
use crate::catalog::GlassCatalog;
use crate::environment::Environment;
use crate::error::{MaterialError, Result};
use crate::Material;

/// Owns every material handed to the lens model.
///
/// Materials are created once and shared: repeated lookups of the same name
/// return clones of the same `Arc`, so gaps that use one glass point at one
/// value.
#[derive(Debug)]
pub struct MaterialLibrary {
    environment: Environment,
    air: Arc<Material>,
    catalogs: Vec<GlassCatalog>,
    interned: HashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    /// Library with no catalogs evaluating glasses at `environment`.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            air: Arc::new(Material::Air),
            catalogs: Vec::new(),
            interned: HashMap::new(),
        }
    }

    /// Environment applied to catalog glasses.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Shared air.
    pub fn air(&self) -> Arc<Material> {
        Arc::clone(&self.air)
    }

    /// Add a catalog. A catalog with the same supplier name is replaced.
    pub fn add_catalog(&mut self, catalog: GlassCatalog) {
        let name = catalog.name().to_string();
        self.catalogs.retain(|c| c.name() != name);
        self.interned.retain(|key, _| !key.ends_with(&format!("_{name}")));
        debug!(catalog = %name, glasses = catalog.len(), "added glass catalog");
        self.catalogs.push(catalog);
    }

    /// Catalog by supplier name (case insensitive).
    pub fn catalog(&self, name: &str) -> Option<&GlassCatalog> {
        let name = name.to_ascii_uppercase();
        self.catalogs.iter().find(|c| c.name() == name)
    }

    /// Loaded catalogs in insertion order.
    pub fn catalogs(&self) -> &[GlassCatalog] {
        &self.catalogs
    }

    /// Resolve a material name.
    ///
    /// - `AIR` (any case) is air.
    /// - `nd:vd` builds a [`BuchdahlGlass`].
    /// - `PRODUCT_SUPPLIER` searches one catalog.
    /// - A bare product name searches every catalog in insertion order.
    pub fn find(&mut self, name: &str) -> Result<Arc<Material>> {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case("AIR") {
            return Ok(self.air());
        }

        if trimmed.contains(':') {
            let glass = BuchdahlGlass::parse(trimmed)?;
            let key = glass.name();
            return Ok(self.intern(key, || Material::Model(glass)));
        }

        let upper = trimmed.to_ascii_uppercase();
        let (product, catalog) = match upper.rsplit_once('_') {
            Some((product, supplier)) => {
                let catalog = self
                    .catalog(supplier)
                    .ok_or_else(|| MaterialError::UnknownCatalog(supplier.to_string()))?;
                (product.to_string(), catalog)
            }
            None => {
                let catalog = self
                    .catalogs
                    .iter()
                    .find(|c| c.glass(&upper).is_some())
                    .ok_or_else(|| MaterialError::UnknownMaterial(trimmed.to_string()))?;
                (upper.clone(), catalog)
            }
        };

        let glass = catalog
            .glass(&product)
            .ok_or_else(|| MaterialError::UnknownMaterial(trimmed.to_string()))?
            .clone()
            .with_environment(self.environment);
        let key = format!("{}_{}", glass.name(), glass.supplier());
        Ok(self.intern(key, || Material::Glass(glass)))
    }

    fn intern(&mut self, key: String, make: impl FnOnce() -> Material) -> Arc<Material> {
        Arc::clone(
            self.interned
                .entry(key)
                .or_insert_with(|| Arc::new(make())),
        )
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
