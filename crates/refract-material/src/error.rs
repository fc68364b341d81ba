//! Error types for material lookup.

use thiserror::Error;

/// Errors that can occur while resolving materials.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// No catalog or model matches the requested name.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    /// The supplier part of `PRODUCT_SUPPLIER` names no loaded catalog.
    #[error("unknown glass catalog: {0}")]
    UnknownCatalog(String),

    /// A `nd:vd` model glass name could not be parsed or is unphysical.
    #[error("invalid model glass '{0}': {1}")]
    InvalidModelGlass(String, String),

    /// Spectral line name is not one of the Fraunhofer lines.
    #[error("unknown spectral line: {0}")]
    UnknownSpectralLine(String),

    /// AGF dispersion formula code outside 1..=13.
    #[error("unknown dispersion formula code: {0}")]
    UnknownDispersionFormula(i32),
}

/// Result type for material operations.
pub type Result<T> = std::result::Result<T, MaterialError>;
