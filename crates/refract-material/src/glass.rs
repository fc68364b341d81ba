//! Catalog glass with dispersion formula and thermal coefficients.

use serde::{Deserialize, Serialize};

use crate::air::Air;
use crate::dispersion::{DispersionFormula, NUM_COEFFICIENTS};
use crate::environment::{Environment, STANDARD_PRESSURE};

/// Thermal index coefficients (AGF `TD` record).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalData {
    /// D0 coefficient.
    pub d0: f64,
    /// D1 coefficient.
    pub d1: f64,
    /// D2 coefficient.
    pub d2: f64,
    /// E0 coefficient.
    pub e0: f64,
    /// E1 coefficient.
    pub e1: f64,
    /// Effective resonance wavelength λtk in µm.
    pub ltk: f64,
    /// Reference temperature of the dispersion data in °C.
    pub reference_temperature: f64,
}

impl Default for ThermalData {
    fn default() -> Self {
        Self {
            d0: 0.0,
            d1: 0.0,
            d2: 0.0,
            e0: 0.0,
            e1: 0.0,
            ltk: 0.0,
            reference_temperature: 20.0,
        }
    }
}

/// A catalog glass.
#[derive(Debug, Clone, PartialEq)]
pub struct Glass {
    name: String,
    supplier: String,
    formula: DispersionFormula,
    coefficients: [f64; NUM_COEFFICIENTS],
    thermal: ThermalData,
    environment: Environment,
}

impl Glass {
    /// Create a glass. Extra coefficients beyond twelve are ignored.
    pub fn new(
        name: impl Into<String>,
        supplier: impl Into<String>,
        formula: DispersionFormula,
        coefficients: &[f64],
    ) -> Self {
        let mut c = [0.0; NUM_COEFFICIENTS];
        let n = coefficients.len().min(NUM_COEFFICIENTS);
        c[..n].copy_from_slice(&coefficients[..n]);
        Self {
            name: name.into().to_ascii_uppercase(),
            supplier: supplier.into().to_ascii_uppercase(),
            formula,
            coefficients: c,
            thermal: ThermalData::default(),
            environment: Environment::default(),
        }
    }

    /// Set thermal coefficients.
    pub fn with_thermal(mut self, thermal: ThermalData) -> Self {
        self.thermal = thermal;
        self
    }

    /// Evaluate indices at the given environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Product name, upper case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Supplier (catalog) name, upper case.
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    /// Dispersion formula.
    pub fn formula(&self) -> DispersionFormula {
        self.formula
    }

    /// Environment used by [`Glass::refractive_index`].
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Index relative to air at the glass's environment.
    pub fn refractive_index(&self, wavelength_nm: f64) -> f64 {
        let env = self.environment;
        let wvl = wavelength_nm / 1000.0;
        // Catalog wavelengths are measured in air at the reference conditions.
        let wvl_rel = wvl * Air::absolute_index(wvl, env.temperature, env.pressure)
            / Air::absolute_index(wvl, self.thermal.reference_temperature, STANDARD_PRESSURE);
        let n_abs = self.absolute_index(wvl_rel, env.temperature);
        n_abs / Air::absolute_index(wvl_rel, env.temperature, env.pressure)
    }

    /// Catalog index (relative, reference temperature) at `wavelength_um`.
    pub fn catalog_index(&self, wavelength_um: f64) -> f64 {
        self.formula.evaluate(wavelength_um, &self.coefficients)
    }

    /// Absolute index at `temperature`.
    fn absolute_index(&self, wavelength_um: f64, temperature: f64) -> f64 {
        let n_air = Air::absolute_index(
            wavelength_um,
            self.thermal.reference_temperature,
            STANDARD_PRESSURE,
        );
        self.catalog_index(wavelength_um) * n_air + self.delta_n(wavelength_um, temperature)
    }

    /// Absolute index change between the reference temperature and `temperature`.
    pub fn delta_n(&self, wavelength_um: f64, temperature: f64) -> f64 {
        let t = &self.thermal;
        let dt = temperature - t.reference_temperature;
        if dt == 0.0 {
            return 0.0;
        }
        let n = self.catalog_index(wavelength_um);
        let stk = if t.ltk > 0.0 {
            1.0
        } else if t.ltk < 0.0 {
            -1.0
        } else {
            0.0
        };
        let denom = wavelength_um * wavelength_um - stk * t.ltk * t.ltk;
        (n * n - 1.0) / (2.0 * n)
            * (t.d0 * dt
                + t.d1 * dt * dt
                + t.d2 * dt * dt * dt
                + (t.e0 * dt + t.e1 * dt * dt) / denom)
    }
}
