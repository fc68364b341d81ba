//! refract CLI - sequential lens analysis
//!
//! Loads a TOML prescription, updates the model and prints lens data,
//! first-order properties, real ray traces or per-field analyses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use refract::refract_math::Point2;
use refract::{OpticalSystem, Prescription};
use serde::Serialize;
use tracing::info;

mod logging;
mod report;

#[derive(Parser)]
#[command(name = "refract")]
#[command(about = "Sequential optical system analysis", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the lens data table
    Info {
        /// Prescription file (.toml)
        file: PathBuf,
    },
    /// Print first-order properties
    Paraxial {
        /// Prescription file (.toml)
        file: PathBuf,
    },
    /// Trace real rays for one field
    Trace {
        /// Prescription file (.toml)
        file: PathBuf,
        /// Field index
        #[arg(short, long, default_value_t = 0)]
        field: usize,
        /// Wavelength in nm (default: reference wavelength)
        #[arg(short, long)]
        wavelength: Option<f64>,
        /// Relative pupil x
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        px: f64,
        /// Relative pupil y
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        py: f64,
        /// Trace a meridional fan of this many rays instead of one ray
        #[arg(long)]
        fan: Option<usize>,
    },
    /// Compute vignetting factors for every field
    Vignetting {
        /// Prescription file (.toml)
        file: PathBuf,
    },
    /// Sagittal and tangential focus along each chief ray
    Astigmatism {
        /// Prescription file (.toml)
        file: PathBuf,
        /// Wavelength in nm (default: reference wavelength)
        #[arg(short, long)]
        wavelength: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(&cli.log_level)?;

    match cli.command {
        Commands::Info { file } => {
            let system = load_system(&file)?;
            if cli.json {
                print_json(&report::LensReport::new(&system))?;
            } else {
                print!("{system}");
            }
        }
        Commands::Paraxial { file } => {
            let system = load_system(&file)?;
            let fod = system.first_order_data();
            if cli.json {
                print_json(fod)?;
            } else {
                print!("{fod}");
            }
        }
        Commands::Trace {
            file,
            field,
            wavelength,
            px,
            py,
            fan,
        } => {
            let system = load_system(&file)?;
            trace(&system, field, wavelength, Point2::new(px, py), fan, cli.json)?;
        }
        Commands::Vignetting { file } => {
            let system = load_system(&file)?;
            let rows = report::vignetting(&system)?;
            if cli.json {
                print_json(&rows)?;
            } else {
                println!("{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}", "X", "Y", "VUY", "VLY", "VUX", "VLX");
                for row in &rows {
                    let v = &row.value;
                    println!(
                        "{:>10.3}{:>10.3}{:>10.4}{:>10.4}{:>10.4}{:>10.4}",
                        row.field[0], row.field[1], v.vuy, v.vly, v.vux, v.vlx
                    );
                }
            }
        }
        Commands::Astigmatism { file, wavelength } => {
            let system = load_system(&file)?;
            let wvl = resolve_wavelength(&system, wavelength)?;
            let rows = report::astigmatism(&system, wvl);
            if cli.json {
                print_json(&rows)?;
            } else {
                println!("{:>10}{:>10}{:>12}{:>12}{:>12}", "X", "Y", "Sagittal", "Tangential", "Astig");
                for row in &rows {
                    match &row.value {
                        Some(focus) => println!(
                            "{:>10.3}{:>10.3}{:>12.5}{:>12.5}{:>12.5}",
                            row.field[0],
                            row.field[1],
                            focus.sagittal,
                            focus.tangential,
                            focus.astigmatism()
                        ),
                        None => println!("{:>10.3}{:>10.3}{:>12}", row.field[0], row.field[1], "failed"),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Parse, build and update a prescription.
fn load_system(path: &Path) -> Result<OpticalSystem> {
    let rx = Prescription::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let mut system = rx.build().context("failed to build optical system")?;
    system.update_model().context("model update failed")?;
    info!(file = %path.display(), efl = system.first_order_data().efl, "loaded system");
    Ok(system)
}

fn resolve_wavelength(system: &OpticalSystem, wavelength: Option<f64>) -> Result<f64> {
    match wavelength {
        Some(w) if w > 0.0 => Ok(w),
        Some(w) => anyhow::bail!("wavelength must be positive, got {w}"),
        None => Ok(system.spec().reference_wavelength()?),
    }
}

fn trace(
    system: &OpticalSystem,
    field: usize,
    wavelength: Option<f64>,
    pupil: Point2,
    fan: Option<usize>,
    json: bool,
) -> Result<()> {
    let fields = &system.spec().fields.fields;
    let fld = fields
        .get(field)
        .with_context(|| format!("field {field} out of range ({} fields)", fields.len()))?;
    let wvl = resolve_wavelength(system, wavelength)?;
    let pupils = match fan {
        Some(n) => report::meridional_fan(n),
        None => vec![pupil],
    };

    let rays = system.sequential_trace().trace_pupil_rays(&pupils, fld, wvl);
    if json {
        let reports: Vec<report::RayReport> = rays.iter().map(report::RayReport::from).collect();
        print_json(&reports)?;
    } else {
        for ray in &rays {
            println!("Pupil: ({:.4}, {:.4})", ray.pupil().x, ray.pupil().y);
            println!("{ray}");
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
