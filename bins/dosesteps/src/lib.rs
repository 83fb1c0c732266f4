//! Computes a multiplicative dose sequence and writes the dose lookup tables.

use std::path::PathBuf;

use clap::Parser;
use config::DoseConfig;
use dosetest::{format, DoseSequence};

/// Arguments to `dosesteps`.
#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "Compute a multiplicative dose sequence and write dose lookup tables"
)]
pub struct Args {
    /// An explicit config file.
    ///
    /// Defaults to `$EBEAM_CONFIG`, then the nearest `ebeam.toml`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The number of doses (N).
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    /// The first dose in uC/cm^2 (D0).
    #[arg(long)]
    pub initial: Option<f64>,
    /// The last dose in uC/cm^2 (DN).
    #[arg(long = "final")]
    pub final_dose: Option<f64>,
    /// The directory the tables are written to.
    ///
    /// It will be created if necessary. Existing tables are overwritten.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// The file name of the modulation table.
    #[arg(long)]
    pub jdi_name: Option<String>,
    /// Print the full sequence as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
    /// Do not write any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Overrides the configured values with the flags that were given.
    pub fn apply(&self, cfg: &mut DoseConfig) {
        if let Some(n) = self.count {
            cfg.count = n;
        }
        if let Some(d0) = self.initial {
            cfg.initial = d0;
        }
        if let Some(dn) = self.final_dose {
            cfg.final_dose = dn;
        }
        if let Some(ref dir) = self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(ref name) = self.jdi_name {
            cfg.jdi_name = name.clone();
        }
    }
}

/// Writes the layer table, the datatype table and the modulation table.
///
/// Returns the paths written, in that order.
pub fn write_tables(cfg: &DoseConfig, seq: &DoseSequence) -> anyhow::Result<Vec<PathBuf>> {
    let tables = [
        (cfg.layers_path(), format::layer_dose_table(seq)),
        (cfg.datatypes_path(), format::datatype_dose_table(seq)),
        (cfg.jdi_path(), format::jdi_file(seq)),
    ];
    let mut written = Vec::with_capacity(tables.len());
    for (path, contents) in tables {
        config::paths::write(&path, contents)?;
        tracing::info!(path = ?path, "wrote dose table");
        written.push(path);
    }
    Ok(written)
}
