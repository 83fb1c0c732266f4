//! Tiles a unit cell on a rectangular lattice clipped to a circle and
//! summarizes the resulting layout as JSON.

use std::path::PathBuf;

use anyhow::Context;
use cellarray::layout::circular_array;
use cellarray::{LatticeParams, Placement};
use clap::Parser;
use config::{ArrayConfig, CellShape};
use geometry::prelude::Rect;
use layir::{Layer, Library, LibraryBuilder};
use serde::Serialize;

/// Arguments to [`circarray`].
#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "Tile a unit cell on a rectangular lattice, keeping the cells inside a circle"
)]
pub struct Args {
    /// An explicit config file.
    ///
    /// Defaults to `$EBEAM_CONFIG`, then the nearest `ebeam.toml`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The lattice period along x (A).
    #[arg(short = 'a', long)]
    pub period_x: Option<f64>,
    /// The lattice period along y (B).
    #[arg(short = 'b', long)]
    pub period_y: Option<f64>,
    /// The radius of the circular boundary (R).
    #[arg(short, long)]
    pub radius: Option<f64>,
    /// Draw disks instead of rectangles.
    #[arg(long)]
    pub disk: bool,
    /// The path where the JSON layout summary should be saved.
    ///
    /// The file and its parent directories will be created if necessary.
    /// If the file already exists, it will be overwritten.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl Args {
    /// Overrides the configured values with the flags that were given.
    pub fn apply(&self, cfg: &mut ArrayConfig) {
        if let Some(a) = self.period_x {
            cfg.period_x = a;
        }
        if let Some(b) = self.period_y {
            cfg.period_y = b;
        }
        if let Some(r) = self.radius {
            cfg.radius = r;
        }
        if self.disk {
            cfg.cell.shape = CellShape::Disk;
        }
        if let Some(ref out) = self.out {
            cfg.output = out.clone();
        }
    }
}

/// The JSON document written by [`circarray`].
#[derive(Serialize)]
pub struct LayoutSummary {
    /// The name of the array cell.
    pub top: String,
    pub lattice: LatticeParams,
    pub bbox: Option<Rect>,
    pub placements: Vec<Placement>,
    pub library: Library<Layer>,
}

/// Builds the circular array described by `cfg`.
pub fn circarray(cfg: &ArrayConfig) -> anyhow::Result<LayoutSummary> {
    let lattice = cfg
        .lattice()
        .with_context(|| "Invalid lattice parameters.")?;
    let mut lib = LibraryBuilder::new();
    let array = circular_array(
        &mut lib,
        cfg.name.as_str(),
        cfg.cell.unit_cell(),
        cfg.cell.name.as_str(),
        cfg.cell.layer(),
        &lattice,
    )
    .with_context(|| "Failed to place unit cells.")?;
    let library = lib.build()?;
    tracing::info!(cells = library.len(), "built cell library");

    Ok(LayoutSummary {
        top: library.cell(array.cell).name().to_string(),
        lattice,
        bbox: library.cell_bbox(array.cell),
        placements: array.placements,
        library,
    })
}
