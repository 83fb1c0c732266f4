//! Composing placed unit cells into a [`layir`] library.

use arcstr::ArcStr;
use geometry::prelude::{Point, Polygon, Rect};
use layir::{Cell, CellId, Instance, Layer, LibraryBuilder, Shape};
use serde::{Deserialize, Serialize};

use crate::{place_into, Compose, LatticeParams, Placement};

/// Instantiates every composed unit cell in a single parent cell.
///
/// Each unit cell is added to the library as its own (uniquely renamed)
/// cell and instantiated in the parent at its placement offset.
pub struct ArrayBuilder<'a, L> {
    lib: &'a mut LibraryBuilder<L>,
    parent: Cell<L>,
    count: usize,
}

impl<'a, L> ArrayBuilder<'a, L> {
    /// Starts a new parent cell named `name`.
    pub fn new(lib: &'a mut LibraryBuilder<L>, name: impl Into<ArcStr>) -> Self {
        Self {
            lib,
            parent: Cell::new(name),
            count: 0,
        }
    }

    /// The number of instances composed so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no cell has been composed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Adds the parent cell to the library.
    pub fn finish(self) -> CellId {
        self.lib.add_cell(self.parent)
    }
}

impl<L> Compose<Cell<L>> for ArrayBuilder<'_, L> {
    fn compose(&mut self, cell: Cell<L>, offset: Point) {
        let child = self.lib.add_cell(cell);
        let name = arcstr::format!("xcell{}", self.count);
        self.parent
            .add_instance(Instance::with_offset(child, name, offset));
        self.count += 1;
    }
}

/// A unit cell holding one `width` × `height` rectangle whose lower-left
/// corner sits at the cell origin.
pub fn rect_cell(name: impl Into<ArcStr>, layer: Layer, width: f64, height: f64) -> Cell<Layer> {
    let mut cell = Cell::new(name);
    cell.add_element(Shape::new(layer, Rect::from_size(width, height)));
    cell
}

/// A unit cell holding a regular polygon approximating a disk of the
/// given radius, centered on the cell origin.
///
/// # Panics
///
/// Panics if `sides < 3`.
pub fn disk_cell(name: impl Into<ArcStr>, layer: Layer, radius: f64, sides: usize) -> Cell<Layer> {
    let mut cell = Cell::new(name);
    cell.add_element(Shape::new(layer, Polygon::regular(sides, radius)));
    cell
}

/// The geometry of a unit cell.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum UnitCell {
    /// See [`rect_cell`].
    Rect {
        /// The rectangle width.
        width: f64,
        /// The rectangle height.
        height: f64,
    },
    /// See [`disk_cell`].
    Disk {
        /// The disk radius.
        radius: f64,
        /// The number of polygon vertices.
        sides: usize,
    },
}

/// An error raised when a [`UnitCell`] cannot be drawn.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum UnitCellError {
    /// A dimension was not a finite, strictly positive number.
    #[error("unit cell {name} = {value} must be finite and greater than zero")]
    Dimension {
        /// The dimension name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A disk was requested with fewer than 3 vertices.
    #[error("a disk needs at least 3 sides, got {0}")]
    TooFewSides(usize),
}

impl UnitCell {
    /// Draws one unit cell named `name` on `layer`.
    pub fn build(&self, name: &ArcStr, layer: Layer) -> Result<Cell<Layer>, UnitCellError> {
        let positive = |name, value: f64| {
            if value.is_finite() && value > 0. {
                Ok(())
            } else {
                Err(UnitCellError::Dimension { name, value })
            }
        };
        match *self {
            UnitCell::Rect { width, height } => {
                positive("width", width)?;
                positive("height", height)?;
                Ok(rect_cell(name.clone(), layer, width, height))
            }
            UnitCell::Disk { radius, sides } => {
                positive("radius", radius)?;
                if sides < 3 {
                    return Err(UnitCellError::TooFewSides(sides));
                }
                Ok(disk_cell(name.clone(), layer, radius, sides))
            }
        }
    }
}

/// A circular array added to a library.
#[derive(Debug, Clone)]
pub struct CircularArray {
    /// The parent cell holding one instance per placement.
    pub cell: CellId,
    /// The accepted placements, in row-major order.
    pub placements: Vec<Placement>,
}

/// Builds a circular array of `unit` cells named `cell_name` on `layer`
/// and adds it to `lib` as a parent cell named `name`.
///
/// On error, `lib` is left unchanged.
pub fn circular_array(
    lib: &mut LibraryBuilder<Layer>,
    name: impl Into<ArcStr>,
    unit: UnitCell,
    cell_name: impl Into<ArcStr>,
    layer: Layer,
    params: &LatticeParams,
) -> crate::Result<CircularArray> {
    let cell_name = cell_name.into();
    // The parent cell is only added to `lib` by `finish`.
    let mut array = ArrayBuilder::new(lib, name);
    let placements = place_into(&mut array, || unit.build(&cell_name, layer), params)?;
    let cell = array.finish();
    Ok(CircularArray { cell, placements })
}
