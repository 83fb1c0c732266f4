//! Periodic placement of unit cells inside a circular boundary.
//!
//! Candidate points form a rectangular lattice starting at `(-R, -R)`
//! with periods `A` and `B`. A candidate is kept if it lies in the closed
//! disk `x² + y² ≤ R²`, and a fresh unit cell is requested from a
//! [`CellFactory`] for every kept point.
//!
//! # Examples
//!
//! ```
//! use cellarray::{infallible, place, LatticeParams};
//!
//! let params = LatticeParams::new(10., 20., 100.).unwrap();
//! let cells = place(infallible(|| "cell"), &params).unwrap();
//! assert!(cells.iter().all(|c| c.placement.point().in_disk(100.)));
//! ```
#![warn(missing_docs)]

pub mod error;
pub mod layout;
#[cfg(test)]
mod tests;

use std::convert::Infallible;

use geometry::prelude::Point;
use serde::{Deserialize, Serialize};

pub use crate::error::{Error, Result};

/// The lattice periods and boundary radius of a circular cell array.
///
/// Deserialization goes through the same checks as [`LatticeParams::new`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLatticeParams")]
pub struct LatticeParams {
    a: f64,
    b: f64,
    r: f64,
}

#[derive(Deserialize)]
struct RawLatticeParams {
    a: f64,
    b: f64,
    r: f64,
}

impl TryFrom<RawLatticeParams> for LatticeParams {
    type Error = Error;

    fn try_from(raw: RawLatticeParams) -> Result<Self> {
        Self::new(raw.a, raw.b, raw.r)
    }
}

impl LatticeParams {
    /// Creates a validated parameter set.
    ///
    /// `a` is the period along x, `b` the period along y
    /// and `r` the radius of the circular boundary.
    pub fn new(a: f64, b: f64, r: f64) -> Result<Self> {
        for (name, value) in [("a", a), ("b", b), ("r", r)] {
            if !(value.is_finite() && value > 0.) {
                return Err(Error::InvalidParameter { name, value });
            }
        }
        Ok(Self { a, b, r })
    }

    /// The period along x.
    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// The period along y.
    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }

    /// The boundary radius.
    #[inline]
    pub fn r(&self) -> f64 {
        self.r
    }

    /// The largest lattice index along x and along y, inclusive.
    ///
    /// ```
    /// # use cellarray::LatticeParams;
    /// let params = LatticeParams::new(10., 20., 100.).unwrap();
    /// assert_eq!(params.max_indices(), (20, 10));
    /// ```
    pub fn max_indices(&self) -> (usize, usize) {
        let nx = (2. * self.r / self.a).floor() as usize;
        let ny = (2. * self.r / self.b).floor() as usize;
        (nx, ny)
    }

    /// The coordinates of lattice index `(i, j)`.
    #[inline]
    pub fn point(&self, i: usize, j: usize) -> Point {
        Point::new(-self.r + i as f64 * self.a, -self.r + j as f64 * self.b)
    }
}

/// A lattice point and the indices that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The index along x.
    pub i: usize,
    /// The index along y.
    pub j: usize,
    /// The x-coordinate.
    pub x: f64,
    /// The y-coordinate.
    pub y: f64,
}

impl Placement {
    /// The placement coordinates as a [`Point`].
    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A point of the superset grid, tagged with the result of the disk test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Candidate {
    /// The lattice point.
    pub placement: Placement,
    /// Whether the point lies in the closed disk.
    pub accepted: bool,
}

/// A unit cell produced for one accepted placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<C> {
    /// Where the cell goes.
    pub placement: Placement,
    /// The cell, as returned by the factory.
    pub cell: C,
}

/// Produces a fresh, identical unit cell on every call.
pub trait CellFactory {
    /// The cell geometry.
    type Cell;
    /// The error returned when a cell cannot be built.
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    /// Builds one unit cell.
    fn create(&mut self) -> std::result::Result<Self::Cell, Self::Error>;
}

impl<F, C, E> CellFactory for F
where
    F: FnMut() -> std::result::Result<C, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Cell = C;
    type Error = E;

    fn create(&mut self) -> std::result::Result<C, E> {
        self()
    }
}

/// Wraps a factory closure that cannot fail.
pub fn infallible<C>(
    mut f: impl FnMut() -> C,
) -> impl CellFactory<Cell = C, Error = Infallible> {
    move || Ok::<_, Infallible>(f())
}

/// A container that unit cells can be composed into.
pub trait Compose<C> {
    /// Adds `cell` to the container, offset by `offset`.
    fn compose(&mut self, cell: C, offset: Point);
}

impl<C> Compose<C> for Vec<(Point, C)> {
    fn compose(&mut self, cell: C, offset: Point) {
        self.push((offset, cell));
    }
}

/// Enumerates the full superset grid in row-major order (`i` outer, `j` inner),
/// marking which points pass the disk test.
pub fn candidates(params: &LatticeParams) -> impl Iterator<Item = Candidate> + '_ {
    let (nx, ny) = params.max_indices();
    (0..=nx).flat_map(move |i| {
        (0..=ny).map(move |j| {
            let p = params.point(i, j);
            Candidate {
                placement: Placement { i, j, x: p.x, y: p.y },
                accepted: p.in_disk(params.r),
            }
        })
    })
}

/// Places one fresh unit cell at every lattice point inside the boundary.
///
/// The factory is invoked exactly once per accepted placement, in
/// row-major order. If it fails, the error is returned and every cell
/// produced so far is dropped.
pub fn place<F: CellFactory>(
    mut factory: F,
    params: &LatticeParams,
) -> Result<Vec<Placed<F::Cell>>> {
    let (nx, ny) = params.max_indices();
    tracing::debug!(
        a = params.a,
        b = params.b,
        r = params.r,
        nx = nx + 1,
        ny = ny + 1,
        "enumerating lattice candidates"
    );

    let mut placed = Vec::new();
    for candidate in candidates(params).filter(|c| c.accepted) {
        let Placement { i, j, .. } = candidate.placement;
        let cell = factory
            .create()
            .map_err(|e| Error::FactoryFailure {
                i,
                j,
                source: e.into(),
            })?;
        tracing::trace!(i, j, x = candidate.placement.x, y = candidate.placement.y, "placed cell");
        placed.push(Placed {
            placement: candidate.placement,
            cell,
        });
    }

    tracing::debug!(count = placed.len(), "placed unit cells");
    Ok(placed)
}

/// Places unit cells like [`place`], then composes them into `target`.
///
/// Nothing is added to `target` unless every cell was built successfully.
/// Returns the accepted placements.
pub fn place_into<F, T>(target: &mut T, factory: F, params: &LatticeParams) -> Result<Vec<Placement>>
where
    F: CellFactory,
    T: Compose<F::Cell>,
{
    let placed = place(factory, params)?;
    Ok(placed
        .into_iter()
        .map(|Placed { placement, cell }| {
            target.compose(cell, placement.point());
            placement
        })
        .collect())
}
