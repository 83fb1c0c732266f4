//! Real-valued polygons.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::rect::Rect;
use crate::transform::TranslateMut;

/// A polygon, with vertex coordinates given in order.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    /// Vector of points that make up the polygon.
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon with given vertices.
    pub fn from_verts(vec: Vec<Point>) -> Self {
        Self { points: vec }
    }

    /// Approximates a circle of the given radius, centered at the origin,
    /// by a regular polygon with `sides` vertices.
    ///
    /// The first vertex lies on the positive x-axis.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Polygon::regular(4, 1.);
    /// assert_eq!(square.points().len(), 4);
    /// assert_eq!(square.points()[0], Point::new(1., 0.));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `sides < 3`.
    pub fn regular(sides: usize, radius: f64) -> Self {
        assert!(sides >= 3, "a polygon needs at least 3 sides, got {sides}");
        let points = (0..sides)
            .map(|k| {
                let theta = 2. * PI * k as f64 / sides as f64;
                Point::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect();
        Self { points }
    }

    /// Returns a vector of all the vertices of the polygon.
    pub fn points(&self) -> &Vec<Point> {
        &self.points
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, p: Point) {
        self.points.translate_mut(p);
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let (mut p0, mut p1) = (first, first);
        for pt in &self.points[1..] {
            p0 = Point::new(p0.x.min(pt.x), p0.y.min(pt.y));
            p1 = Point::new(p1.x.max(pt.x), p1.y.max(pt.y));
        }
        Some(Rect::new(p0, p1))
    }
}
