//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::transform::TranslateMut;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from two opposite corners.
    ///
    /// The corners are sorted, so either diagonal may be given.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(5., 10.), Point::new(0., 0.));
    /// assert_eq!(rect, Rect::from_sides(0., 0., 5., 10.));
    /// ```
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        let p0 = Point::new(lower_left.x.min(upper_right.x), lower_left.y.min(upper_right.y));
        let p1 = Point::new(lower_left.x.max(upper_right.x), lower_left.y.max(upper_right.y));
        Self { p0, p1 }
    }

    /// Creates a rectangle with corners `(0, 0), (width, height)`.
    ///
    /// This matches the footprint of a rectangular unit cell whose
    /// lower-left corner sits at the placement point.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_size(5., 10.);
    /// assert_eq!(rect.width(), 5.);
    /// assert_eq!(rect.height(), 10.);
    /// assert_eq!(rect.lower_left(), Point::zero());
    /// ```
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::zero(), Point::new(width, height))
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    ///
    /// If you want sides to be sorted for you, consider using [`Rect::new`] instead.
    #[inline]
    pub fn from_sides(left: f64, bot: f64, right: f64, top: f64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// The left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.p0.x
    }

    /// The bottom edge.
    #[inline]
    pub fn bot(&self) -> f64 {
        self.p0.y
    }

    /// The right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.p1.x
    }

    /// The top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.p1.y
    }

    /// The horizontal extent.
    #[inline]
    pub fn width(&self) -> f64 {
        self.p1.x - self.p0.x
    }

    /// The vertical extent.
    #[inline]
    pub fn height(&self) -> f64 {
        self.p1.y - self.p0.y
    }

    /// The lower-left corner.
    #[inline]
    pub fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub fn upper_right(&self) -> Point {
        self.p1
    }

    /// Returns the center point of the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0., 0., 55., 45.);
    /// assert_eq!(rect.center(), Point::new(27.5, 22.5));
    /// ```
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }

    /// The area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The smallest rectangle containing both `self` and `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0., 0., 1., 1.);
    /// let b = Rect::from_sides(-2., 0.5, 0.5, 3.);
    /// assert_eq!(a.union(b), Rect::from_sides(-2., 0., 1., 3.));
    /// ```
    pub fn union(self, other: Self) -> Self {
        Self::new(
            Point::new(self.p0.x.min(other.p0.x), self.p0.y.min(other.p0.y)),
            Point::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y)),
        )
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}
