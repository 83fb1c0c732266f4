//! 2-D geometric primitives for lithography layout generation.
//!
//! Coordinates are real-valued, in the same (arbitrary) length unit
//! as the lattice periods and radii used to place them.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect) and move it:
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(0., 0., 5., 10.).translate(Point::new(-100., 20.));
//! assert_eq!(rect.left(), -100.);
//! assert_eq!(rect.top(), 30.);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod shape;
pub mod transform;
