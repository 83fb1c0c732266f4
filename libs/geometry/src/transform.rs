//! Translation traits.
//!
//! Cells in a lattice are only ever offset, never rotated or reflected,
//! so translation is the only transformation supported here.

use impl_trait_for_tuples::impl_for_tuples;

use crate::point::Point;

/// A trait for specifying how a shape is translated by a [`Point`].
pub trait TranslateRef: Sized {
    /// Translates the shape by [`Point`], returning a new shape.
    fn translate_ref(&self, p: Point) -> Self;
}

impl<T: TranslateMut + Clone> TranslateRef for T {
    fn translate_ref(&self, p: Point) -> Self {
        self.clone().translate(p)
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
#[impl_for_tuples(32)]
pub trait TranslateMut {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate_mut(&mut self, p: Point);
}

impl<T: TranslateMut> TranslateMut for Vec<T> {
    fn translate_mut(&mut self, p: Point) {
        for i in self.iter_mut() {
            i.translate_mut(p);
        }
    }
}

impl<T: TranslateMut> TranslateMut for Option<T> {
    fn translate_mut(&mut self, p: Point) {
        if let Some(inner) = self.as_mut() {
            inner.translate_mut(p);
        }
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized {
    /// Translates the shape by a [`Point`] through mutation.
    ///
    /// Creates a new shape at a location equal to the translation of the original.
    fn translate(mut self, p: Point) -> Self {
        self.translate_mut(p);
        self
    }
}

impl<T: TranslateMut + Sized> Translate for T {}
