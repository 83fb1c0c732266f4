//! A minimal hierarchical layout IR.
//!
//! A [`LibraryBuilder`] owns uniquely named [`Cell`]s. Each cell holds
//! layered [`Shape`]s and [`Instance`]s of other cells placed at an offset.

pub mod id;
mod names;

use std::ops::Deref;

use arcstr::ArcStr;
use geometry::prelude::{Bbox, Point, Rect, TranslateRef};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::names::Names;

pub struct Cells;

// The reason this uses [`Cells`] instead of [`Cell`]
// is because `Cell` has a generic type parameter.
pub type CellId = Id<Cells>;

/// A GDS-style `(layer, datatype)` pair.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct Layer(pub u16, pub u16);

#[derive(Debug, Clone, Serialize)]
pub struct LibraryBuilder<L> {
    #[serde(skip)]
    cell_id: CellId,
    cells: IndexMap<CellId, Cell<L>>,
    #[serde(skip)]
    name_map: IndexMap<ArcStr, CellId>,
    #[serde(skip)]
    names: Names,
}

/// A validated library in which every instance refers to a cell of the library.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Library<L>(LibraryBuilder<L>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell<L> {
    name: ArcStr,
    instances: Vec<Instance>,
    elements: Vec<Shape<L>>,
}

/// A primitive layout shape consisting of a layer and a geometric shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape<L> {
    layer: L,
    shape: geometry::shape::Shape,
}

/// A placement of a child cell inside a parent cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    child: CellId,
    name: ArcStr,
    offset: Point,
}

/// An error produced when validating a [`LibraryBuilder`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An instance refers to a cell that is not in the library.
    #[error("instance `{instance}` in cell `{cell}` refers to an unknown cell")]
    DanglingInstance { cell: ArcStr, instance: ArcStr },
}

impl<L> Default for LibraryBuilder<L> {
    fn default() -> Self {
        Self {
            cell_id: Id::new(),
            cells: Default::default(),
            name_map: Default::default(),
            names: Default::default(),
        }
    }
}

impl<L> LibraryBuilder<L> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a cell to the library, renaming it if its name is already taken.
    pub fn add_cell(&mut self, mut cell: Cell<L>) -> CellId {
        let id = self.cell_id.alloc();
        cell.name = self.names.assign(&cell.name);
        self.name_map.insert(cell.name.clone(), id);
        self.cells.insert(id, cell);
        id
    }

    /// Gets the cell with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cell has the given ID.
    pub fn cell(&self, id: CellId) -> &Cell<L> {
        self.cells.get(&id).unwrap()
    }

    pub fn try_cell(&self, id: CellId) -> Option<&Cell<L>> {
        self.cells.get(&id)
    }

    /// Gets the cell ID corresponding to the given name.
    ///
    /// # Panics
    ///
    /// Panics if no cell has the given name.
    /// For a non-panicking alternative, see [`try_cell_id_named`](LibraryBuilder::try_cell_id_named).
    pub fn cell_id_named(&self, name: &str) -> CellId {
        match self.name_map.get(name) {
            Some(&cell) => cell,
            None => {
                tracing::error!("no cell named `{}`", name);
                panic!("no cell named `{}`", name);
            }
        }
    }

    /// Gets the cell ID corresponding to the given name.
    pub fn try_cell_id_named(&self, name: &str) -> Option<CellId> {
        self.name_map.get(name).copied()
    }

    pub fn try_cell_named(&self, name: &str) -> Option<&Cell<L>> {
        self.try_cell(self.try_cell_id_named(name)?)
    }

    /// Iterates over the `(id, cell)` pairs in this library, in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell<L>)> {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    /// The number of cells in the library.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the library has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns cell IDs in topological order: children before parents.
    pub fn topological_order(&self) -> Vec<CellId> {
        let mut state = IndexSet::new();
        for (cell, _) in self.cells() {
            self.dfs_postorder(cell, &mut state);
        }
        state.into_iter().collect()
    }

    fn dfs_postorder(&self, id: CellId, state: &mut IndexSet<CellId>) {
        if state.contains(&id) {
            return;
        }

        if let Some(cell) = self.try_cell(id) {
            for inst in cell.instances() {
                self.dfs_postorder(inst.child(), state);
            }
        }
        state.insert(id);
    }

    /// Checks that every instance refers to a cell of this library.
    pub fn build(self) -> Result<Library<L>, BuildError> {
        for (_, cell) in self.cells() {
            for inst in cell.instances() {
                if !self.cells.contains_key(&inst.child) {
                    tracing::error!(cell = %cell.name, instance = %inst.name, "dangling instance");
                    return Err(BuildError::DanglingInstance {
                        cell: cell.name.clone(),
                        instance: inst.name.clone(),
                    });
                }
            }
        }
        Ok(Library(self))
    }
}

impl<L> Library<L> {
    /// The bounding box of the given cell, including all of its instances.
    pub fn cell_bbox(&self, id: CellId) -> Option<Rect> {
        let cell = self.cell(id);
        let mut bbox = cell.elements.bbox();
        for inst in cell.instances() {
            let child = self.cell_bbox(inst.child).translate_ref(inst.offset);
            bbox = geometry::bbox::bounding_union(bbox, child);
        }
        bbox
    }

    /// Counts the leaf shapes reachable from the given cell, with multiplicity.
    pub fn flat_shape_count(&self, id: CellId) -> usize {
        let cell = self.cell(id);
        cell.elements.len()
            + cell
                .instances()
                .map(|inst| self.flat_shape_count(inst.child))
                .sum::<usize>()
    }
}

impl<L> Deref for Library<L> {
    type Target = LibraryBuilder<L>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<L> Cell<L> {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            instances: Default::default(),
            elements: Default::default(),
        }
    }

    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Add the given instance to the cell.
    #[inline]
    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Iterate over the instances of this cell, in insertion order.
    #[inline]
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn add_element(&mut self, element: Shape<L>) {
        self.elements.push(element)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Shape<L>> {
        self.elements.iter()
    }
}

impl<L> Shape<L> {
    #[inline]
    pub fn new(layer: L, shape: impl Into<geometry::shape::Shape>) -> Self {
        Self {
            layer,
            shape: shape.into(),
        }
    }

    #[inline]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    #[inline]
    pub fn shape(&self) -> &geometry::shape::Shape {
        &self.shape
    }
}

impl<L> Bbox for Shape<L> {
    fn bbox(&self) -> Option<Rect> {
        self.shape.bbox()
    }
}

impl Instance {
    pub fn new(child: CellId, name: impl Into<ArcStr>) -> Self {
        Self::with_offset(child, name, Point::zero())
    }

    pub fn with_offset(child: CellId, name: impl Into<ArcStr>, offset: Point) -> Self {
        Self {
            child,
            name: name.into(),
            offset,
        }
    }

    #[inline]
    pub fn child(&self) -> CellId {
        self.child
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn offset(&self) -> Point {
        self.offset
    }
}
