use std::cell::Cell as StdCell;

use approx::assert_relative_eq;
use geometry::prelude::*;
use layir::{Layer, LibraryBuilder};
use test_log::test;

use crate::layout::{circular_array, disk_cell, rect_cell, ArrayBuilder, UnitCell, UnitCellError};
use crate::*;

#[derive(Debug, thiserror::Error)]
#[error("out of material")]
struct OutOfMaterial;

fn scenario() -> LatticeParams {
    LatticeParams::new(10., 20., 100.).unwrap()
}

#[test]
fn grid_spans_inclusive_index_range() {
    let params = scenario();
    assert_eq!(params.max_indices(), (20, 10));
    let all: Vec<_> = candidates(&params).collect();
    assert_eq!(all.len(), 21 * 11);
    assert_eq!(all.first().unwrap().placement.point(), Point::new(-100., -100.));
    assert_eq!(all.last().unwrap().placement.point(), Point::new(100., 100.));
}

#[test]
fn origin_accepted_and_corner_rejected() {
    let params = scenario();
    let by_index = |i, j| {
        candidates(&params)
            .find(|c| c.placement.i == i && c.placement.j == j)
            .unwrap()
    };

    let origin = by_index(10, 5);
    assert_eq!(origin.placement.point(), Point::zero());
    assert!(origin.accepted);

    let corner = by_index(20, 10);
    assert_eq!(corner.placement.point(), Point::new(100., 100.));
    assert!(!corner.accepted);
}

#[test]
fn disk_test_partitions_superset_grid() {
    let params = LatticeParams::new(7.5, 3.25, 41.).unwrap();
    for c in candidates(&params) {
        let d2 = c.placement.x.powi(2) + c.placement.y.powi(2);
        if c.accepted {
            assert!(d2 <= 41. * 41.);
        } else {
            assert!(d2 > 41. * 41.);
        }
    }
}

#[test]
fn boundary_points_are_included() {
    let params = scenario();
    let placed = place(infallible(|| ()), &params).unwrap();
    for p in [
        Point::new(-100., 0.),
        Point::new(100., 0.),
        Point::new(0., -100.),
        Point::new(0., 100.),
        Point::new(-60., 80.),
    ] {
        assert!(
            placed.iter().any(|c| c.placement.point() == p),
            "boundary point {p:?} should be placed"
        );
    }
}

#[test]
fn factory_called_once_per_accepted_placement() {
    let params = scenario();
    let calls = StdCell::new(0usize);
    let placed = place(
        infallible(|| {
            calls.set(calls.get() + 1);
            calls.get()
        }),
        &params,
    )
    .unwrap();
    let accepted = candidates(&params).filter(|c| c.accepted).count();
    assert_eq!(calls.get(), accepted);
    assert_eq!(placed.len(), accepted);
    // Cells come out in enumeration order.
    assert!(placed.iter().enumerate().all(|(k, c)| c.cell == k + 1));
}

#[test]
fn placements_are_row_major() {
    let placed = place(infallible(|| ()), &scenario()).unwrap();
    let keys: Vec<_> = placed
        .iter()
        .map(|c| (c.placement.i, c.placement.j))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn placement_is_idempotent() {
    let a = place(infallible(|| ()), &scenario()).unwrap();
    let b = place(infallible(|| ()), &scenario()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn periods_wider_than_diameter_yield_no_cells() {
    let params = LatticeParams::new(250., 300., 100.).unwrap();
    assert_eq!(params.max_indices(), (0, 0));
    let placed = place(infallible(|| ()), &params).unwrap();
    assert!(placed.is_empty());
}

#[test]
fn one_wide_period_keeps_only_center_column() {
    // Only i = 0 exists along x, which maps to x = -R; only y = 0 is in the disk.
    let params = LatticeParams::new(500., 25., 100.).unwrap();
    let placed = place(infallible(|| ()), &params).unwrap();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].placement.point(), Point::new(-100., 0.));
}

#[test]
fn invalid_parameters_are_rejected() {
    for (a, b, r, bad) in [
        (0., 1., 1., "a"),
        (1., -2., 1., "b"),
        (1., 1., 0., "r"),
        (f64::NAN, 1., 1., "a"),
        (1., 1., f64::INFINITY, "r"),
    ] {
        match LatticeParams::new(a, b, r) {
            Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, bad),
            other => panic!("expected invalid parameter `{bad}`, got {other:?}"),
        }
    }
}

#[test]
fn deserialized_params_are_validated() {
    let params: LatticeParams = serde_json::from_str(r#"{"a":10.0,"b":20.0,"r":100.0}"#).unwrap();
    assert_eq!(params, scenario());
    assert_eq!(serde_json::to_value(params).unwrap()["r"], 100.0);

    let err = serde_json::from_str::<LatticeParams>(r#"{"a":0.0,"b":20.0,"r":100.0}"#)
        .unwrap_err();
    assert!(err.to_string().contains("invalid parameter `a`"), "{err}");
}

#[test]
fn factory_failure_propagates_with_index() {
    let params = scenario();
    let mut remaining = 3;
    let err = place(
        || {
            if remaining == 0 {
                return Err(OutOfMaterial);
            }
            remaining -= 1;
            Ok(())
        },
        &params,
    )
    .unwrap_err();

    let fourth = candidates(&params).filter(|c| c.accepted).nth(3).unwrap();
    match err {
        Error::FactoryFailure { i, j, source } => {
            assert_eq!((i, j), (fourth.placement.i, fourth.placement.j));
            assert_eq!(source.to_string(), "out of material");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn failed_placement_leaves_target_untouched() {
    let mut target: Vec<(Point, ())> = Vec::new();
    let mut calls = 0;
    let result = place_into(
        &mut target,
        || {
            calls += 1;
            if calls > 5 {
                Err(OutOfMaterial)
            } else {
                Ok(())
            }
        },
        &scenario(),
    );
    assert!(result.is_err());
    assert!(target.is_empty());
}

#[test]
fn array_builder_instantiates_each_cell() {
    let params = LatticeParams::new(10., 20., 100.).unwrap();
    let mut lib = LibraryBuilder::new();
    let mut array = ArrayBuilder::new(&mut lib, "device_array");
    let placements = place_into(
        &mut array,
        infallible(|| rect_cell("unit_cell", Layer(1, 0), 5., 10.)),
        &params,
    )
    .unwrap();
    assert_eq!(array.len(), placements.len());
    let top = array.finish();
    let lib = lib.build().unwrap();

    assert_eq!(lib.len(), placements.len() + 1);
    let top_cell = lib.cell(top);
    assert_eq!(top_cell.name(), "device_array");
    for (inst, placement) in top_cell.instances().zip(&placements) {
        assert_eq!(inst.offset(), placement.point());
        assert_eq!(lib.cell(inst.child()).elements().count(), 1);
    }
    assert_eq!(lib.flat_shape_count(top), placements.len());

    // The rectangle of the top-right-most cell sticks out past the boundary.
    let bbox = lib.cell_bbox(top).unwrap();
    assert_eq!(bbox.left(), -100.);
    assert_eq!(bbox.bot(), -100.);
    assert_eq!(bbox.right(), 105.);
    assert_eq!(bbox.top(), 110.);
}

#[test]
fn disk_cells_center_on_placements() {
    let params = LatticeParams::new(30., 30., 30.).unwrap();
    let mut lib = LibraryBuilder::new();
    let mut array = ArrayBuilder::new(&mut lib, "holes");
    place_into(
        &mut array,
        infallible(|| disk_cell("hole", Layer(2, 0), 4., 64)),
        &params,
    )
    .unwrap();
    let top = array.finish();
    let lib = lib.build().unwrap();

    // (-30, 0), (0, -30), (0, 0), (0, 30), (30, 0)
    assert_eq!(lib.cell(top).instances().count(), 5);
    let bbox = lib.cell_bbox(top).unwrap();
    assert_relative_eq!(bbox.center(), Point::zero(), epsilon = 1e-9);
    assert_relative_eq!(bbox.right(), 34., epsilon = 1e-9);
}

#[test]
fn circular_array_of_default_rectangles() {
    let mut lib = LibraryBuilder::new();
    let array = circular_array(
        &mut lib,
        "device_array",
        UnitCell::Rect {
            width: 5.,
            height: 10.,
        },
        "unit_cell",
        Layer(1, 0),
        &scenario(),
    )
    .unwrap();
    let expected = candidates(&scenario()).filter(|c| c.accepted).count();
    assert_eq!(array.placements.len(), expected);
    assert_eq!(lib.cell(array.cell).instances().count(), expected);
    assert_eq!(lib.try_cell_id_named("unit_cell_1").is_some(), expected > 1);
}

#[test]
fn invalid_unit_cell_leaves_library_unchanged() {
    let mut lib = LibraryBuilder::new();
    let err = circular_array(
        &mut lib,
        "holes",
        UnitCell::Disk {
            radius: 1.,
            sides: 2,
        },
        "hole",
        Layer(2, 0),
        &scenario(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::FactoryFailure { i: 0, j: 5, .. }));
    assert!(lib.is_empty());
}

#[test]
fn unit_cell_dimensions_are_validated() {
    let name = arcstr::literal!("c");
    assert_eq!(
        UnitCell::Rect {
            width: 0.,
            height: 1.
        }
        .build(&name, Layer(1, 0))
        .unwrap_err(),
        UnitCellError::Dimension {
            name: "width",
            value: 0.
        }
    );
    assert_eq!(
        UnitCell::Disk {
            radius: f64::NAN,
            sides: 8
        }
        .build(&name, Layer(1, 0))
        .unwrap_err()
        .to_string(),
        "unit cell radius = NaN must be finite and greater than zero"
    );
    let cell = UnitCell::Disk {
        radius: 2.,
        sides: 8,
    }
    .build(&name, Layer(3, 1))
    .unwrap();
    assert_eq!(cell.elements().next().unwrap().layer(), &Layer(3, 1));
}
