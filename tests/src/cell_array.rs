use cellarray::layout::{circular_array, UnitCell};
use cellarray::{candidates, infallible, place, LatticeParams};
use clap::Parser;
use config::env::MapEnv;
use config::{CellShape, Config};
use geometry::prelude::*;
use layir::{Layer, LibraryBuilder};
use test_log::test;

use crate::paths::get_path;

#[test]
fn default_circular_array() -> anyhow::Result<()> {
    let cfg = Config::load_with_env(None, &MapEnv::new(get_path("default_circular_array", "")))?
        .config
        .array;
    let lattice = cfg.lattice()?;
    let mut lib = LibraryBuilder::new();
    let array = circular_array(
        &mut lib,
        cfg.name.as_str(),
        cfg.cell.unit_cell(),
        cfg.cell.name.as_str(),
        cfg.cell.layer(),
        &lattice,
    )?;
    let lib = lib.build()?;

    // Every lattice column contributes the points with |y| <= sqrt(R^2 - x^2).
    let expected: usize = (0..=20)
        .map(|i| {
            let x = -100. + 10. * i as f64;
            (0..=10)
                .filter(|j| {
                    let y = -100. + 20. * *j as f64;
                    x * x + y * y <= 100. * 100.
                })
                .count()
        })
        .sum();
    assert_eq!(array.placements.len(), expected);
    assert!(array
        .placements
        .iter()
        .any(|p| p.point() == Point::zero()));
    assert!(!array
        .placements
        .iter()
        .any(|p| p.point() == Point::new(100., 100.)));
    assert_eq!(lib.flat_shape_count(array.cell), expected);
    assert_eq!(
        lib.cell(lib.cell_id_named("unit_cell"))
            .elements()
            .next()
            .unwrap()
            .shape()
            .rect(),
        Some(Rect::from_size(5., 10.))
    );

    let json = serde_json::to_value(&lib)?;
    assert_eq!(json["cells"].as_object().unwrap().len(), expected + 1);
    Ok(())
}

#[test]
fn disk_array_from_environment() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let env = MapEnv::new(dir.path())
        .set("EBEAM_ARRAY_CELL_SHAPE", "disk")
        .set("EBEAM_ARRAY_CELL_RADIUS", "1.0")
        .set("EBEAM_ARRAY_PERIOD_X", "5")
        .set("EBEAM_ARRAY_PERIOD_Y", "5")
        .set("EBEAM_ARRAY_RADIUS", "10");
    let cfg = Config::load_with_env(None, &env)?.config.array;
    assert_eq!(cfg.cell.shape, CellShape::Disk);

    let lattice = cfg.lattice()?;
    let mut lib = LibraryBuilder::new();
    let array = circular_array(
        &mut lib,
        "holes",
        cfg.cell.unit_cell(),
        "hole",
        Layer(1, 0),
        &lattice,
    )?;
    let lib = lib.build()?;

    // 5x5 grid from -10 to 10 minus the 4 corners and the 8 points
    // at distance sqrt(125) from the center.
    assert_eq!(array.placements.len(), 13);
    let bbox = lib.cell_bbox(array.cell).unwrap();
    approx::assert_abs_diff_eq!(bbox.left(), -11., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(bbox.right(), 11., epsilon = 1e-12);
    Ok(())
}

#[test]
fn placements_match_candidate_filter() -> anyhow::Result<()> {
    let params = LatticeParams::new(3.7, 2.9, 17.3)?;
    let placed = place(infallible(|| ()), &params)?;
    let accepted: Vec<_> = candidates(&params)
        .filter(|c| c.accepted)
        .map(|c| c.placement)
        .collect();
    assert_eq!(
        placed.iter().map(|p| p.placement).collect::<Vec<_>>(),
        accepted
    );
    for c in candidates(&params).filter(|c| !c.accepted) {
        assert!(c.placement.point().norm_squared() > 17.3 * 17.3);
    }
    Ok(())
}

#[test]
fn unit_cell_failure_is_reported() -> anyhow::Result<()> {
    let mut lib = LibraryBuilder::new();
    let err = circular_array(
        &mut lib,
        "bad",
        UnitCell::Rect {
            width: -1.,
            height: 1.,
        },
        "cell",
        Layer(1, 0),
        &LatticeParams::new(10., 10., 10.)?,
    )
    .unwrap_err();
    let chain = format!("{:#}", anyhow::Error::from(err));
    assert!(chain.contains("unit-cell factory failed"));
    assert!(chain.contains("width = -1"));
    Ok(())
}

#[test]
fn flags_override_array_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join(config::CONFIG_FILE_NAME),
        "[array]\nradius = 100\nperiod_x = 10\n\n[array.cell]\nradius = 1.0\n",
    )?;
    let mut cfg = Config::load_with_env(None, &MapEnv::new(dir.path()))?
        .config
        .array;

    let out = dir.path().join("summary.json");
    let args = circarray::Args::try_parse_from([
        "circarray",
        "-r",
        "10",
        "-a",
        "5",
        "-b",
        "5",
        "--disk",
        "-o",
        out.to_str().unwrap(),
    ])?;
    args.apply(&mut cfg);
    assert_eq!(cfg.radius, 10.);
    assert_eq!(cfg.period_x, 5.);
    assert_eq!(cfg.period_y, 5.);
    assert_eq!(cfg.cell.shape, CellShape::Disk);
    assert_eq!(cfg.output, out);

    let summary = circarray::circarray(&cfg)?;
    assert_eq!(summary.top, "device_array");
    assert_eq!(summary.lattice, LatticeParams::new(5., 5., 10.)?);
    assert_eq!(summary.placements.len(), 13);
    let bbox = summary.bbox.unwrap();
    approx::assert_abs_diff_eq!(bbox.bot(), -11., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(bbox.top(), 11., epsilon = 1e-12);

    let json = serde_json::to_value(&summary)?;
    assert_eq!(json["placements"].as_array().unwrap().len(), 13);
    assert_eq!(json["lattice"]["a"], 5.0);
    assert_eq!(json["library"]["cells"].as_object().unwrap().len(), 14);
    Ok(())
}

#[test]
fn unset_flags_keep_array_config() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let loaded = Config::load_with_env(None, &MapEnv::new(dir.path()))?
        .config
        .array;
    let mut cfg = loaded.clone();
    circarray::Args::try_parse_from(["circarray"])?.apply(&mut cfg);
    assert_eq!(cfg, loaded);

    let err = circarray::circarray(&config::ArrayConfig {
        radius: 0.,
        ..loaded
    })
    .err()
    .unwrap();
    assert!(format!("{err:#}").contains("Invalid lattice parameters"));
    Ok(())
}
