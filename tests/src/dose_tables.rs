use std::fs;

use approx::assert_relative_eq;
use clap::Parser;
use config::env::MapEnv;
use config::Config;
use dosesteps::{write_tables, Args};
use dosetest::{format, DoseSequence};
use test_log::test;

use crate::paths::get_path;

#[test]
fn default_dose_test_tables() -> anyhow::Result<()> {
    let out = get_path("default_dose_test_tables", "");
    let env = MapEnv::new(&out).set("EBEAM_DOSE_OUTPUT_DIR", "tables");
    let cfg = Config::load_with_env(None, &env)?.config.dose;
    assert_eq!(cfg.output_dir, out.join("tables"));

    let seq = DoseSequence::generate(cfg.params()?);
    let written = write_tables(&cfg, &seq)?;
    assert_eq!(
        written,
        vec![
            out.join("tables/LayersDosesList.csv"),
            out.join("tables/DatatypesDosesList.csv"),
            out.join("tables/modulationtable.jdi"),
        ]
    );

    let layers = fs::read_to_string(out.join("tables/LayersDosesList.csv"))?;
    let datatypes = fs::read_to_string(out.join("tables/DatatypesDosesList.csv"))?;
    let jdi = fs::read_to_string(out.join("tables/modulationtable.jdi"))?;

    assert_eq!(layers.lines().count(), 18);
    assert!(layers.starts_with("1(0),1.0\n2(0),1.1404"));
    assert_eq!(datatypes.lines().count(), 18);
    assert!(datatypes.starts_with("0(1),1.0\n0(2),1.1404"));

    let last: f64 = layers
        .lines()
        .last()
        .and_then(|line| line.strip_prefix("18(0),"))
        .unwrap()
        .parse()?;
    assert_relative_eq!(last, 700. / 75., max_relative = 1e-12);

    let (table, comment) = jdi.split_once("\n\n").unwrap();
    assert!(table.starts_with("MOD001: MODULAT ((1, 0.0), (2, 14.0), "));
    assert!(table.ends_with("(18, 833.3))"));
    assert_eq!(comment, format::JDI_COMMENT);
    Ok(())
}

#[test]
fn tables_follow_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join(config::CONFIG_FILE_NAME);
    fs::write(
        &file,
        "[dose]\ncount = 2\ninitial = 50.0\nfinal = 50.0\njdi_name = \"flat.jdi\"\n",
    )?;

    let cfg = Config::load_with_env(None, &MapEnv::new(dir.path()))?.config.dose;
    let seq = DoseSequence::generate(cfg.params()?);
    write_tables(&cfg, &seq)?;

    assert_eq!(
        fs::read_to_string(dir.path().join("LayersDosesList.csv"))?,
        "1(0),1.0\n2(0),1.0\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("DatatypesDosesList.csv"))?,
        "0(1),1.0\n0(2),1.0\n"
    );
    assert!(fs::read_to_string(dir.path().join("flat.jdi"))?
        .starts_with("MOD001: MODULAT ((1, 0.0), (2, 0.0))\n\n"));
    Ok(())
}

#[test]
fn decreasing_dose_test() -> anyhow::Result<()> {
    let seq = DoseSequence::new(5, 400., 100.)?;
    assert!(seq.relative_doses().windows(2).all(|w| w[0] > w[1]));
    let table = format::modulation_table(&seq);
    assert!(table.contains("(2, -29.3)"));
    assert!(table.ends_with("(5, -75.0))"));
    Ok(())
}

#[test]
fn flags_override_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(config::CONFIG_FILE_NAME),
        "[dose]\ncount = 3\ninitial = 40.0\nfinal = 90.0\njdi_name = \"file.jdi\"\n",
    )?;
    let mut cfg = Config::load_with_env(None, &MapEnv::new(dir.path()))?.config.dose;

    let out = dir.path().join("flagged");
    let args = Args::try_parse_from([
        "dosesteps",
        "-n",
        "2",
        "--final",
        "40",
        "--output-dir",
        out.to_str().unwrap(),
    ])?;
    assert!(!args.dry_run && !args.json);
    args.apply(&mut cfg);

    assert_eq!(cfg.count, 2);
    assert_eq!(cfg.initial, 40.);
    assert_eq!(cfg.final_dose, 40.);
    assert_eq!(cfg.jdi_name, "file.jdi");

    let seq = DoseSequence::generate(cfg.params()?);
    let written = write_tables(&cfg, &seq)?;
    assert_eq!(written.len(), 3);
    assert_eq!(
        fs::read_to_string(out.join("LayersDosesList.csv"))?,
        "1(0),1.0\n2(0),1.0\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("DatatypesDosesList.csv"))?,
        "0(1),1.0\n0(2),1.0\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("file.jdi"))?,
        format!("MOD001: MODULAT ((1, 0.0), (2, 0.0))\n\n{}", format::JDI_COMMENT)
    );
    Ok(())
}

#[test]
fn unset_flags_keep_config_values() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let loaded = Config::load_with_env(None, &MapEnv::new(dir.path()))?.config.dose;
    let mut cfg = loaded.clone();
    Args::try_parse_from(["dosesteps", "--dry-run"])?.apply(&mut cfg);
    assert_eq!(cfg, loaded);
    Ok(())
}
