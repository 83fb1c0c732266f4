//! Configuration for the circular cell array and dose table tools.
//!
//! Values are layered, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`--config`, `$EBEAM_CONFIG`, or the first `ebeam.toml`
//!    found walking up from the working directory),
//! 3. environment variables named after the key path, e.g.
//!    `array.radius` is overridden by `EBEAM_ARRAY_RADIUS`.
//!
//! Command line flags are applied on top by the binaries.
//!
//! ```toml
//! [array]
//! period_x = 10.0
//! period_y = 20.0
//! radius = 100.0
//!
//! [array.cell]
//! shape = "rect"
//! width = 5.0
//! height = 10.0
//!
//! [dose]
//! count = 18
//! initial = 75.0
//! final = 700.0
//! output_dir = "out"
//! ```
#![warn(missing_docs)]

pub mod env;
pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cellarray::LatticeParams;
use cellarray::layout::UnitCell;
use dosetest::DoseParams;
use layir::Layer;
use serde::{Deserialize, Serialize};

use crate::env::Env;

/// The name of the config file searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "ebeam.toml";

/// The prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "EBEAM";

/// The environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "EBEAM_CONFIG";

/// Both tools' settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Circular cell array settings.
    pub array: ArrayConfig,
    /// Dose table settings.
    pub dose: DoseConfig,
}

/// Circular cell array settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrayConfig {
    /// The lattice period along x.
    pub period_x: f64,
    /// The lattice period along y.
    pub period_y: f64,
    /// The radius of the circular boundary.
    pub radius: f64,
    /// The name of the cell holding the array.
    pub name: String,
    /// Where to write the layout summary.
    pub output: PathBuf,
    /// The unit cell.
    pub cell: CellConfig,
}

/// The shape of a unit cell.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellShape {
    /// A `width` × `height` rectangle with its lower-left corner on the placement point.
    #[default]
    Rect,
    /// A `radius` disk approximated by a regular polygon, centered on the placement point.
    Disk,
}

/// Unit cell settings.
///
/// Fields not used by the selected [`CellShape`] are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellConfig {
    /// The unit cell shape.
    pub shape: CellShape,
    /// The base name of each unit cell.
    pub name: String,
    /// Rectangle width.
    pub width: f64,
    /// Rectangle height.
    pub height: f64,
    /// Disk radius.
    pub radius: f64,
    /// The number of polygon vertices approximating a disk.
    pub sides: usize,
    /// The GDS layer number.
    pub layer: u16,
    /// The GDS datatype.
    pub datatype: u16,
}

/// Dose table settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoseConfig {
    /// The number of doses.
    pub count: usize,
    /// The first dose, in uC/cm^2.
    pub initial: f64,
    /// The last dose, in uC/cm^2.
    #[serde(rename = "final")]
    pub final_dose: f64,
    /// The directory the tables are written to.
    pub output_dir: PathBuf,
    /// The file name of the modulation table.
    pub jdi_name: String,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            period_x: 10.,
            period_y: 20.,
            radius: 100.,
            name: "device_array".to_string(),
            output: PathBuf::from("device_array.json"),
            cell: CellConfig::default(),
        }
    }
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            shape: CellShape::Rect,
            name: "unit_cell".to_string(),
            width: 5.,
            height: 10.,
            radius: 2.5,
            sides: 64,
            layer: 1,
            datatype: 0,
        }
    }
}

impl Default for DoseConfig {
    fn default() -> Self {
        Self {
            count: 18,
            initial: 75.,
            final_dose: 700.,
            output_dir: PathBuf::from("."),
            jdi_name: "modulationtable.jdi".to_string(),
        }
    }
}

impl ArrayConfig {
    /// The validated lattice parameters.
    pub fn lattice(&self) -> cellarray::Result<LatticeParams> {
        LatticeParams::new(self.period_x, self.period_y, self.radius)
    }
}

impl CellConfig {
    /// The unit cell geometry selected by [`CellConfig::shape`].
    pub fn unit_cell(&self) -> UnitCell {
        match self.shape {
            CellShape::Rect => UnitCell::Rect {
                width: self.width,
                height: self.height,
            },
            CellShape::Disk => UnitCell::Disk {
                radius: self.radius,
                sides: self.sides,
            },
        }
    }

    /// The `(layer, datatype)` pair the unit cell is drawn on.
    pub fn layer(&self) -> Layer {
        Layer(self.layer, self.datatype)
    }
}

impl DoseConfig {
    /// The validated dose parameters.
    pub fn params(&self) -> dosetest::Result<DoseParams> {
        DoseParams::new(self.count, self.initial, self.final_dose)
    }

    /// The path of the layer-keyed relative dose table.
    pub fn layers_path(&self) -> PathBuf {
        self.output_dir.join("LayersDosesList.csv")
    }

    /// The path of the datatype-keyed relative dose table.
    pub fn datatypes_path(&self) -> PathBuf {
        self.output_dir.join("DatatypesDosesList.csv")
    }

    /// The path of the modulation table file.
    pub fn jdi_path(&self) -> PathBuf {
        self.output_dir.join(&self.jdi_name)
    }
}

/// A loaded [`Config`] and the file it came from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// The merged configuration, with relative paths resolved.
    pub config: Config,
    /// The config file that was read.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Loaded> {
        Self::load_with_env(explicit, &env::OS_ENV)
    }

    /// Loads the configuration using the given environment.
    ///
    /// Relative paths in a config file are resolved against the file's directory;
    /// all other relative paths are resolved against the working directory.
    pub fn load_with_env(explicit: Option<&Path>, env: &dyn Env) -> Result<Loaded> {
        let cwd = env
            .current_dir()
            .with_context(|| "couldn't get the current directory of the process")?;

        let source = match explicit {
            Some(path) => Some(cwd.join(path)),
            None => match env.var(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
                Some(path) => Some(cwd.join(path)),
                None => find_config_file(&cwd),
            },
        };

        let defaults = match toml::Value::try_from(Config::default())
            .with_context(|| "failed to serialize default configuration")?
        {
            toml::Value::Table(table) => table,
            other => bail!("default configuration serialized to a {}", other.type_str()),
        };
        let mut values = defaults.clone();
        if let Some(ref path) = source {
            tracing::debug!("loading config file {:?}", path);
            let file = parse_document(&paths::read(path)?, path)?;
            merge(&mut values, file);
        }
        apply_env_overrides(&mut values, &defaults, ENV_PREFIX, env)?;

        let mut config: Config = toml::Value::Table(values)
            .try_into()
            .with_context(|| match source {
                Some(ref path) => format!("invalid configuration in `{}`", path.display()),
                None => "invalid configuration".to_string(),
            })?;

        let base = source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd.as_path())
            .to_path_buf();
        config.array.output = base.join(&config.array.output);
        config.dose.output_dir = base.join(&config.dose.output_dir);

        Ok(Loaded { config, source })
    }
}

/// Finds the nearest config file in `cwd` or one of its ancestors.
pub fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    paths::ancestors(cwd, None)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn parse_document(toml: &str, file: &Path) -> Result<toml::Table> {
    toml.parse().map_err(|e| {
        anyhow::Error::from(e).context(format!("could not parse `{}` as TOML", file.display()))
    })
}

/// Recursively overlays `overlay` onto `base`.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay) = value {
            if let Some(toml::Value::Table(inner)) = base.get_mut(&key) {
                merge(inner, overlay);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay));
        } else {
            base.insert(key, value);
        }
    }
}

/// The environment variable overriding the key path `path`.
///
/// ```
/// assert_eq!(config::env_var_name("EBEAM", &["dose", "jdi_name"]), "EBEAM_DOSE_JDI_NAME");
/// ```
pub fn env_var_name(prefix: &str, path: &[&str]) -> String {
    let mut name = prefix.to_string();
    for part in path {
        name.push('_');
        name.push_str(&part.to_uppercase().replace('-', "_"));
    }
    name
}

/// Replaces every leaf of `table` that has a matching environment variable.
///
/// The variable is parsed as the type of the corresponding leaf of `defaults`,
/// so a float field written as an integer in a config file still accepts
/// `EBEAM_ARRAY_RADIUS=50.5`.
fn apply_env_overrides(
    table: &mut toml::Table,
    defaults: &toml::Table,
    prefix: &str,
    env: &dyn Env,
) -> Result<()> {
    fn visit(
        table: &mut toml::Table,
        defaults: &toml::Table,
        path: &mut Vec<String>,
        prefix: &str,
        env: &dyn Env,
    ) -> Result<()> {
        for (key, default) in defaults {
            path.push(key.clone());
            if let toml::Value::Table(defaults) = default {
                // A non-table here is reported when the merged values are deserialized.
                if let Some(toml::Value::Table(inner)) = table.get_mut(key) {
                    visit(inner, defaults, path, prefix, env)?;
                }
            } else {
                let parts: Vec<&str> = path.iter().map(String::as_str).collect();
                let var = env_var_name(prefix, &parts);
                if let Some(raw) = env.var(&var) {
                    tracing::debug!("overriding `{}` from ${}", parts.join("."), var);
                    let value = parse_like(default, &raw)
                        .with_context(|| format!("invalid value {raw:?} for ${var}"))?;
                    table.insert(key.clone(), value);
                }
            }
            path.pop();
        }
        Ok(())
    }

    visit(table, defaults, &mut Vec::new(), prefix, env)
}

fn parse_like(existing: &toml::Value, raw: &str) -> Result<toml::Value> {
    let raw = raw.trim();
    Ok(match existing {
        toml::Value::Integer(_) => toml::Value::Integer(raw.parse()?),
        toml::Value::Float(_) => toml::Value::Float(raw.parse()?),
        toml::Value::Boolean(_) => toml::Value::Boolean(raw.parse()?),
        toml::Value::String(_) => toml::Value::String(raw.to_string()),
        other => bail!("cannot override a {} from the environment", other.type_str()),
    })
}
