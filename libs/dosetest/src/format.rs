//! Text encodings of a [`DoseSequence`].
//!
//! The layer and datatype tables are the comma separated files read by
//! feature dose assignment tools; the modulation table is a job-deck
//! fragment assigning percent dose increases to shot ranks.

use std::fmt::Write;

use crate::{round1, DoseSequence};

/// The label of the generated modulation table.
pub const MODULATION_TABLE_NAME: &str = "MOD001";

/// The comment block appended to a modulation table file.
pub const JDI_COMMENT: &str = "; Modulation table for manual assignment of doses to layers \n\
    ; Not for use when BEAMER FDA module has been used\n";

/// Formats a float in its shortest round-trip form, always with a fractional part.
///
/// Magnitudes below `1e-4` or from `1e16` up use scientific notation with a
/// signed exponent of at least two digits, as the job-deck readers expect.
///
/// ```
/// # use dosetest::format::fmt_float;
/// assert_eq!(fmt_float(1.), "1.0");
/// assert_eq!(fmt_float(14.1), "14.1");
/// assert_eq!(fmt_float(-0.5), "-0.5");
/// assert_eq!(fmt_float(1.5e-5), "1.5e-05");
/// ```
pub fn fmt_float(x: f64) -> String {
    let s = format!("{x:?}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// One `<layer>(0),<relative dose>` line per dose, layers numbered from 1.
///
/// ```
/// # use dosetest::{DoseSequence, format::layer_dose_table};
/// let seq = DoseSequence::new(2, 50., 50.)?;
/// assert_eq!(layer_dose_table(&seq), "1(0),1.0\n2(0),1.0\n");
/// # Ok::<(), dosetest::Error>(())
/// ```
pub fn layer_dose_table(seq: &DoseSequence) -> String {
    let mut out = String::new();
    for (k, rel) in seq.relative_doses().iter().enumerate() {
        // Writing to a `String` cannot fail.
        let _ = writeln!(out, "{}(0),{}", k + 1, fmt_float(*rel));
    }
    out
}

/// One `0(<datatype>),<relative dose>` line per dose, datatypes numbered from 1.
pub fn datatype_dose_table(seq: &DoseSequence) -> String {
    let mut out = String::new();
    for (k, rel) in seq.relative_doses().iter().enumerate() {
        let _ = writeln!(out, "0({}),{}", k + 1, fmt_float(*rel));
    }
    out
}

/// The single-line modulation table, `MOD001: MODULAT ((1, 0.0), (2, 14.0), ...)`.
pub fn modulation_table(seq: &DoseSequence) -> String {
    let pairs = seq
        .modulation_table()
        .iter()
        .map(|m| format!("({}, {})", m.rank, fmt_float(m.percent_increase)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{MODULATION_TABLE_NAME}: MODULAT ({pairs})")
}

/// The contents of a modulation table file: the table, a blank line, then [`JDI_COMMENT`].
pub fn jdi_file(seq: &DoseSequence) -> String {
    format!("{}\n\n{}", modulation_table(seq), JDI_COMMENT)
}

/// A human-readable summary of the sequence.
pub fn report(seq: &DoseSequence) -> String {
    let doses = seq
        .rounded_doses()
        .iter()
        .map(|d| fmt_float(*d))
        .collect::<Vec<_>>()
        .join(", ");
    let params = seq.params();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Number of doses: {}, from {} to {} uC/cm^2",
        params.n(),
        fmt_float(params.d0()),
        fmt_float(params.dn())
    );
    let _ = writeln!(
        out,
        "Multiplicative factor from one step to the next: {}",
        fmt_float(seq.factor())
    );
    let _ = writeln!(out, "Doses: [{doses}]");
    let _ = writeln!(
        out,
        "Mean dose: {} uC/cm^2",
        fmt_float(round1(seq.mean_dose()))
    );
    let _ = writeln!(out, "Modulation table: {}", modulation_table(seq));
    out
}
