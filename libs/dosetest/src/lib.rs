//! Multiplicative exposure-dose sequences for electron-beam dose tests.
//!
//! A dose test exposes `N` copies of a pattern at doses that grow by a
//! constant factor from `D0` to `DN`. [`DoseSequence::generate`] computes
//! that factor and every derived sequence; the [`format`] module renders
//! them as the lookup tables consumed by downstream exposure software.
//!
//! # Examples
//!
//! ```
//! use dosetest::{DoseParams, DoseSequence};
//!
//! let seq = DoseSequence::generate(DoseParams::new(18, 75., 700.)?);
//! assert_eq!(seq.doses()[0], 75.);
//! assert_eq!(seq.rounded_doses()[17], 700.);
//! # Ok::<(), dosetest::Error>(())
//! ```
#![warn(missing_docs)]

pub mod error;
pub mod format;

use serde::{Deserialize, Serialize};

pub use crate::error::{Error, Result};

/// The dose count and the first and last doses of a dose test.
///
/// Deserialization goes through the same checks as [`DoseParams::new`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDoseParams")]
pub struct DoseParams {
    n: usize,
    d0: f64,
    dn: f64,
}

impl DoseParams {
    /// Creates a validated parameter set.
    ///
    /// `n` must be at least 2 and both doses must be finite and positive.
    pub fn new(n: usize, d0: f64, dn: f64) -> Result<Self> {
        if n < 2 {
            return Err(Error::InvalidParameter {
                name: "n",
                value: n as f64,
                reason: "a dose test needs at least 2 doses",
            });
        }
        for (name, value) in [("d0", d0), ("dn", dn)] {
            if !(value.is_finite() && value > 0.) {
                return Err(Error::InvalidParameter {
                    name,
                    value,
                    reason: "doses must be finite and greater than zero",
                });
            }
        }
        Ok(Self { n, d0, dn })
    }

    /// The number of doses.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// The first dose.
    #[inline]
    pub fn d0(&self) -> f64 {
        self.d0
    }

    /// The last dose.
    #[inline]
    pub fn dn(&self) -> f64 {
        self.dn
    }
}

#[derive(Deserialize)]
struct RawDoseParams {
    n: usize,
    d0: f64,
    dn: f64,
}

impl TryFrom<RawDoseParams> for DoseParams {
    type Error = Error;

    fn try_from(raw: RawDoseParams) -> Result<Self> {
        Self::new(raw.n, raw.d0, raw.dn)
    }
}

/// One row of a modulation table.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modulation {
    /// The 1-based rank.
    pub rank: usize,
    /// The dose increase over the base dose, in percent.
    pub percent_increase: f64,
}

/// A geometric dose sequence and the sequences derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseSequence {
    params: DoseParams,
    factor: f64,
    doses: Vec<f64>,
    rounded_doses: Vec<f64>,
    relative_doses: Vec<f64>,
    percent_increases: Vec<f64>,
    modulation_table: Vec<Modulation>,
}

/// Rounds to one decimal place.
///
/// The exact binary value is rounded, with ties to even, so `0.15`
/// (stored just below 0.15) becomes `0.1` and `0.25` becomes `0.2`.
///
/// ```
/// # use dosetest::round1;
/// assert_eq!(round1(0.15), 0.1);
/// assert_eq!(round1(75.25), 75.2);
/// assert_eq!(round1(14.04), 14.0);
/// ```
pub fn round1(x: f64) -> f64 {
    format!("{x:.1}").parse().unwrap_or(x)
}

impl DoseSequence {
    /// Validates the raw parameters, then [generates](DoseSequence::generate) the sequence.
    ///
    /// ```
    /// # use dosetest::{DoseSequence, Error};
    /// assert!(matches!(
    ///     DoseSequence::new(1, 75., 700.),
    ///     Err(Error::InvalidParameter { name: "n", .. })
    /// ));
    /// ```
    pub fn new(n: usize, d0: f64, dn: f64) -> Result<Self> {
        Ok(Self::generate(DoseParams::new(n, d0, dn)?))
    }

    /// Computes the sequence `dose[n] = D0 * f^n` for `n` in `0..N`,
    /// where `f` is the constant ratio with `D0 * f^(N-1) = DN`.
    pub fn generate(params: DoseParams) -> Self {
        let DoseParams { n, d0, dn } = params;
        let factor = ((dn.ln() - d0.ln()) / (n - 1) as f64).exp();
        tracing::debug!(n, d0, dn, factor, "generating dose sequence");

        let steps: Vec<f64> = (0..n).map(|k| factor.powf(k as f64)).collect();
        let doses: Vec<f64> = steps.iter().map(|step| d0 * step).collect();
        let rounded_doses = doses.iter().copied().map(round1).collect();
        let relative_doses = doses.iter().map(|dose| dose / doses[0]).collect();
        let percent_increases: Vec<f64> =
            steps.iter().map(|step| round1(100. * (step - 1.))).collect();
        let modulation_table = percent_increases
            .iter()
            .enumerate()
            .map(|(k, &percent_increase)| Modulation {
                rank: k + 1,
                percent_increase,
            })
            .collect();

        Self {
            params,
            factor,
            doses,
            rounded_doses,
            relative_doses,
            percent_increases,
            modulation_table,
        }
    }

    /// The parameters this sequence was generated from.
    pub fn params(&self) -> DoseParams {
        self.params
    }

    /// The multiplicative step from one dose to the next.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// The number of doses.
    pub fn len(&self) -> usize {
        self.doses.len()
    }

    /// Always `false`: a sequence has at least two doses.
    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    /// The doses, at full precision.
    pub fn doses(&self) -> &[f64] {
        &self.doses
    }

    /// The doses, rounded to one decimal place.
    pub fn rounded_doses(&self) -> &[f64] {
        &self.rounded_doses
    }

    /// Each dose divided by the first dose.
    pub fn relative_doses(&self) -> &[f64] {
        &self.relative_doses
    }

    /// The percent increase of each dose over the first, rounded to one decimal place.
    pub fn percent_increases(&self) -> &[f64] {
        &self.percent_increases
    }

    /// `(rank, percent increase)` rows with 1-based ranks.
    pub fn modulation_table(&self) -> &[Modulation] {
        &self.modulation_table
    }

    /// The arithmetic mean of the full-precision doses.
    pub fn mean_dose(&self) -> f64 {
        self.doses.iter().sum::<f64>() / self.doses.len() as f64
    }
}
