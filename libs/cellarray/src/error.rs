//! Cell array error types.

/// A result type for cell array operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while placing a cell array.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A lattice parameter was not a finite, strictly positive number.
    #[error("invalid parameter `{name}` = {value}: must be finite and greater than zero")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The unit-cell factory failed while producing the cell at lattice index `(i, j)`.
    #[error("unit-cell factory failed at lattice index ({i}, {j})")]
    FactoryFailure {
        /// The index along x.
        i: usize,
        /// The index along y.
        j: usize,
        /// The error returned by the factory.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
