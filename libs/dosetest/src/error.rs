//! Dose sequence error types.

/// A result type for dose sequence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while generating a dose sequence.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A dose sequence parameter was out of range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// The constraint that was violated.
        reason: &'static str,
    },
}
