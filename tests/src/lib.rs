//! Cross-crate integration tests.

#[cfg(test)]
pub mod cell_array;
#[cfg(test)]
pub mod dose_tables;
pub mod paths;
