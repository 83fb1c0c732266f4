//! Lower-level utilities for mocking the process environment.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Permits parameterizing config loading over the process environment.
pub trait Env {
    /// Return the current working directory.
    fn current_dir(&self) -> io::Result<PathBuf>;
    /// Get an environment variable, as per [`std::env::var`].
    fn var(&self, key: &str) -> Option<String>;
}

/// Implements [`Env`] for the OS context.
pub struct OsEnv;

impl Env for OsEnv {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// The current OS context.
pub const OS_ENV: OsEnv = OsEnv;

/// A fixed working directory and variable set, for in-process tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    /// The reported working directory.
    pub cwd: PathBuf,
    /// The environment variables.
    pub vars: HashMap<String, String>,
}

impl MapEnv {
    /// Creates an environment rooted at `cwd` with no variables set.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            vars: HashMap::new(),
        }
    }

    /// Sets a variable.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Env for MapEnv {
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
