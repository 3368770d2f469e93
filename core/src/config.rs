//! Configuration for extraction runs.
//!
//! `ExtractOptions` centralizes the behavioral knobs of an extraction so
//! callers embedding the crate can tune them in one place.

use std::path::PathBuf;

use crate::container::ContainerLimits;

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Directory the per-report workspace is created under. `None` means
    /// the system temp directory. Callers extracting the same report name
    /// concurrently must point each run at a distinct scratch directory.
    pub scratch_dir: Option<PathBuf>,
    /// Safety limits applied while opening and unpacking the archive.
    pub limits: ContainerLimits,
}

impl ExtractOptions {
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_limits(mut self, limits: ContainerLimits) -> Self {
        self.limits = limits;
        self
    }
}
