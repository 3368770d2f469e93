//! Ephemeral extraction workspace.
//!
//! Each template is unpacked into a directory named after the report.
//! The directory must never outlive the extraction call: a stale
//! directory left behind by a crashed run is removed before extraction
//! starts, and `Drop` removes the directory on every exit path. The
//! success path goes through [`ExtractWorkspace::close`] so that removal
//! failures are surfaced instead of swallowed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::container::{ContainerError, TemplateContainer};
use crate::error_codes;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkspaceError {
    #[error("failed to remove stale workspace '{path}': {reason}")]
    StaleRemoval { path: String, reason: String },
    #[error("failed to create workspace '{path}': {reason}")]
    Create { path: String, reason: String },
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("failed to remove workspace '{path}': {reason}")]
    Removal { path: String, reason: String },
}

impl WorkspaceError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkspaceError::StaleRemoval { .. } => error_codes::WORKSPACE_STALE_REMOVE,
            WorkspaceError::Create { .. } => error_codes::WORKSPACE_CREATE,
            WorkspaceError::Container(e) => e.code(),
            WorkspaceError::Removal { .. } => error_codes::WORKSPACE_REMOVE,
        }
    }
}

pub(crate) struct ExtractWorkspace {
    root: PathBuf,
    closed: bool,
}

impl ExtractWorkspace {
    /// Creates `<scratch_dir>/<dir_name>`, removing any stale directory of
    /// the same name first so reruns start from a clean slate.
    pub(crate) fn create(scratch_dir: &Path, dir_name: &str) -> Result<Self, WorkspaceError> {
        let root = scratch_dir.join(dir_name);

        match fs::remove_dir_all(&root) {
            Ok(()) => log::debug!("removed stale workspace {}", root.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(WorkspaceError::StaleRemoval {
                    path: root.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        fs::create_dir_all(&root).map_err(|e| WorkspaceError::Create {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { root, closed: false })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn populate(
        &self,
        container: &mut TemplateContainer,
    ) -> Result<usize, WorkspaceError> {
        let written = container.extract_to(&self.root)?;
        Ok(written)
    }

    pub(crate) fn read_member(&self, member: &str) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(member))
    }

    /// Removes the workspace, surfacing removal errors. Error paths rely
    /// on `Drop` instead, which removes best-effort.
    pub(crate) fn close(mut self) -> Result<(), WorkspaceError> {
        self.closed = true;
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorkspaceError::Removal {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Drop for ExtractWorkspace {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.root) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("failed to remove workspace {}: {}", self.root.display(), e);
            }
        }
    }
}

/// Report name with the archive extension stripped, used both for the
/// workspace directory name and for the report-name column of every
/// emitted row. Falls back to a fixed name when the stem would be empty
/// or would not be a plain directory name.
pub(crate) fn report_stem(report_name: &str) -> String {
    let stem = Path::new(report_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem.to_string()
    }
}
