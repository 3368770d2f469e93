//! ZIP container handling for `.pbit` template archives.
//!
//! Provides abstraction over the ZIP layer of Power BI template files,
//! validating that the `DataModelSchema` member is present and enforcing
//! size limits while unpacking members to disk.

use std::io::{Read, Seek};
use std::path::Path;

use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error_codes;

/// Data-model document, stored at the archive root. Its presence is what
/// distinguishes a template from an ordinary report archive.
pub const DATA_MODEL_SCHEMA_MEMBER: &str = "DataModelSchema";

/// Report-layout document, nested one directory deep.
pub const REPORT_LAYOUT_MEMBER: &str = "Report/Layout";

#[derive(Debug, Clone, Copy)]
pub struct ContainerLimits {
    pub max_entries: usize,
    pub max_member_uncompressed_bytes: u64,
    pub max_total_uncompressed_bytes: u64,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_member_uncompressed_bytes: 100 * 1024 * 1024,
            max_total_uncompressed_bytes: 500 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a ZIP container")]
    NotZipContainer,
    #[error("not a report template (missing DataModelSchema member)")]
    NotTemplate,
    #[error("archive has too many entries: {entries} (limit: {max_entries})")]
    TooManyEntries { entries: usize, max_entries: usize },
    #[error("member '{path}' is too large: {size} bytes (limit: {limit} bytes)")]
    MemberTooLarge { path: String, size: u64, limit: u64 },
    #[error("total uncompressed size exceeds limit: would exceed {limit} bytes")]
    TotalTooLarge { limit: u64 },
    #[error("failed to read ZIP entry '{path}': {reason}")]
    ZipRead { path: String, reason: String },
}

impl ContainerError {
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::Io(_) => error_codes::CONTAINER_IO,
            ContainerError::NotZipContainer => error_codes::CONTAINER_NOT_ZIP,
            ContainerError::NotTemplate => error_codes::CONTAINER_NOT_TEMPLATE,
            ContainerError::TooManyEntries { .. } => error_codes::CONTAINER_TOO_MANY_ENTRIES,
            ContainerError::MemberTooLarge { .. } => error_codes::CONTAINER_MEMBER_TOO_LARGE,
            ContainerError::TotalTooLarge { .. } => error_codes::CONTAINER_TOTAL_TOO_LARGE,
            ContainerError::ZipRead { .. } => error_codes::CONTAINER_ZIP,
        }
    }
}

pub(crate) trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub struct TemplateContainer {
    archive: ZipArchive<Box<dyn ReadSeek>>,
    limits: ContainerLimits,
}

impl TemplateContainer {
    pub fn open_from_reader<R: Read + Seek + 'static>(
        reader: R,
    ) -> Result<TemplateContainer, ContainerError> {
        Self::open_from_reader_with_limits(reader, ContainerLimits::default())
    }

    pub fn open_from_reader_with_limits<R: Read + Seek + 'static>(
        reader: R,
        limits: ContainerLimits,
    ) -> Result<TemplateContainer, ContainerError> {
        let reader: Box<dyn ReadSeek> = Box::new(reader);
        let archive = ZipArchive::new(reader).map_err(|err| match err {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => {
                ContainerError::NotZipContainer
            }
            ZipError::Io(e) => ContainerError::Io(e),
            other => ContainerError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        })?;

        if archive.len() > limits.max_entries {
            return Err(ContainerError::TooManyEntries {
                entries: archive.len(),
                max_entries: limits.max_entries,
            });
        }

        let mut container = TemplateContainer { archive, limits };

        if container.archive.by_name(DATA_MODEL_SCHEMA_MEMBER).is_err() {
            return Err(ContainerError::NotTemplate);
        }

        Ok(container)
    }

    pub fn open_from_path(path: impl AsRef<Path>) -> Result<TemplateContainer, ContainerError> {
        Self::open_from_path_with_limits(path, ContainerLimits::default())
    }

    pub fn open_from_path_with_limits(
        path: impl AsRef<Path>,
        limits: ContainerLimits,
    ) -> Result<TemplateContainer, ContainerError> {
        let file = std::fs::File::open(path)?;
        Self::open_from_reader_with_limits(file, limits)
    }

    /// Unpacks every entry under `dest`, creating directories as needed.
    /// Entries whose names would escape `dest` are skipped, not written.
    /// Returns the number of files written.
    pub fn extract_to(&mut self, dest: &Path) -> Result<usize, ContainerError> {
        let mut total: u64 = 0;
        let mut written: usize = 0;

        for index in 0..self.archive.len() {
            let mut entry =
                self.archive
                    .by_index(index)
                    .map_err(|e| ContainerError::ZipRead {
                        path: format!("#{index}"),
                        reason: e.to_string(),
                    })?;

            let Some(relative) = entry.enclosed_name() else {
                log::warn!("skipping archive entry with unsafe path: {}", entry.name());
                continue;
            };
            let out_path = dest.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }

            let size = entry.size();
            if size > self.limits.max_member_uncompressed_bytes {
                return Err(ContainerError::MemberTooLarge {
                    path: entry.name().to_string(),
                    size,
                    limit: self.limits.max_member_uncompressed_bytes,
                });
            }
            total = total.saturating_add(size);
            if total > self.limits.max_total_uncompressed_bytes {
                return Err(ContainerError::TotalTooLarge {
                    limit: self.limits.max_total_uncompressed_bytes,
                });
            }

            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out)?;
            written += 1;
        }

        Ok(written)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }
}
