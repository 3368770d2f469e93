//! Template extraction.
//!
//! The entry points tie the pieces together: open and validate the
//! container, unpack it into a workspace, decode and parse the two
//! metadata documents, run the parsers, and return the five tables. The
//! workspace never outlives the call, on success or failure.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::config::ExtractOptions;
use crate::container::{
    ContainerError, DATA_MODEL_SCHEMA_MEMBER, REPORT_LAYOUT_MEMBER, TemplateContainer,
};
use crate::data_model::{parse_data_model, parse_relationships};
use crate::encoding::{DecodeError, decode_member_text};
use crate::error_codes;
use crate::layout::parse_layout;
use crate::model::ReportMetadata;
use crate::workspace::{ExtractWorkspace, WorkspaceError, report_stem};

/// Errors produced by extraction APIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error(
        "[PBITX_EXTRACT_001] required member '{member}' was not found in the template. Suggestion: check that the archive is a .pbit exported by Power BI Desktop."
    )]
    MemberMissing { member: String },

    #[error(
        "[PBITX_EXTRACT_002] member '{member}' could not be decoded as text: {source}. Suggestion: re-export the template; the member appears corrupt."
    )]
    MemberDecode {
        member: String,
        #[source]
        source: DecodeError,
    },

    #[error(
        "[PBITX_EXTRACT_003] member '{member}' is not valid JSON: {reason}. Suggestion: re-export the template; the member appears corrupt."
    )]
    MemberJson { member: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::Container(e) => e.code(),
            ExtractError::Workspace(e) => e.code(),
            ExtractError::MemberMissing { .. } => error_codes::EXTRACT_MEMBER_MISSING,
            ExtractError::MemberDecode { .. } => error_codes::EXTRACT_MEMBER_DECODE,
            ExtractError::MemberJson { .. } => error_codes::EXTRACT_MEMBER_JSON,
            ExtractError::Io(_) => error_codes::EXTRACT_IO,
        }
    }
}

/// Extracts the five metadata tables from in-memory archive bytes.
///
/// `report_name` is typically the archive file name; its extension is
/// stripped for the report-name column and the workspace directory.
pub fn extract(archive_bytes: Vec<u8>, report_name: &str) -> Result<ReportMetadata, ExtractError> {
    extract_with_options(archive_bytes, report_name, &ExtractOptions::default())
}

pub fn extract_with_options(
    archive_bytes: Vec<u8>,
    report_name: &str,
    options: &ExtractOptions,
) -> Result<ReportMetadata, ExtractError> {
    extract_from_reader(Cursor::new(archive_bytes), report_name, options)
}

/// Extracts from a file on disk, deriving the report name from the file
/// name.
pub fn extract_path(path: impl AsRef<Path>) -> Result<ReportMetadata, ExtractError> {
    extract_path_with_options(path, &ExtractOptions::default())
}

pub fn extract_path_with_options(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ReportMetadata, ExtractError> {
    let path = path.as_ref();
    let container = TemplateContainer::open_from_path_with_limits(path, options.limits)?;
    let report_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    run_extraction(container, &report_name, options)
}

pub fn extract_from_reader<R: Read + Seek + 'static>(
    reader: R,
    report_name: &str,
    options: &ExtractOptions,
) -> Result<ReportMetadata, ExtractError> {
    let container = TemplateContainer::open_from_reader_with_limits(reader, options.limits)?;
    run_extraction(container, report_name, options)
}

fn run_extraction(
    mut container: TemplateContainer,
    report_name: &str,
    options: &ExtractOptions,
) -> Result<ReportMetadata, ExtractError> {
    let stem = report_stem(report_name);
    let scratch_dir = options
        .scratch_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let workspace = ExtractWorkspace::create(&scratch_dir, &stem)?;

    // On the error path the workspace cleans itself up in Drop; the
    // success path closes explicitly so removal failures surface.
    let metadata = extract_from_workspace(&mut container, &workspace, &stem)?;
    workspace.close()?;

    Ok(metadata)
}

fn extract_from_workspace(
    container: &mut TemplateContainer,
    workspace: &ExtractWorkspace,
    report_name: &str,
) -> Result<ReportMetadata, ExtractError> {
    let written = workspace.populate(container)?;
    log::info!(
        "extracted {written} members for report '{report_name}' into {}",
        workspace.root().display()
    );

    let schema = read_document(workspace, DATA_MODEL_SCHEMA_MEMBER)?;
    let layout = read_document(workspace, REPORT_LAYOUT_MEMBER)?;

    let (tables, measures, columns) = parse_data_model(&schema, report_name);
    let relationships = parse_relationships(&schema, report_name);
    let fields = parse_layout(&layout, report_name);

    log::info!(
        "report '{report_name}': {} tables, {} measures, {} relationships, {} columns, {} visual fields",
        tables.len(),
        measures.len(),
        relationships.len(),
        columns.len(),
        fields.len()
    );

    Ok(ReportMetadata {
        tables,
        measures,
        relationships,
        fields,
        columns,
    })
}

fn read_document(workspace: &ExtractWorkspace, member: &str) -> Result<Value, ExtractError> {
    let bytes = workspace.read_member(member).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractError::MemberMissing {
                member: member.to_string(),
            }
        } else {
            ExtractError::Io(e)
        }
    })?;

    let text = decode_member_text(&bytes).map_err(|source| ExtractError::MemberDecode {
        member: member.to_string(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|e| ExtractError::MemberJson {
        member: member.to_string(),
        reason: e.to_string(),
    })
}
