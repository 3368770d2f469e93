//! Pbit Extract: a library for pulling metadata out of Power BI templates.
//!
//! This crate provides functionality for:
//! - Opening `.pbit` template archives (ZIP) with safety limits
//! - Unpacking a template into an ephemeral, self-cleaning workspace
//! - Decoding the UTF-16 `DataModelSchema` and `Report/Layout` members
//! - Flattening both documents into five relational tables: data-model
//!   tables, measures, relationships, per-visual field usage, and
//!   calculated columns
//! - Serializing the tables as CSV
//!
//! # Quick Start
//!
//! ```ignore
//! let bytes = std::fs::read("Quarterly Sales.pbit")?;
//! let metadata = pbit_extract::extract(bytes, "Quarterly Sales.pbit")?;
//!
//! for table in &metadata.tables {
//!     println!("{} ({})", table.name, table.mode);
//! }
//! ```

mod config;
mod container;
mod data_model;
mod encoding;
pub mod error_codes;
mod extract;
mod layout;
mod model;
mod output;
mod workspace;

pub use config::ExtractOptions;
pub use container::{
    ContainerError, ContainerLimits, DATA_MODEL_SCHEMA_MEMBER, REPORT_LAYOUT_MEMBER,
    TemplateContainer,
};
pub use data_model::{parse_data_model, parse_relationships};
pub use encoding::{DecodeError, decode_member_text};
pub use extract::{
    ExtractError, extract, extract_from_reader, extract_path, extract_path_with_options,
    extract_with_options,
};
pub use layout::parse_layout;
pub use model::{
    ColumnEntry, FieldKind, FieldUsageEntry, MeasureEntry, RelationshipEntry, ReportMetadata,
    TableEntry,
};
pub use output::csv::{
    write_columns, write_fields, write_measures, write_relationships, write_tables,
};
pub use workspace::WorkspaceError;
