//! Extracted metadata records.
//!
//! Five flat tables describe a template: data-model tables, measures,
//! relationships, per-visual field usage, and calculated columns. Every
//! field is a plain string copied out of the source documents; nothing is
//! validated cross-table here.

use serde::{Deserialize, Serialize};

/// One data-model table with its first partition's storage details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub report_name: String,
    pub name: String,
    /// Storage mode of the first partition ("import", "directQuery", ...),
    /// empty when the table has no partitions.
    pub mode: String,
    /// Source type of the first partition ("m", "calculated", ...).
    pub source_type: String,
    /// Source expression, newline-joined when stored as an array of lines.
    pub source: String,
}

/// One DAX measure, expression carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureEntry {
    pub report_name: String,
    pub table: String,
    pub name: String,
    pub expression: String,
}

/// One calculated or otherwise type-annotated column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub report_name: String,
    pub table: String,
    pub name: String,
    pub column_type: String,
    pub expression: String,
}

/// One model relationship. `is_active` is `None` when the document omits
/// the flag, which Power BI treats as active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub report_name: String,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub is_active: Option<bool>,
}

/// How a visual references a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Measure,
    Column,
    Aggregation,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Measure => "Measure",
            FieldKind::Column => "Column",
            FieldKind::Aggregation => "Aggregation",
        }
    }
}

/// One field used by one visual on one report page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUsageEntry {
    pub report_name: String,
    /// Display name of the report page.
    pub page: String,
    /// Internal name of the visual, from its config document.
    pub visual_id: String,
    pub table: String,
    pub name: String,
    pub kind: FieldKind,
}

/// The full result of extracting one or more templates. Rows appear in
/// document order; appending another report's metadata keeps both in
/// their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tables: Vec<TableEntry>,
    pub measures: Vec<MeasureEntry>,
    pub relationships: Vec<RelationshipEntry>,
    pub fields: Vec<FieldUsageEntry>,
    pub columns: Vec<ColumnEntry>,
}

impl ReportMetadata {
    pub fn append(&mut self, mut other: ReportMetadata) {
        self.tables.append(&mut other.tables);
        self.measures.append(&mut other.measures);
        self.relationships.append(&mut other.relationships);
        self.fields.append(&mut other.fields);
        self.columns.append(&mut other.columns);
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }

    pub fn total_rows(&self) -> usize {
        self.tables.len()
            + self.measures.len()
            + self.relationships.len()
            + self.fields.len()
            + self.columns.len()
    }
}
