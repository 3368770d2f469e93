//! Data-model schema parsing.
//!
//! Walks the `DataModelSchema` document and flattens it into table,
//! measure, column, and relationship rows. Missing lists become empty
//! collections and nameless objects are skipped; a malformed individual
//! object never fails the whole document.

use serde_json::Value;

use crate::model::{ColumnEntry, MeasureEntry, RelationshipEntry, TableEntry};

/// Flattens `model.tables` into table rows plus the measures and columns
/// nested under each table, all in document order.
pub fn parse_data_model(
    doc: &Value,
    report_name: &str,
) -> (Vec<TableEntry>, Vec<MeasureEntry>, Vec<ColumnEntry>) {
    let mut tables = Vec::new();
    let mut measures = Vec::new();
    let mut columns = Vec::new();

    let Some(table_objs) = doc
        .get("model")
        .and_then(|m| m.get("tables"))
        .and_then(|t| t.as_array())
    else {
        log::warn!("data-model schema has no model.tables list");
        return (tables, measures, columns);
    };

    for table in table_objs {
        let Some(table_name) = table.get("name").and_then(|x| x.as_str()) else {
            log::warn!("skipping table object without a name");
            continue;
        };

        tables.push(parse_table_entry(table, table_name, report_name));

        if let Some(measure_objs) = table.get("measures").and_then(|m| m.as_array()) {
            for measure in measure_objs {
                if let Some(entry) = parse_measure_obj(measure, table_name, report_name) {
                    measures.push(entry);
                }
            }
        }

        if let Some(column_objs) = table.get("columns").and_then(|c| c.as_array()) {
            for column in column_objs {
                if let Some(entry) = parse_column_obj(column, table_name, report_name) {
                    columns.push(entry);
                }
            }
        }
    }

    (tables, measures, columns)
}

/// Flattens `model.relationships` into relationship rows. Endpoint fields
/// are carried verbatim; objects missing an endpoint are skipped.
pub fn parse_relationships(doc: &Value, report_name: &str) -> Vec<RelationshipEntry> {
    let mut relationships = Vec::new();

    let Some(rel_objs) = doc
        .get("model")
        .and_then(|m| m.get("relationships"))
        .and_then(|r| r.as_array())
    else {
        return relationships;
    };

    for rel in rel_objs {
        if let Some(entry) = parse_relationship_obj(rel, report_name) {
            relationships.push(entry);
        } else {
            log::warn!("skipping relationship object with missing endpoint fields");
        }
    }

    relationships
}

fn parse_table_entry(table: &Value, table_name: &str, report_name: &str) -> TableEntry {
    let first_partition = table
        .get("partitions")
        .and_then(|p| p.as_array())
        .and_then(|p| p.first());
    let mode = first_partition
        .and_then(|p| p.get("mode"))
        .and_then(|m| m.as_str())
        .unwrap_or("");
    let source = first_partition.and_then(|p| p.get("source"));
    let source_type = source
        .and_then(|s| s.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or("");
    let source_expression = source.map(resolve_source_expression).unwrap_or_default();

    TableEntry {
        report_name: report_name.to_string(),
        name: table_name.to_string(),
        mode: mode.to_string(),
        source_type: source_type.to_string(),
        source: source_expression,
    }
}

fn parse_measure_obj(measure: &Value, table_name: &str, report_name: &str) -> Option<MeasureEntry> {
    let name = measure.get("name").and_then(|x| x.as_str())?;
    let expression = expression_text(measure.get("expression")).unwrap_or_default();

    Some(MeasureEntry {
        report_name: report_name.to_string(),
        table: table_name.to_string(),
        name: name.to_string(),
        expression,
    })
}

/// Only columns that declare a `type` key (calculated columns, calculated
/// table columns) are extracted; plain source columns carry no expression
/// and are left out.
fn parse_column_obj(column: &Value, table_name: &str, report_name: &str) -> Option<ColumnEntry> {
    let name = column.get("name").and_then(|x| x.as_str())?;
    let column_type = column.get("type")?;
    let expression = expression_text(column.get("expression")).unwrap_or_default();

    Some(ColumnEntry {
        report_name: report_name.to_string(),
        table: table_name.to_string(),
        name: name.to_string(),
        column_type: column_type.as_str().unwrap_or("").to_string(),
        expression,
    })
}

fn parse_relationship_obj(rel: &Value, report_name: &str) -> Option<RelationshipEntry> {
    let from_table = rel.get("fromTable").and_then(|x| x.as_str())?;
    let from_column = rel.get("fromColumn").and_then(|x| x.as_str())?;
    let to_table = rel.get("toTable").and_then(|x| x.as_str())?;
    let to_column = rel.get("toColumn").and_then(|x| x.as_str())?;

    Some(RelationshipEntry {
        report_name: report_name.to_string(),
        from_table: from_table.to_string(),
        from_column: from_column.to_string(),
        to_table: to_table.to_string(),
        to_column: to_column.to_string(),
        is_active: rel.get("isActive").and_then(|x| x.as_bool()),
    })
}

/// `expressionSource` names a shared parameterized source and wins over
/// any inline `expression`; absence of both yields an empty string.
fn resolve_source_expression(source: &Value) -> String {
    if let Some(shared) = expression_text(source.get("expressionSource")) {
        return shared;
    }
    expression_text(source.get("expression")).unwrap_or_default()
}

/// Expressions appear either as a single JSON string or as an array of
/// line strings; both shapes collapse to one newline-joined string.
fn expression_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => {
            let parts: Vec<&str> = lines.iter().filter_map(|line| line.as_str()).collect();
            Some(parts.join("\n"))
        }
        _ => None,
    }
}
