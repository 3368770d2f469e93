//! CSV serialization for the five metadata tables.
//!
//! Headers, column order, and file naming are a compatibility contract
//! with downstream consumers; do not rename them casually. Output is
//! UTF-8 with `\n` row endings and RFC 4180 quoting, no index column.

use std::io::{self, Write};

use crate::model::{ColumnEntry, FieldUsageEntry, MeasureEntry, RelationshipEntry, TableEntry};

pub fn write_tables(w: &mut impl Write, entries: &[TableEntry]) -> io::Result<()> {
    write_record(w, &["Report Name", "Name", "Mode", "Type", "Source"])?;
    for e in entries {
        write_record(w, &[&e.report_name, &e.name, &e.mode, &e.source_type, &e.source])?;
    }
    Ok(())
}

pub fn write_measures(w: &mut impl Write, entries: &[MeasureEntry]) -> io::Result<()> {
    write_record(w, &["Report Name", "Name", "Measure_Name", "Measure_Expression"])?;
    for e in entries {
        write_record(w, &[&e.report_name, &e.table, &e.name, &e.expression])?;
    }
    Ok(())
}

pub fn write_relationships(w: &mut impl Write, entries: &[RelationshipEntry]) -> io::Result<()> {
    write_record(
        w,
        &["Report Name", "From_table", "From_Column", "To_Table", "To_Column", "is_active"],
    )?;
    for e in entries {
        write_record(
            w,
            &[
                &e.report_name,
                &e.from_table,
                &e.from_column,
                &e.to_table,
                &e.to_column,
                active_label(e.is_active),
            ],
        )?;
    }
    Ok(())
}

pub fn write_fields(w: &mut impl Write, entries: &[FieldUsageEntry]) -> io::Result<()> {
    write_record(w, &["Report Name", "Page", "Visual ID", "Table", "Name", "Type"])?;
    for e in entries {
        write_record(
            w,
            &[&e.report_name, &e.page, &e.visual_id, &e.table, &e.name, e.kind.as_str()],
        )?;
    }
    Ok(())
}

pub fn write_columns(w: &mut impl Write, entries: &[ColumnEntry]) -> io::Result<()> {
    write_record(
        w,
        &["Report Name", "Table Name", "Column_Name", "Column_Type", "Column_Expression"],
    )?;
    for e in entries {
        write_record(w, &[&e.report_name, &e.table, &e.name, &e.column_type, &e.expression])?;
    }
    Ok(())
}

/// Absent flags serialize as the "NA" sentinel so consumers can tell
/// "not specified" apart from an explicit false.
fn active_label(is_active: Option<bool>) -> &'static str {
    match is_active {
        Some(true) => "True",
        Some(false) => "False",
        None => "NA",
    }
}

fn write_record(w: &mut impl Write, fields: &[&str]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i != 0 {
            w.write_all(b",")?;
        }
        write_field(w, field)?;
    }
    w.write_all(b"\n")
}

fn write_field(w: &mut impl Write, field: &str) -> io::Result<()> {
    if !needs_quoting(field) {
        return w.write_all(field.as_bytes());
    }

    w.write_all(b"\"")?;
    let bytes = field.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            // write the span through the quote, then double it
            w.write_all(&bytes[start..=i])?;
            w.write_all(b"\"")?;
            start = i + 1;
        }
    }
    w.write_all(&bytes[start..])?;
    w.write_all(b"\"")
}

fn needs_quoting(field: &str) -> bool {
    field
        .bytes()
        .any(|b| matches!(b, b',' | b'"' | b'\n' | b'\r'))
}
