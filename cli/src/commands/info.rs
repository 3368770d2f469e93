use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn run(path: &str, show_tables: bool) -> Result<ExitCode> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read archive: {}", path))?;

    let filename = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let metadata = pbit_extract::extract(bytes, &filename)
        .with_context(|| format!("Failed to extract metadata from: {}", path))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "Template: {}", filename)?;
    writeln!(handle, "Tables: {}", metadata.tables.len())?;
    writeln!(handle, "Measures: {}", metadata.measures.len())?;
    writeln!(handle, "Relationships: {}", metadata.relationships.len())?;
    writeln!(handle, "Calculated columns: {}", metadata.columns.len())?;
    writeln!(handle, "Visual fields: {}", metadata.fields.len())?;

    if show_tables {
        writeln!(handle)?;
        for table in &metadata.tables {
            let mode = if table.mode.is_empty() {
                "unknown"
            } else {
                table.mode.as_str()
            };
            let measure_count = metadata
                .measures
                .iter()
                .filter(|m| m.table == table.name)
                .count();
            writeln!(
                handle,
                "  - \"{}\" ({}) {} measures",
                table.name, mode, measure_count
            )?;
        }
    }

    Ok(ExitCode::from(0))
}
