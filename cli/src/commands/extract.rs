use anyhow::{Context, Result};
use pbit_extract::{ExtractOptions, ReportMetadata};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::OutputFormat;

pub fn run(
    archives: &[String],
    format: OutputFormat,
    out_dir: Option<&str>,
    scratch_dir: Option<&str>,
) -> Result<ExitCode> {
    let mut options = ExtractOptions::default();
    if let Some(dir) = scratch_dir {
        options = options.with_scratch_dir(dir);
    }

    let mut combined = ReportMetadata::default();
    let mut failed = 0usize;

    for archive in archives {
        match extract_one(archive, &options) {
            Ok(metadata) => combined.append(metadata),
            Err(err) => {
                // A single archive propagates so the exit code reflects
                // the failure kind; batches isolate failures per archive.
                if archives.len() == 1 {
                    return Err(err);
                }
                failed += 1;
                eprintln!("error: {:#}", err);
            }
        }
    }

    match format {
        OutputFormat::Csv => {
            let dir = out_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            write_csv_files(&combined, &dir)?;
        }
        OutputFormat::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &combined)
                .context("Failed to serialize metadata as JSON")?;
            writeln!(handle)?;
        }
    }

    Ok(if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    })
}

fn extract_one(archive: &str, options: &ExtractOptions) -> Result<ReportMetadata> {
    let bytes =
        fs::read(archive).with_context(|| format!("Failed to read archive: {}", archive))?;
    let report_name = Path::new(archive)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.to_string());

    pbit_extract::extract_with_options(bytes, &report_name, options)
        .with_context(|| format!("Failed to extract metadata from: {}", archive))
}

fn write_csv_files(metadata: &ReportMetadata, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    write_csv_file(dir, "data_model.csv", |w| {
        pbit_extract::write_tables(w, &metadata.tables)
    })?;
    write_csv_file(dir, "measures.csv", |w| {
        pbit_extract::write_measures(w, &metadata.measures)
    })?;
    write_csv_file(dir, "relationships.csv", |w| {
        pbit_extract::write_relationships(w, &metadata.relationships)
    })?;
    write_csv_file(dir, "fields.csv", |w| {
        pbit_extract::write_fields(w, &metadata.fields)
    })?;
    write_csv_file(dir, "columns.csv", |w| {
        pbit_extract::write_columns(w, &metadata.columns)
    })?;

    Ok(())
}

fn write_csv_file(
    dir: &Path,
    name: &str,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<()> {
    let path = dir.join(name);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("Failed to write: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(())
}
